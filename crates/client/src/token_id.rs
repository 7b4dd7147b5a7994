//! # トークンIDのローカル生成
//!
//! サーバーとの往復の前に、確率的に一意なトークンIDをクライアント側で生成する。
//!
//! ## 構成
//! ```text
//! 0x <署名者アドレス 40桁> <ミリ秒時刻 13桁><乱数 11桁>
//! ```
//! 時刻と乱数の24桁も16進数字として読み、全体を256ビット符号なし整数と解釈して
//! 10進文字列で表す。上位160ビットが署名者アドレスになる。

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};
use rand::Rng;

use crate::error::PressError;

/// 乱数部の上限（排他）。
const SUFFIX_BOUND: u64 = 100_000_000_000;

/// 256ビット符号なし整数のトークンID。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenId(U256);

impl TokenId {
    /// 16進文字列（`0x` 接頭辞は任意、最大64桁）から構築する。
    pub fn from_hex(s: &str) -> Result<Self, PressError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        parse_digits(digits, 16, char::is_ascii_hexdigit).map(Self)
    }

    /// 10進文字列から構築する。先頭のゼロは許容する。
    pub fn from_decimal(s: &str) -> Result<Self, PressError> {
        parse_digits(s, 10, char::is_ascii_digit).map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// 上位160ビット（署名者アドレス部分）。
    pub fn creator_address(&self) -> Address {
        let bytes: [u8; 32] = self.0.to_be_bytes();
        Address::from_slice(&bytes[..20])
    }
}

impl std::fmt::Display for TokenId {
    /// 正規の10進表現（先頭ゼロなし）。
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// from_str_radix は `_` を読み飛ばすため、数字以外は先に弾く
fn parse_digits(s: &str, radix: u64, is_digit: fn(&char) -> bool) -> Result<U256, PressError> {
    if s.is_empty() {
        return Err(PressError::InvalidTokenId("空文字列です".to_string()));
    }
    if let Some(c) = s.chars().find(|c| !is_digit(c)) {
        return Err(PressError::InvalidTokenId(format!(
            "{radix}進数字ではありません: {c:?}"
        )));
    }
    U256::from_str_radix(s, radix)
        .map_err(|e| PressError::InvalidTokenId(format!("256ビットに収まりません ({s}): {e}")))
}

/// 署名者アドレスが `0x` + 40桁の16進であることを確認する。
pub fn validate_address(address: &str) -> Result<Address, PressError> {
    if !address.starts_with("0x") {
        return Err(PressError::InvalidAddress(format!(
            "0x接頭辞がありません: {address}"
        )));
    }
    Address::from_str(address)
        .map_err(|e| PressError::InvalidAddress(format!("{address}: {e}")))
}

/// アドレス・時刻・乱数からトークンIDを組み立てる。
pub fn compose(address: &str, timestamp_ms: u64, suffix: u64) -> Result<String, PressError> {
    let address = validate_address(address)?;
    if suffix >= SUFFIX_BOUND {
        return Err(PressError::InvalidTokenId(format!(
            "乱数部は11桁以内である必要があります: {suffix}"
        )));
    }
    let numeric = format!("{timestamp_ms:013}{suffix:011}");
    let id = TokenId::from_hex(&format!("{}{numeric}", hex::encode(address)))?;
    Ok(id.to_string())
}

/// 現在時刻と乱数でトークンIDを生成する。
pub fn generate(address: &str) -> Result<String, PressError> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let suffix = rand::thread_rng().gen_range(0..SUFFIX_BOUND);
    compose(address, timestamp_ms, suffix)
}

/// 10進文字列を正規形に変換する。
pub fn canonicalize(decimal: &str) -> Result<String, PressError> {
    Ok(TokenId::from_decimal(decimal)?.to_string())
}
