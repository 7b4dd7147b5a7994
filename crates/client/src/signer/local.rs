//! # ローカル開発用署名プロバイダ
//!
//! ウォレットが利用できない開発環境・テストで使用する。
//! 固定のアカウント一覧を返し、署名者アドレスとメッセージのSHA-256を署名として返す。
//! 暗号学的な署名ではない。

use std::sync::{Mutex, PoisonError};

use mintpress_types::ProviderRequest;
use sha2::{Digest, Sha256};

use super::SigningProvider;
use crate::error::ProviderError;

/// 固定アカウントを持つ署名プロバイダ。
pub struct StaticProvider {
    /// アカウント一覧
    accounts: Vec<String>,
    /// 設定されている場合、全ての署名要求をこの理由で拒否する
    decline_reason: Option<String>,
    /// 受け付けた署名要求の記録
    requests: Mutex<Vec<ProviderRequest>>,
}

impl StaticProvider {
    /// 署名要求を全て受け付けるプロバイダを作る。
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            decline_reason: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 署名要求を全て拒否するプロバイダを作る（ユーザーのキャンセルを模す）。
    pub fn declining(accounts: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            decline_reason: Some(reason.into()),
            ..Self::new(accounts)
        }
    }

    /// これまでに受け付けた署名要求。
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// `0x` + hex(SHA-256(address || 0x00 || message))
pub fn deterministic_signature(address: &str, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update([0u8]);
    hasher.update(message.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[async_trait::async_trait]
impl SigningProvider for StaticProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.accounts.clone())
    }

    async fn request(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(reason) = &self.decline_reason {
            return Err(ProviderError::Rejected(reason.clone()));
        }

        match request.params.as_slice() {
            [address, message] => {
                if !self.accounts.iter().any(|a| a.eq_ignore_ascii_case(address)) {
                    return Err(ProviderError::Malformed(format!(
                        "未知のアカウントです: {address}"
                    )));
                }
                Ok(deterministic_signature(address, message))
            }
            _ => Err(ProviderError::Malformed(format!(
                "paramsは[address, message]である必要があります（{}件）",
                request.params.len()
            ))),
        }
    }
}
