//! # 署名チャネル
//!
//! 外部の署名プロバイダ（ウォレット）を「構造化メッセージに署名する」という
//! 一様な契約の裏に隠す。秘密鍵はプロバイダの外に出ない。
//!
//! 署名はユーザー操作を伴い、キャンセルされることが多い。プロバイダの拒否・失敗は
//! 例外ではなく [`SignOutcome::Declined`] として返し、診断ログに記録する。
//!
//! 現在のプロバイダ実装:
//! - `rpc` — JSON-RPC 2.0 over HTTP のウォレットエンドポイント
//! - `local` — ローカル開発・テスト用（固定アカウント、決定的な署名）

pub mod local;
pub mod rpc;

pub use local::StaticProvider;
pub use rpc::RpcWalletProvider;

use mintpress_types::{ProviderRequest, Signature};
use serde::Serialize;

use crate::error::{PressError, ProviderError};

/// 構造化データ署名のメソッド名。
pub const SIGN_TYPED_DATA_METHOD: &str = "eth_signTypedData_v4";

/// 署名プロバイダのトレイト。
#[async_trait::async_trait]
pub trait SigningProvider: Send + Sync {
    /// アカウントへのアクセスを要求し、アドレス一覧を返す（先頭がアクティブな署名者）。
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `{method, params, from}` 形式の要求を実行し、署名文字列を返す。
    async fn request(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}

/// 署名の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// 署名済み
    Signed(Signature),
    /// 拒否・失敗（理由付き）
    Declined(String),
}

impl SignOutcome {
    /// 署名を取り出す。拒否された場合は `None`。
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            SignOutcome::Signed(signature) => Some(signature),
            SignOutcome::Declined(_) => None,
        }
    }

    /// 拒否を [`PressError::SignDeclined`] に変換する。
    pub fn into_result(self) -> Result<Signature, PressError> {
        match self {
            SignOutcome::Signed(signature) => Ok(signature),
            SignOutcome::Declined(reason) => Err(PressError::SignDeclined(reason)),
        }
    }
}

/// 署名者アドレスとプロバイダの組。
pub struct SigningChannel<'a> {
    account: &'a str,
    provider: &'a dyn SigningProvider,
}

impl<'a> SigningChannel<'a> {
    pub fn new(account: &'a str, provider: &'a dyn SigningProvider) -> Self {
        Self { account, provider }
    }

    /// 構造化メッセージをシリアライズしてプロバイダに署名させる。
    pub async fn sign<T>(&self, message: &T) -> SignOutcome
    where
        T: Serialize + ?Sized,
    {
        let serialized = match serde_json::to_string(message) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "署名対象のシリアライズに失敗");
                return SignOutcome::Declined(format!("署名対象のシリアライズに失敗: {e}"));
            }
        };

        let request = ProviderRequest {
            method: SIGN_TYPED_DATA_METHOD.to_string(),
            params: vec![self.account.to_string(), serialized],
            from: self.account.to_string(),
        };

        tracing::debug!(account = %self.account, "署名を要求");
        match self.provider.request(&request).await {
            Ok(signature) => SignOutcome::Signed(Signature(signature)),
            Err(e) => {
                tracing::warn!(account = %self.account, error = %e, "署名が完了しませんでした");
                SignOutcome::Declined(e.to_string())
            }
        }
    }
}
