//! # セッションコンテキスト
//!
//! アクティブな署名者アドレス・署名プロバイダ・HTTPトランスポート・
//! バックエンドURLを保持する。セッション確立時に一度だけ作られ、以後は不変。
//! 全てのビルダーは `Arc<Session>` で同じセッションを参照する。

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::PressError;
use crate::signer::{SigningChannel, SigningProvider};
use crate::transport::BackendClient;

/// 確立済みセッション。
pub struct Session {
    /// アクティブな署名者アドレス（プロバイダが返した先頭のアカウント）
    account: String,
    /// 署名プロバイダ
    provider: Arc<dyn SigningProvider>,
    /// バックエンド・ゲートウェイへのトランスポート
    backend: BackendClient,
}

impl Session {
    /// 設定からセッションを確立する。
    ///
    /// 1. 署名プロバイダの存在を確認
    /// 2. アカウントを要求し、先頭を署名者とする
    /// 3. HTTPトランスポートを解決
    pub async fn establish(config: SessionConfig) -> Result<Arc<Self>, PressError> {
        let provider = match config.provider {
            Some(provider) => provider,
            None => {
                tracing::warn!("署名プロバイダが設定されていません");
                return Err(PressError::ProviderUnavailable(
                    "署名プロバイダが設定されていません".to_string(),
                ));
            }
        };

        let accounts = provider.request_accounts().await.map_err(|e| {
            tracing::warn!(error = %e, "アカウントの取得に失敗");
            PressError::ProviderUnavailable(e.to_string())
        })?;

        let account = accounts.into_iter().next().ok_or_else(|| {
            tracing::warn!("署名プロバイダがアカウントを返しませんでした");
            PressError::ProviderUnavailable("アカウントがありません".to_string())
        })?;

        let backend = match config.http {
            Some(http) => BackendClient::new(config.host, http),
            None => BackendClient::with_timeout(config.host, config.timeout)?,
        };

        tracing::info!(account = %account, host = %backend.host(), "セッションを確立");

        Ok(Arc::new(Self {
            account,
            provider,
            backend,
        }))
    }

    /// 確立済みの値から直接構築する。
    pub fn from_parts(
        account: impl Into<String>,
        provider: Arc<dyn SigningProvider>,
        backend: BackendClient,
    ) -> Arc<Self> {
        Arc::new(Self {
            account: account.into(),
            provider,
            backend,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// このセッションの署名チャネル。
    pub fn signing_channel(&self) -> SigningChannel<'_> {
        SigningChannel::new(&self.account, self.provider.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::StaticProvider;
    use crate::test_helpers::SIGNER;

    #[tokio::test]
    async fn test_first_account_becomes_signer() {
        let provider = Arc::new(StaticProvider::new(vec![
            SIGNER.to_string(),
            "0x0000000000000000000000000000000000000001".to_string(),
        ]));
        let session = Session::establish(
            SessionConfig::new("http://localhost:3000").with_provider(provider),
        )
        .await
        .unwrap();

        assert_eq!(session.account(), SIGNER);
        assert_eq!(session.backend().host(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_missing_provider_is_unavailable() {
        let result = Session::establish(SessionConfig::new("http://localhost:3000")).await;
        assert!(matches!(result, Err(PressError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_account_list_is_unavailable() {
        let provider = Arc::new(StaticProvider::new(Vec::new()));
        let result = Session::establish(
            SessionConfig::new("http://localhost:3000").with_provider(provider),
        )
        .await;
        assert!(matches!(result, Err(PressError::ProviderUnavailable(_))));
    }
}
