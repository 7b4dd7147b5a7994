//! # セッション設定
//!
//! セッション確立に必要な値を明示的に受け取る。
//! 環境変数などの暗黙の既定値はここでは解決しない（呼び出し側の責務）。

use std::sync::Arc;
use std::time::Duration;

use crate::signer::SigningProvider;

/// セッション設定。
#[derive(Clone, Default)]
pub struct SessionConfig {
    /// バックエンドのベースURL（例: "http://localhost:3000"）
    pub host: String,
    /// 署名プロバイダ。Noneの場合はセッション確立に失敗する
    pub provider: Option<Arc<dyn SigningProvider>>,
    /// HTTPクライアント。Noneの場合は `timeout` から構築する
    pub http: Option<reqwest::Client>,
    /// HTTPリクエストのタイムアウト（`http` 未指定時のみ使用）
    pub timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SigningProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// トークンIDの採番方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenIdStrategy {
    /// 署名者アドレス + 時刻 + 乱数からクライアント側で生成する
    #[default]
    Local,
    /// /token/init でサーバーに採番させる
    Server,
}

/// ミントビルダーのオプション。
#[derive(Debug, Clone, Copy, Default)]
pub struct MintOptions {
    pub id_strategy: TokenIdStrategy,
}
