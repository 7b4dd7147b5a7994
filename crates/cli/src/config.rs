//! # CLI設定
//!
//! 環境変数から既定値を読み込み、コマンドライン引数で上書きする。
//! クライアントのコアは環境を参照しないため、既定値の解決はここで行う。

use std::sync::Arc;
use std::time::Duration;

use mintpress_client::{
    MintOptions, Press, RpcWalletProvider, SessionConfig, SigningProvider, StaticProvider,
    TokenIdStrategy,
};

/// 既定のバックエンドURL。
const DEFAULT_HOST: &str = "http://localhost:3000";
/// 既定のウォレットRPCエンドポイント。
const DEFAULT_WALLET_RPC: &str = "http://127.0.0.1:1248";
/// モックウォレットの既定アカウント。
const DEFAULT_MOCK_ACCOUNT: &str = "0x0000000000000000000000000000000000000001";
/// 既定のHTTPタイムアウト（秒）。
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// 署名プロバイダの種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WalletKind {
    /// JSON-RPCウォレット
    Rpc,
    /// ローカル開発用（決定的な疑似署名）
    Mock,
}

/// トークンIDの採番方法（CLI表記）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenIdMode {
    Local,
    Server,
}

impl From<TokenIdMode> for TokenIdStrategy {
    fn from(mode: TokenIdMode) -> Self {
        match mode {
            TokenIdMode::Local => TokenIdStrategy::Local,
            TokenIdMode::Server => TokenIdStrategy::Server,
        }
    }
}

/// 解決済みのCLI設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub host: String,
    pub wallet: WalletKind,
    pub wallet_rpc: String,
    pub mock_account: String,
    pub timeout_secs: u64,
    pub token_id: TokenIdMode,
}

impl CliConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から構築する。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("MINTPRESS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let wallet = match lookup("MINTPRESS_WALLET").as_deref() {
            None | Some("rpc") => WalletKind::Rpc,
            Some("mock") => WalletKind::Mock,
            Some(other) => anyhow::bail!("MINTPRESS_WALLETは rpc か mock である必要があります: {other}"),
        };
        let wallet_rpc =
            lookup("MINTPRESS_WALLET_RPC").unwrap_or_else(|| DEFAULT_WALLET_RPC.to_string());
        let mock_account =
            lookup("MINTPRESS_MOCK_ACCOUNT").unwrap_or_else(|| DEFAULT_MOCK_ACCOUNT.to_string());
        let timeout_secs = match lookup("MINTPRESS_HTTP_TIMEOUT_SECS") {
            Some(v) => v.parse().map_err(|e| {
                anyhow::anyhow!("MINTPRESS_HTTP_TIMEOUT_SECSは整数である必要があります: {e}")
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let token_id = match lookup("MINTPRESS_TOKEN_ID").as_deref() {
            None | Some("local") => TokenIdMode::Local,
            Some("server") => TokenIdMode::Server,
            Some(other) => {
                anyhow::bail!("MINTPRESS_TOKEN_IDは local か server である必要があります: {other}")
            }
        };

        Ok(Self {
            host,
            wallet,
            wallet_rpc,
            mock_account,
            timeout_secs,
            token_id,
        })
    }

    /// 署名プロバイダを構築する。
    fn provider(&self, http: reqwest::Client) -> Arc<dyn SigningProvider> {
        match self.wallet {
            WalletKind::Rpc => Arc::new(RpcWalletProvider::new(self.wallet_rpc.clone(), http)),
            WalletKind::Mock => {
                tracing::warn!("モックウォレットを使用します（開発環境用）");
                Arc::new(StaticProvider::new(vec![self.mock_account.clone()]))
            }
        }
    }

    /// セッションを確立してエントリオブジェクトを返す。
    pub async fn connect(&self) -> anyhow::Result<Press> {
        // ウォレットの承認待ちはタイムアウトさせない
        let wallet_http = reqwest::Client::new();
        let config = SessionConfig::new(self.host.clone())
            .with_provider(self.provider(wallet_http))
            .with_timeout(Duration::from_secs(self.timeout_secs));
        let options = MintOptions {
            id_strategy: self.token_id.into(),
        };
        Ok(Press::init_with(config, options).await?)
    }
}

/// `path=cid` 形式のフォルダエントリを分解する。
pub fn parse_folder_entry(entry: &str) -> anyhow::Result<(String, String)> {
    let (path, cid) = entry
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("path=cid 形式である必要があります: {entry}"))?;
    if path.is_empty() || cid.is_empty() {
        anyhow::bail!("パスとCIDは空にできません: {entry}");
    }
    Ok((path.to_string(), cid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.wallet, WalletKind::Rpc);
        assert_eq!(config.wallet_rpc, DEFAULT_WALLET_RPC);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.token_id, TokenIdMode::Local);
    }

    #[test]
    fn test_env_overrides() {
        let config = CliConfig::from_lookup(lookup_from(&[
            ("MINTPRESS_HOST", "https://api.example.com"),
            ("MINTPRESS_WALLET", "mock"),
            ("MINTPRESS_HTTP_TIMEOUT_SECS", "5"),
            ("MINTPRESS_TOKEN_ID", "server"),
        ]))
        .unwrap();
        assert_eq!(config.host, "https://api.example.com");
        assert_eq!(config.wallet, WalletKind::Mock);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.token_id, TokenIdMode::Server);
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(CliConfig::from_lookup(lookup_from(&[("MINTPRESS_WALLET", "ledger")])).is_err());
        assert!(
            CliConfig::from_lookup(lookup_from(&[("MINTPRESS_HTTP_TIMEOUT_SECS", "soon")])).is_err()
        );
    }

    #[test]
    fn test_parse_folder_entry() {
        assert_eq!(
            parse_folder_entry("images/1.png=bafy1").unwrap(),
            ("images/1.png".to_string(), "bafy1".to_string())
        );
        assert!(parse_folder_entry("nocid").is_err());
        assert!(parse_folder_entry("=bafy").is_err());
    }

    #[tokio::test]
    async fn test_connect_with_mock_wallet() {
        let config = CliConfig::from_lookup(lookup_from(&[("MINTPRESS_WALLET", "mock")])).unwrap();
        let press = config.connect().await.unwrap();
        assert_eq!(press.account(), DEFAULT_MOCK_ACCOUNT);
    }
}
