//! # JSON-RPC ウォレットプロバイダ
//!
//! ローカルで動作するウォレット（JSON-RPC 2.0 over HTTP）に署名を依頼する。
//!
//! - アカウント取得: `eth_requestAccounts`
//! - 構造化データ署名: `eth_signTypedData_v4`（params = [address, message]）
//!
//! エラーコード 4001 はユーザーによる拒否として扱う。

use std::sync::atomic::{AtomicU64, Ordering};

use mintpress_types::{ProviderRequest, RpcRequest, RpcResponse};

use super::SigningProvider;
use crate::error::ProviderError;

/// ユーザー拒否を表すJSON-RPCエラーコード。
pub const USER_REJECTED_CODE: i64 = 4001;

/// アカウント取得のメソッド名。
pub const REQUEST_ACCOUNTS_METHOD: &str = "eth_requestAccounts";

/// JSON-RPC 2.0 のウォレットエンドポイント。
pub struct RpcWalletProvider {
    /// エンドポイントURL
    endpoint: String,
    /// HTTPクライアント
    http: reqwest::Client,
    /// リクエストID
    next_id: AtomicU64,
}

impl RpcWalletProvider {
    pub fn new(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        let rpc_request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: method.to_string(),
            params,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&rpc_request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("RPC送信失敗: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("RPCレスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "ウォレットがエラーを返しました: HTTP {status} - {body}"
            )));
        }

        let rpc_response: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("RPCレスポンスのパースに失敗: {e}")))?;

        if let Some(error) = rpc_response.error {
            if error.code == USER_REJECTED_CODE {
                return Err(ProviderError::Rejected(error.message));
            }
            return Err(ProviderError::Malformed(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| ProviderError::Malformed("RPCレスポンスにresultがありません".to_string()))
    }
}

#[async_trait::async_trait]
impl SigningProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.call(REQUEST_ACCOUNTS_METHOD, Vec::new()).await?;
        serde_json::from_value(result)
            .map_err(|e| ProviderError::Malformed(format!("アカウント一覧のパースに失敗: {e}")))
    }

    async fn request(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let params = request
            .params
            .iter()
            .cloned()
            .map(serde_json::Value::String)
            .collect();
        let result = self.call(&request.method, params).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Malformed("署名が文字列ではありません".to_string()))
    }
}
