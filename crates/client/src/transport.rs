//! # バックエンドHTTPトランスポート
//!
//! build/relay サービスとコンテンツゲートウェイへのリクエストを送る。
//! 各フェーズで1回だけ送信し、リトライは行わない。
//!
//! 2xx以外のレスポンスはJSONとしてパースせず、本文テキストを
//! [`PressError::BackendRejected`] の `detail` としてそのまま返す。

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PressError;

/// バックエンドのベースURLとHTTPクライアントの組。
#[derive(Debug, Clone)]
pub struct BackendClient {
    host: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// 既存のHTTPクライアントから構築する。
    pub fn new(host: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// タイムアウト付きのHTTPクライアントを生成して構築する。
    pub fn with_timeout(
        host: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PressError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| PressError::BackendUnreachable {
            path: String::new(),
            message: format!("HTTPクライアントの構築に失敗: {e}"),
        })?;
        Ok(Self::new(host, http))
    }

    /// バックエンドのベースURL。
    pub fn host(&self) -> &str {
        &self.host
    }

    /// パスまたは絶対URLを解決する。
    ///
    /// 相対パスは先頭の `/` の有無にかかわらずベースURL（パス接頭辞を含む）の下に置く。
    /// 絶対URLはそのまま使う。
    pub fn url(&self, path: &str) -> Result<reqwest::Url, PressError> {
        let invalid = |e: &dyn std::fmt::Display| PressError::BackendUnreachable {
            path: path.to_string(),
            message: format!("URLを解決できません ({}): {e}", self.host),
        };
        let base = reqwest::Url::parse(&format!("{}/", self.host)).map_err(|e| invalid(&e))?;
        let relative = if path.contains("://") {
            path
        } else {
            path.trim_start_matches('/')
        };
        base.join(relative).map_err(|e| invalid(&e))
    }

    /// JSONボディをPOSTし、JSONレスポンスを返す。
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, PressError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!(path, "バックエンドにPOST");
        let request = self.http.post(self.url(path)?).json(body);
        self.execute(path, request).await
    }

    /// マルチパートフォームをPOSTし、JSONレスポンスを返す。
    pub async fn post_multipart<R>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<R, PressError>
    where
        R: DeserializeOwned,
    {
        tracing::debug!(path, "バックエンドにマルチパートPOST");
        let request = self.http.post(self.url(path)?).multipart(form);
        self.execute(path, request).await
    }

    /// GETしてJSONレスポンスを返す。
    pub async fn get_json<R>(&self, path: &str) -> Result<R, PressError>
    where
        R: DeserializeOwned,
    {
        tracing::debug!(path, "バックエンドにGET");
        let request = self.http.get(self.url(path)?);
        self.execute(path, request).await
    }

    async fn execute<R>(&self, path: &str, request: reqwest::RequestBuilder) -> Result<R, PressError>
    where
        R: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| PressError::BackendUnreachable {
                path: path.to_string(),
                message: format!("HTTP送信失敗: {e}"),
            })?;

        let status = response.status();
        let response_body =
            response
                .text()
                .await
                .map_err(|e| PressError::BackendUnreachable {
                    path: path.to_string(),
                    message: format!("レスポンス読み取り失敗: {e}"),
                })?;

        if !status.is_success() {
            return Err(PressError::BackendRejected {
                path: path.to_string(),
                status: status.as_u16(),
                detail: response_body,
            });
        }

        serde_json::from_str(&response_body).map_err(|e| PressError::MalformedResponse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
