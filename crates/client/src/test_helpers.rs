//! # テスト用共通ヘルパー
//!
//! バックエンド・ゲートウェイ・ウォレットを模したモックサーバー群。

use std::sync::{Arc, Mutex};

use axum::routing::post;
use axum::Json;

/// 受信したリクエストの記録（パス, ボディ）。
pub type RequestLog = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

/// テスト用署名者アドレス。
pub const SIGNER: &str = "0xabc0000000000000000000000000000000000def";

/// 任意のルーターを127.0.0.1のエフェメラルポートで起動し、ベースURLを返す。
pub async fn start_mock_backend(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

/// 受信ボディを記録し、固定のJSONを返すPOSTルートを追加する。
pub fn recording_route(
    router: axum::Router,
    path: &'static str,
    log: RequestLog,
    reply: serde_json::Value,
) -> axum::Router {
    router.route(
        path,
        post(move |Json(body): Json<serde_json::Value>| {
            let log = log.clone();
            let reply = reply.clone();
            async move {
                log.lock().unwrap().push((path.to_string(), body));
                Json(reply)
            }
        }),
    )
}

/// 記録から指定パスのボディを取り出す。
pub fn bodies_for(log: &RequestLog, path: &str) -> Vec<serde_json::Value> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(p, _)| p == path)
        .map(|(_, body)| body.clone())
        .collect()
}
