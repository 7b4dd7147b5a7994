//! # コンテンツ解決
//!
//! 任意のコンテンツ入力をゲートウェイ経由でコンテンツ識別子（CID）に正規化する。
//!
//! ## 入力種別と経路（判定順）
//! 1. `Bytes` — 無名blobとしてアップロード（/ipfs/add）
//! 2. `NamedFile` — ファイル名付きでアップロード
//! 3. `Blob` — 無名blobとしてアップロード
//! 4. `RemoteUrl`（`http` で始まる文字列） — /ipfs/import でゲートウェイに取り込ませる
//! 5. `LiteralText`（その他の文字列） — `text/plain` のblobとしてアップロード
//! 6. `Stream` — 読み込みながらそのままアップロード（全体をメモリに載せない）
//!
//! どれにも当てはまらない入力は `Unrecognized` となり、
//! [`PressError::UnsupportedInputKind`] で失敗する。

use std::path::Path;
use std::sync::Arc;

use mintpress_types::{AddResponse, FolderRequest, GatewayReply, ImportRequest};
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::PressError;
use crate::session::Session;

/// ゲートウェイのエンドポイント。
pub const ADD_PATH: &str = "/ipfs/add";
pub const IMPORT_PATH: &str = "/ipfs/import";
pub const FOLDER_PATH: &str = "/ipfs/folder";

/// マルチパートのフィールド名。
const FILE_FIELD: &str = "file";
/// 無名blobのファイル名。
const ANONYMOUS_BLOB_NAME: &str = "blob";

/// コンテンツ入力。
pub enum ContentInput {
    /// 生のバイト列
    Bytes(Vec<u8>),
    /// ファイル名付きのバイナリ
    NamedFile {
        name: String,
        bytes: Vec<u8>,
        mime: Option<String>,
    },
    /// 無名のバイナリ
    Blob { bytes: Vec<u8>, mime: Option<String> },
    /// リモートURL
    RemoteUrl(String),
    /// テキストそのもの
    LiteralText(String),
    /// 読み取り可能なストリーム
    Stream(Box<dyn AsyncRead + Send + Sync + Unpin>),
    /// 判定できない入力（種別の説明）
    Unrecognized(String),
}

impl ContentInput {
    /// 文字列を分類する。`http` で始まればリモートURL、それ以外はテキスト。
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.starts_with("http") {
            ContentInput::RemoteUrl(text)
        } else {
            ContentInput::LiteralText(text)
        }
    }

    pub fn named_file(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name).map(str::to_string);
        ContentInput::NamedFile { name, bytes, mime }
    }

    pub fn blob(bytes: Vec<u8>, mime: Option<String>) -> Self {
        ContentInput::Blob { bytes, mime }
    }

    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        ContentInput::Stream(Box::new(reader))
    }

    /// ファイルを読み込み、ファイル名付き入力にする。
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PressError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ANONYMOUS_BLOB_NAME.to_string());
        Ok(Self::named_file(name, bytes))
    }

    /// JSON値を分類する。文字列以外は判定不能。
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::from_text(s.clone()),
            serde_json::Value::Null => ContentInput::Unrecognized("null".to_string()),
            serde_json::Value::Bool(_) => ContentInput::Unrecognized("bool".to_string()),
            serde_json::Value::Number(_) => ContentInput::Unrecognized("number".to_string()),
            serde_json::Value::Array(_) => ContentInput::Unrecognized("array".to_string()),
            serde_json::Value::Object(_) => ContentInput::Unrecognized("object".to_string()),
        }
    }

    /// 入力種別の名前（ログ用）。
    pub fn kind(&self) -> &'static str {
        match self {
            ContentInput::Bytes(_) => "bytes",
            ContentInput::NamedFile { .. } => "named-file",
            ContentInput::Blob { .. } => "blob",
            ContentInput::RemoteUrl(_) => "remote-url",
            ContentInput::LiteralText(_) => "literal-text",
            ContentInput::Stream(_) => "stream",
            ContentInput::Unrecognized(_) => "unrecognized",
        }
    }
}

impl std::fmt::Debug for ContentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentInput::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ContentInput::NamedFile { name, bytes, mime } => f
                .debug_struct("NamedFile")
                .field("name", name)
                .field("len", &bytes.len())
                .field("mime", mime)
                .finish(),
            ContentInput::Blob { bytes, mime } => f
                .debug_struct("Blob")
                .field("len", &bytes.len())
                .field("mime", mime)
                .finish(),
            ContentInput::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
            ContentInput::LiteralText(text) => f.debug_tuple("LiteralText").field(text).finish(),
            ContentInput::Stream(_) => f.write_str("Stream"),
            ContentInput::Unrecognized(kind) => f.debug_tuple("Unrecognized").field(kind).finish(),
        }
    }
}

impl From<Vec<u8>> for ContentInput {
    fn from(bytes: Vec<u8>) -> Self {
        ContentInput::Bytes(bytes)
    }
}

impl From<&[u8]> for ContentInput {
    fn from(bytes: &[u8]) -> Self {
        ContentInput::Bytes(bytes.to_vec())
    }
}

impl From<String> for ContentInput {
    fn from(text: String) -> Self {
        Self::from_text(text)
    }
}

impl From<&str> for ContentInput {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

/// 拡張子からMIMEタイプを推定する。
fn guess_mime(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "json" => "application/json",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        _ => return None,
    };
    Some(mime)
}

/// ゲートウェイ経由でコンテンツをCIDに解決する。
pub struct ContentResolver {
    session: Arc<Session>,
}

impl ContentResolver {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// 入力を分類し、対応する経路でCIDを取得する。
    pub async fn add(&self, input: ContentInput) -> Result<String, PressError> {
        tracing::debug!(kind = input.kind(), "コンテンツを解決");
        match input {
            ContentInput::Bytes(bytes) => {
                self.upload(Part::bytes(bytes).file_name(ANONYMOUS_BLOB_NAME))
                    .await
            }
            ContentInput::NamedFile { name, bytes, mime } => {
                let part = with_mime(Part::bytes(bytes).file_name(name), mime.as_deref())?;
                self.upload(part).await
            }
            ContentInput::Blob { bytes, mime } => {
                let part = with_mime(
                    Part::bytes(bytes).file_name(ANONYMOUS_BLOB_NAME),
                    mime.as_deref(),
                )?;
                self.upload(part).await
            }
            ContentInput::RemoteUrl(url) => self.import(&url).await,
            ContentInput::LiteralText(text) => {
                let part = with_mime(
                    Part::text(text).file_name(ANONYMOUS_BLOB_NAME),
                    Some("text/plain"),
                )?;
                self.upload(part).await
            }
            ContentInput::Stream(reader) => {
                let body = reqwest::Body::wrap_stream(ReaderStream::new(reader));
                self.upload(Part::stream(body).file_name(ANONYMOUS_BLOB_NAME))
                    .await
            }
            ContentInput::Unrecognized(kind) => {
                tracing::warn!(kind = %kind, "コンテンツ入力の種別を判定できません");
                Err(PressError::UnsupportedInputKind(kind))
            }
        }
    }

    /// マルチパートの `file` フィールドとしてアップロードし、CIDを返す。
    pub async fn upload(&self, part: Part) -> Result<String, PressError> {
        let form = Form::new().part(FILE_FIELD, part);
        let response: AddResponse = self
            .session
            .backend()
            .post_multipart(ADD_PATH, form)
            .await?;
        tracing::debug!(cid = %response.cid, "アップロード完了");
        Ok(response.cid)
    }

    /// リモートURLをゲートウェイに取り込ませ、CIDを返す。
    pub async fn import(&self, url: &str) -> Result<String, PressError> {
        let reply: GatewayReply = self
            .session
            .backend()
            .post_json(
                IMPORT_PATH,
                &ImportRequest {
                    url: url.to_string(),
                },
            )
            .await?;
        if let Some(error) = reply.error {
            return Err(PressError::Import(error));
        }
        reply.cid.ok_or_else(|| PressError::MalformedResponse {
            path: IMPORT_PATH.to_string(),
            message: "cidがありません".to_string(),
        })
    }

    /// 解決済みのCIDをパスごとにまとめ、ディレクトリのCIDを返す。
    pub async fn folder(&self, mapping: &FolderRequest) -> Result<String, PressError> {
        let reply: GatewayReply = self
            .session
            .backend()
            .post_json(FOLDER_PATH, mapping)
            .await?;
        if let Some(error) = reply.error {
            return Err(PressError::Folder(error));
        }
        reply.cid.ok_or_else(|| PressError::MalformedResponse {
            path: FOLDER_PATH.to_string(),
            message: "cidがありません".to_string(),
        })
    }
}

fn with_mime(part: Part, mime: Option<&str>) -> Result<Part, PressError> {
    match mime {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|e| PressError::InvalidMime(format!("{mime}: {e}"))),
        None => Ok(part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::StaticProvider;
    use crate::test_helpers::{bodies_for, recording_route, start_mock_backend, RequestLog, SIGNER};
    use crate::transport::BackendClient;

    use axum::extract::Multipart;
    use axum::routing::post;
    use axum::Json;
    use std::sync::Mutex;

    /// 受信したマルチパートの記録（フィールド名, ファイル名, Content-Type, 本文）
    type UploadLog = Arc<Mutex<Vec<(String, Option<String>, Option<String>, Vec<u8>)>>>;

    struct MockGateway {
        resolver: ContentResolver,
        uploads: UploadLog,
        json_log: RequestLog,
    }

    async fn start_gateway(import_reply: serde_json::Value, folder_reply: serde_json::Value) -> MockGateway {
        let uploads: UploadLog = Arc::new(Mutex::new(Vec::new()));
        let json_log: RequestLog = Arc::new(Mutex::new(Vec::new()));

        let upload_log = uploads.clone();
        let router = axum::Router::new().route(
            ADD_PATH,
            post(move |mut multipart: Multipart| {
                let upload_log = upload_log.clone();
                async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let name = field.name().unwrap_or_default().to_string();
                        let file_name = field.file_name().map(str::to_string);
                        let content_type = field.content_type().map(str::to_string);
                        let data = field.bytes().await.unwrap().to_vec();
                        upload_log
                            .lock()
                            .unwrap()
                            .push((name, file_name, content_type, data));
                    }
                    Json(serde_json::json!({"cid": "bafyadded"}))
                }
            }),
        );
        let router = recording_route(router, IMPORT_PATH, json_log.clone(), import_reply);
        let router = recording_route(router, FOLDER_PATH, json_log.clone(), folder_reply);

        let base = start_mock_backend(router).await;
        let session = Session::from_parts(
            SIGNER,
            Arc::new(StaticProvider::new(vec![SIGNER.to_string()])),
            BackendClient::new(base, reqwest::Client::new()),
        );

        MockGateway {
            resolver: ContentResolver::new(session),
            uploads,
            json_log,
        }
    }

    async fn default_gateway() -> MockGateway {
        start_gateway(
            serde_json::json!({"cid": "bafyimported"}),
            serde_json::json!({"cid": "bafyfolder"}),
        )
        .await
    }

    #[tokio::test]
    async fn test_bytes_upload_as_anonymous_blob() {
        let gw = default_gateway().await;

        let cid = gw.resolver.add(ContentInput::from(vec![1u8, 2, 3])).await.unwrap();

        assert_eq!(cid, "bafyadded");
        let uploads = gw.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "file");
        assert_eq!(uploads[0].1.as_deref(), Some("blob"));
        assert_eq!(uploads[0].3, vec![1u8, 2, 3]);
        assert!(bodies_for(&gw.json_log, IMPORT_PATH).is_empty());
    }

    #[tokio::test]
    async fn test_named_file_keeps_name_and_mime() {
        let gw = default_gateway().await;

        let cid = gw
            .resolver
            .add(ContentInput::named_file("cover.png", vec![0x89, 0x50]))
            .await
            .unwrap();

        assert_eq!(cid, "bafyadded");
        let uploads = gw.uploads.lock().unwrap();
        assert_eq!(uploads[0].1.as_deref(), Some("cover.png"));
        assert_eq!(uploads[0].2.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_blob_upload() {
        let gw = default_gateway().await;

        let cid = gw
            .resolver
            .add(ContentInput::blob(vec![7u8; 4], Some("audio/mpeg".to_string())))
            .await
            .unwrap();

        assert_eq!(cid, "bafyadded");
        let uploads = gw.uploads.lock().unwrap();
        assert_eq!(uploads[0].1.as_deref(), Some("blob"));
        assert_eq!(uploads[0].2.as_deref(), Some("audio/mpeg"));
    }

    /// httpで始まる文字列はimport経路になること
    #[tokio::test]
    async fn test_url_goes_through_import() {
        let gw = default_gateway().await;

        let cid = gw
            .resolver
            .add(ContentInput::from("https://example.com/a.png"))
            .await
            .unwrap();

        assert_eq!(cid, "bafyimported");
        let bodies = bodies_for(&gw.json_log, IMPORT_PATH);
        assert_eq!(bodies, vec![serde_json::json!({"url": "https://example.com/a.png"})]);
        assert!(gw.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_literal_text_uploaded_as_text_blob() {
        let gw = default_gateway().await;

        let cid = gw.resolver.add(ContentInput::from("hello world")).await.unwrap();

        assert_eq!(cid, "bafyadded");
        let uploads = gw.uploads.lock().unwrap();
        assert_eq!(uploads[0].2.as_deref(), Some("text/plain"));
        assert_eq!(uploads[0].3, b"hello world".to_vec());
    }

    #[tokio::test]
    async fn test_stream_is_uploaded() {
        let gw = default_gateway().await;

        let reader = std::io::Cursor::new(b"streamed bytes".to_vec());
        let cid = gw.resolver.add(ContentInput::stream(reader)).await.unwrap();

        assert_eq!(cid, "bafyadded");
        let uploads = gw.uploads.lock().unwrap();
        assert_eq!(uploads[0].0, "file");
        assert_eq!(uploads[0].1.as_deref(), Some("blob"));
        assert_eq!(uploads[0].3, b"streamed bytes".to_vec());
    }

    /// パイプの容量を超える内容も、書き込みと並行して送信されゲートウェイに全て届くこと
    #[tokio::test]
    async fn test_stream_larger_than_pipe_is_forwarded() {
        use tokio::io::AsyncWriteExt;

        let gw = default_gateway().await;

        let (mut writer, reader) = tokio::io::duplex(1024);
        let expected: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let payload = expected.clone();
        let producer = tokio::spawn(async move {
            for chunk in payload.chunks(4096) {
                writer.write_all(chunk).await.unwrap();
            }
        });

        let cid = gw.resolver.add(ContentInput::stream(reader)).await.unwrap();
        producer.await.unwrap();

        assert_eq!(cid, "bafyadded");
        assert_eq!(gw.uploads.lock().unwrap()[0].3, expected);
    }

    /// 解釈できないMIMEタイプは入力種別とは別のエラーになり、送信されないこと
    #[tokio::test]
    async fn test_invalid_mime_is_reported_separately() {
        let gw = default_gateway().await;

        let result = gw
            .resolver
            .add(ContentInput::blob(vec![1u8], Some("not a mime".to_string())))
            .await;

        assert!(matches!(result, Err(PressError::InvalidMime(ref m)) if m.starts_with("not a mime")));
        assert!(gw.uploads.lock().unwrap().is_empty());
    }

    /// 判定できない入力はリクエストを送らずに失敗すること
    #[tokio::test]
    async fn test_unrecognized_input_is_rejected() {
        let gw = default_gateway().await;

        let result = gw
            .resolver
            .add(ContentInput::from_json(&serde_json::json!(42)))
            .await;

        assert!(matches!(result, Err(PressError::UnsupportedInputKind(ref k)) if k == "number"));
        assert!(gw.uploads.lock().unwrap().is_empty());
        assert!(gw.json_log.lock().unwrap().is_empty());
    }

    /// {error} 応答はゲートウェイのメッセージのままエラーになること
    #[tokio::test]
    async fn test_import_error_propagates_message() {
        let gw = start_gateway(
            serde_json::json!({"error": "bad url"}),
            serde_json::json!({"cid": "bafyfolder"}),
        )
        .await;

        let result = gw.resolver.add(ContentInput::from("http://nowhere")).await;

        match result {
            Err(e @ PressError::Import(_)) => assert_eq!(e.to_string(), "bad url"),
            other => panic!("Importエラーを期待: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_folder_bundles_mapping() {
        let gw = default_gateway().await;

        let mut mapping = FolderRequest::new();
        mapping.insert("images/1.png".to_string(), "bafy1".to_string());
        mapping.insert("meta/1.json".to_string(), "bafy2".to_string());

        let cid = gw.resolver.folder(&mapping).await.unwrap();

        assert_eq!(cid, "bafyfolder");
        assert_eq!(
            bodies_for(&gw.json_log, FOLDER_PATH),
            vec![serde_json::json!({"images/1.png": "bafy1", "meta/1.json": "bafy2"})]
        );
    }

    #[tokio::test]
    async fn test_folder_error_propagates_message() {
        let gw = start_gateway(
            serde_json::json!({"cid": "bafyimported"}),
            serde_json::json!({"error": "unknown cid bafy9"}),
        )
        .await;

        let mut mapping = FolderRequest::new();
        mapping.insert("a".to_string(), "bafy9".to_string());

        let result = gw.resolver.folder(&mapping).await;
        match result {
            Err(e @ PressError::Folder(_)) => assert_eq!(e.to_string(), "unknown cid bafy9"),
            other => panic!("Folderエラーを期待: {other:?}"),
        }
    }

    #[test]
    fn test_text_classification() {
        assert!(matches!(ContentInput::from("http://x"), ContentInput::RemoteUrl(_)));
        assert!(matches!(ContentInput::from("https://x"), ContentInput::RemoteUrl(_)));
        assert!(matches!(ContentInput::from("ipfs://x"), ContentInput::LiteralText(_)));
        assert!(matches!(
            ContentInput::from_json(&serde_json::json!("httpish")),
            ContentInput::RemoteUrl(_)
        ));
        assert!(matches!(
            ContentInput::from_json(&serde_json::json!({"a": 1})),
            ContentInput::Unrecognized(_)
        ));
    }

    #[tokio::test]
    async fn test_from_path_reads_named_file() {
        let path = std::env::temp_dir().join(format!("mintpress-{}.jpg", std::process::id()));
        tokio::fs::write(&path, b"jpeg").await.unwrap();

        let input = ContentInput::from_path(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        match input {
            ContentInput::NamedFile { name, bytes, mime } => {
                assert!(name.ends_with(".jpg"));
                assert_eq!(bytes, b"jpeg".to_vec());
                assert_eq!(mime.as_deref(), Some("image/jpeg"));
            }
            other => panic!("NamedFileを期待: {other:?}"),
        }
    }
}
