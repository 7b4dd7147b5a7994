//! # Mintpress 共有型定義
//!
//! バックエンド（build/relay サービス）とコンテンツゲートウェイの
//! REST API で交換されるデータ構造をRust構造体として提供する。
//!
//! ## ワイヤ形式の規則
//! - フィールド名はバックエンドの JSON 表記（`tokenId`, `type` 等）に合わせる
//! - 呼び出し側が追加した未知のフィールドは `#[serde(flatten)]` で保持し、そのまま送り返す
//! - アドレスは `0x` 接頭辞付き16進文字列

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// クリエイター分配の全量（ベーシスポイント）。
pub const FULL_SHARE_BASIS_POINTS: u32 = 10_000;

// ---------------------------------------------------------------------------
// トークン種別・クリエイター分配
// ---------------------------------------------------------------------------

/// ミントするトークンの種別。
///
/// 発行量（supply）が1を超える場合はマルチエディション、それ以外はシングルエディション。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// シングルエディション
    #[serde(rename = "ERC721")]
    Erc721,
    /// マルチエディション
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl TokenKind {
    /// 宣言された発行量からトークン種別を判定する。
    pub fn classify(supply: Option<u64>) -> Self {
        match supply {
            Some(n) if n > 1 => TokenKind::Erc1155,
            _ => TokenKind::Erc721,
        }
    }

    /// ワイヤ上の表記を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Erc721 => "ERC721",
            TokenKind::Erc1155 => "ERC1155",
        }
    }
}

/// ロイヤリティ・所有権の分配エントリ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// 受取アカウント
    pub account: String,
    /// 分配率（ベーシスポイント、ワイヤ上は `value`）
    #[serde(rename = "value")]
    pub share_basis_points: u32,
}

impl Creator {
    /// 全量を1アカウントに割り当てるエントリを作る。
    pub fn sole(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            share_basis_points: FULL_SHARE_BASIS_POINTS,
        }
    }
}

// ---------------------------------------------------------------------------
// ミントペイロード
// ---------------------------------------------------------------------------

/// 呼び出し側が組み立てるミント要求（正規化前）。
///
/// `tokenId` やメタデータの各フィールドは省略可能。
/// Initialize段階で [`MintPayload`] に正規化される。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintDraft {
    /// トークンID（省略時はクライアントまたはサーバーで採番）
    #[serde(rename = "tokenId", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// 発行量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<u64>,
    /// クリエイター分配（省略時は署名者に全量）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creators: Option<Vec<Creator>>,
    /// メタデータ
    #[serde(default)]
    pub metadata: DraftMetadata,
    /// その他のフィールド（そのままバックエンドへ渡す）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 正規化前のメタデータ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 正規化済みメタデータ。必須フィールドは常に存在する（未設定なら空文字列）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<DraftMetadata> for Metadata {
    fn from(draft: DraftMetadata) -> Self {
        Self {
            name: draft.name.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            image: draft.image.unwrap_or_default(),
            extra: draft.extra,
        }
    }
}

/// Initialize段階を通過したミントペイロード。
///
/// トークンIDが確定し、メタデータの必須フィールドが埋まっている。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintPayload {
    /// トークンID（10進文字列）
    #[serde(rename = "tokenId")]
    pub token_id: String,
    /// 発行量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<u64>,
    /// クリエイター分配（Build段階で既定値が補われる）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creators: Option<Vec<Creator>>,
    /// メタデータ
    pub metadata: Metadata,
    /// その他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MintPayload {
    /// このペイロードのトークン種別。
    pub fn kind(&self) -> TokenKind {
        TokenKind::classify(self.supply)
    }
}

// ---------------------------------------------------------------------------
// 正規エンコーディング・署名
// ---------------------------------------------------------------------------

/// バックエンドが導出した構造化データ形式（typed-data 署名の対象）。
///
/// クライアントは再計算せず、受け取った値をそのまま署名に渡す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalEncoding(pub Value);

/// 署名プロバイダが返す署名文字列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// /token/* (バックエンド)
// ---------------------------------------------------------------------------

/// POST /token/build リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBuildRequest {
    pub body: MintPayload,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// POST /token/send リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSendRequest {
    pub body: MintPayload,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// 正規エンコーディングに対する署名
    pub sig: Signature,
}

/// POST /token/init リクエスト（サーバー採番）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInitRequest {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// 署名者アドレス
    pub address: String,
}

/// POST /token/init レスポンス。採番結果を取得するURLを返す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInitResponse {
    pub url: String,
}

/// 採番URLのレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIdResponse {
    #[serde(rename = "tokenId", default)]
    pub token_id: Option<String>,
}

// ---------------------------------------------------------------------------
// /trade/* (バックエンド)
// ---------------------------------------------------------------------------

/// POST /trade/build リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeBuildRequest {
    pub body: Value,
}

/// POST /trade/build レスポンス。
///
/// `original` はサーバーが保存・中継する形式、`encoded` は署名用の構造化データ形式。
/// 両者は自動では同期されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBuilt {
    pub original: Map<String, Value>,
    pub encoded: EncodedTrade,
}

impl TradeBuilt {
    /// メイカーを両方の表現に設定する。
    pub fn assign_maker(&mut self, maker: &str) {
        self.original
            .insert("maker".to_string(), Value::String(maker.to_string()));
        self.encoded
            .message
            .insert("maker".to_string(), Value::String(maker.to_string()));
    }

    /// 署名を `original` に付与する。
    pub fn attach_signature(&mut self, signature: &Signature) {
        self.original.insert(
            "signature".to_string(),
            Value::String(signature.0.clone()),
        );
    }
}

/// 取引の構造化データ形式（`types`, `domain`, `primaryType`, `message`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedTrade {
    pub message: Map<String, Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// POST /trade/send リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSendRequest {
    pub body: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// /ipfs/* (コンテンツゲートウェイ)
// ---------------------------------------------------------------------------

/// POST /ipfs/add レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResponse {
    pub cid: String,
}

/// POST /ipfs/import リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub url: String,
}

/// POST /ipfs/folder リクエスト（パス → CID）。
pub type FolderRequest = BTreeMap<String, String>;

/// /ipfs/import, /ipfs/folder のレスポンス。`cid` か `error` のどちらかを持つ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// 署名プロバイダ
// ---------------------------------------------------------------------------

/// 署名プロバイダへの要求（`{method, params, from}`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub method: String,
    pub params: Vec<String>,
    pub from: String,
}

/// JSON-RPC 2.0 リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

/// JSON-RPC 2.0 レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC エラーオブジェクト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}
