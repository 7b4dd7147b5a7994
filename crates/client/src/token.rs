//! # ミントビルダー
//!
//! 作品（メタデータ + メディアCID）のミントを build → sign → send の順に進める。
//!
//! ## 処理フロー
//! 1. Initialize: トークンIDの確定（ローカル生成 or /token/init）、メタデータ必須フィールドの補完
//! 2. Build: トークン種別の判定、クリエイター分配の既定値、/token/build で正規エンコーディングを取得
//! 3. Sign: 正規エンコーディングに署名（元のペイロードではない）
//! 4. Send: 元のペイロード + 種別 + 署名を /token/send に送信
//!
//! 各段階は前段が成功した場合のみ実行する。署名が拒否された場合は送信しない。

use std::sync::Arc;

use mintpress_types::{
    CanonicalEncoding, Creator, MintDraft, MintPayload, Signature, TokenBuildRequest,
    TokenIdResponse, TokenInitRequest, TokenInitResponse, TokenKind, TokenSendRequest,
};

use crate::config::{MintOptions, TokenIdStrategy};
use crate::error::PressError;
use crate::session::Session;
use crate::signer::SignOutcome;
use crate::token_id;

pub const TOKEN_INIT_PATH: &str = "/token/init";
pub const TOKEN_BUILD_PATH: &str = "/token/build";
pub const TOKEN_SEND_PATH: &str = "/token/send";

/// Build段階の結果。元のペイロードと、それから導出された正規エンコーディングの組。
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltToken {
    /// クリエイター分配が補われた元のペイロード
    pub payload: MintPayload,
    /// トークン種別
    pub kind: TokenKind,
    /// バックエンドが導出した署名対象
    pub encoding: CanonicalEncoding,
}

/// ミントビルダー。
pub struct TokenBuilder {
    session: Arc<Session>,
    options: MintOptions,
}

impl TokenBuilder {
    pub fn new(session: Arc<Session>, options: MintOptions) -> Self {
        Self { session, options }
    }

    /// Initialize: トークンIDを確定し、メタデータを正規化する。
    pub async fn initialize(&self, draft: MintDraft) -> Result<MintPayload, PressError> {
        let kind = TokenKind::classify(draft.supply);
        let token_id = match draft.token_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => match self.options.id_strategy {
                TokenIdStrategy::Local => token_id::generate(self.session.account())?,
                TokenIdStrategy::Server => self.request_token_id(kind).await?,
            },
        };

        if token_id.is_empty() {
            tracing::warn!("トークンIDを確定できませんでした");
            return Err(PressError::IncompleteMetadata("tokenId".to_string()));
        }

        tracing::debug!(token_id = %token_id, kind = kind.as_str(), "ミントを初期化");

        Ok(MintPayload {
            token_id,
            supply: draft.supply,
            creators: draft.creators,
            metadata: draft.metadata.into(),
            extra: draft.extra,
        })
    }

    /// /token/init で採番URLを取得し、そのURLからトークンIDを取得する。
    async fn request_token_id(&self, kind: TokenKind) -> Result<String, PressError> {
        let backend = self.session.backend();
        let init: TokenInitResponse = backend
            .post_json(
                TOKEN_INIT_PATH,
                &TokenInitRequest {
                    kind,
                    address: self.session.account().to_string(),
                },
            )
            .await?;
        let response: TokenIdResponse = backend.get_json(&init.url).await?;
        Ok(response.token_id.unwrap_or_default())
    }

    /// Build: クリエイター分配を補い、正規エンコーディングを要求する。
    pub async fn build(&self, mut payload: MintPayload) -> Result<BuiltToken, PressError> {
        let kind = payload.kind();
        if payload.creators.is_none() {
            payload.creators = Some(vec![Creator::sole(self.session.account())]);
        }

        let encoding: CanonicalEncoding = self
            .session
            .backend()
            .post_json(
                TOKEN_BUILD_PATH,
                &TokenBuildRequest {
                    body: payload.clone(),
                    kind,
                },
            )
            .await?;

        Ok(BuiltToken {
            payload,
            kind,
            encoding,
        })
    }

    /// Sign: 正規エンコーディングに署名する。
    pub async fn sign(&self, built: &BuiltToken) -> SignOutcome {
        self.session.signing_channel().sign(&built.encoding).await
    }

    /// Send: 元のペイロードに署名を添えて送信し、バックエンドの応答を返す。
    pub async fn send(
        &self,
        built: BuiltToken,
        signature: Signature,
    ) -> Result<serde_json::Value, PressError> {
        self.session
            .backend()
            .post_json(
                TOKEN_SEND_PATH,
                &TokenSendRequest {
                    body: built.payload,
                    kind: built.kind,
                    sig: signature,
                },
            )
            .await
    }

    /// build → sign → send を順に実行する。
    pub async fn create(&self, draft: MintDraft) -> Result<serde_json::Value, PressError> {
        let payload = self.initialize(draft).await?;
        let built = self.build(payload).await?;
        let token_id = built.payload.token_id.clone();
        let signature = self.sign(&built).await.into_result()?;
        let ack = self.send(built, signature).await?;
        tracing::info!(token_id = %token_id, "ミントを送信しました");
        Ok(ack)
    }
}
