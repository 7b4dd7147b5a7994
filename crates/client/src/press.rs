//! # エントリオブジェクト
//!
//! セッションを確立し、コンテンツ解決・ミント・取引の各ビルダーに同じセッションを渡す。

use std::sync::Arc;

use mintpress_types::{FolderRequest, MintDraft, MintPayload};
use serde::Serialize;

use crate::config::{MintOptions, SessionConfig};
use crate::content::{ContentInput, ContentResolver};
use crate::error::PressError;
use crate::session::Session;
use crate::signer::SignOutcome;
use crate::token::{BuiltToken, TokenBuilder};
use crate::trade::TradeBuilder;

/// クライアントのエントリオブジェクト。
pub struct Press {
    session: Arc<Session>,
    content: ContentResolver,
    token: TokenBuilder,
    trade: TradeBuilder,
}

impl Press {
    /// セッションを確立して構築する。
    pub async fn init(config: SessionConfig) -> Result<Self, PressError> {
        Self::init_with(config, MintOptions::default()).await
    }

    /// ミントオプションを指定して構築する。
    pub async fn init_with(config: SessionConfig, options: MintOptions) -> Result<Self, PressError> {
        let session = Session::establish(config).await?;
        Ok(Self::with_session(session, options))
    }

    /// 確立済みのセッションから構築する。
    pub fn with_session(session: Arc<Session>, options: MintOptions) -> Self {
        Self {
            content: ContentResolver::new(session.clone()),
            token: TokenBuilder::new(session.clone(), options),
            trade: TradeBuilder::new(session.clone()),
            session,
        }
    }

    /// アクティブな署名者アドレス。
    pub fn account(&self) -> &str {
        self.session.account()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// コンテンツをCIDに解決する。
    pub async fn add(&self, input: impl Into<ContentInput>) -> Result<String, PressError> {
        self.content.add(input.into()).await
    }

    /// パス → CID のマッピングをディレクトリCIDにまとめる。
    pub async fn folder(&self, mapping: &FolderRequest) -> Result<String, PressError> {
        self.content.folder(mapping).await
    }

    /// ミント要求を初期化する（トークンID・メタデータの補完）。
    pub async fn initialize(&self, draft: MintDraft) -> Result<MintPayload, PressError> {
        self.token.initialize(draft).await
    }

    /// ミント要求を初期化し、正規エンコーディングを取得する。
    pub async fn build(&self, draft: MintDraft) -> Result<BuiltToken, PressError> {
        let payload = self.token.initialize(draft).await?;
        self.token.build(payload).await
    }

    /// 任意の構造化メッセージに署名する。
    pub async fn sign<T>(&self, message: &T) -> SignOutcome
    where
        T: Serialize + ?Sized,
    {
        self.session.signing_channel().sign(message).await
    }

    /// ミントを build → sign → send する。
    pub async fn create(&self, draft: MintDraft) -> Result<serde_json::Value, PressError> {
        self.token.create(draft).await
    }

    pub fn content(&self) -> &ContentResolver {
        &self.content
    }

    pub fn token(&self) -> &TokenBuilder {
        &self.token
    }

    pub fn trade(&self) -> &TradeBuilder {
        &self.trade
    }
}
