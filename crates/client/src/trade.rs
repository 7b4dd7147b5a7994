//! # 取引ビルダー
//!
//! /trade/build は2つの並行した表現を返す。
//! - `original`: サーバーが保存・中継する形式
//! - `encoded`: 署名用の構造化データ形式
//!
//! メイカーは両方に設定し、署名は `encoded` に対して行い、
//! 得られた署名を `original` に付与して `original` を送信する。

use std::sync::Arc;

use mintpress_types::{Signature, TradeBuildRequest, TradeBuilt, TradeSendRequest};

use crate::error::PressError;
use crate::session::Session;
use crate::signer::SignOutcome;

pub const TRADE_BUILD_PATH: &str = "/trade/build";
pub const TRADE_SEND_PATH: &str = "/trade/send";

/// 取引ビルダー。
pub struct TradeBuilder {
    session: Arc<Session>,
}

impl TradeBuilder {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// 取引の2表現を取得し、メイカーを署名者に設定する。
    pub async fn build(&self, body: serde_json::Value) -> Result<TradeBuilt, PressError> {
        let mut built: TradeBuilt = self
            .session
            .backend()
            .post_json(TRADE_BUILD_PATH, &TradeBuildRequest { body })
            .await?;
        built.assign_maker(self.session.account());
        Ok(built)
    }

    /// `encoded` に署名する。
    pub async fn sign(&self, built: &TradeBuilt) -> SignOutcome {
        self.session.signing_channel().sign(&built.encoded).await
    }

    /// 署名を `original` に付与して送信する。
    pub async fn send(
        &self,
        mut built: TradeBuilt,
        signature: &Signature,
    ) -> Result<serde_json::Value, PressError> {
        built.attach_signature(signature);
        self.session
            .backend()
            .post_json(
                TRADE_SEND_PATH,
                &TradeSendRequest {
                    body: built.original,
                },
            )
            .await
    }

    /// build → sign → send を順に実行する。
    pub async fn create(&self, body: serde_json::Value) -> Result<serde_json::Value, PressError> {
        let built = self.build(body).await?;
        let signature = self.sign(&built).await.into_result()?;
        let ack = self.send(built, &signature).await?;
        tracing::info!(maker = %self.session.account(), "取引を送信しました");
        Ok(ack)
    }
}
