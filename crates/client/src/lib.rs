//! # Mintpress クライアント
//!
//! 作品（画像・ファイル + メタデータ）や取引の意図を、
//! サーバー側で検証可能な署名付きペイロードに変換する。
//!
//! ## 協調する外部サービス
//! - 署名プロバイダ（ウォレット）: 秘密鍵を公開せずに構造化データ署名を行う
//! - バックエンド: 正規エンコーディングの計算、署名検証、チェーンへの中継
//! - コンテンツゲートウェイ: バイト列・URLを受け取りコンテンツ識別子を返す
//!
//! ## build → sign → send
//! 1. 署名前の正規表現を組み立てる（/token/build, /trade/build）
//! 2. 構造化データ形式に対する署名をプロバイダから得る
//! 3. 元のペイロードに署名を添えて送信する（/token/send, /trade/send）

pub mod config;
pub mod content;
pub mod error;
pub mod press;
pub mod session;
pub mod signer;
pub mod token;
pub mod token_id;
pub mod trade;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use config::{MintOptions, SessionConfig, TokenIdStrategy};
pub use content::{ContentInput, ContentResolver};
pub use error::{PressError, ProviderError};
pub use press::Press;
pub use session::Session;
pub use signer::{RpcWalletProvider, SignOutcome, SigningChannel, SigningProvider, StaticProvider};
pub use token::{BuiltToken, TokenBuilder};
pub use trade::TradeBuilder;
pub use transport::BackendClient;

pub use mintpress_types as types;
