//! # クライアントエラー型
//!
//! build → sign → send の全段階で共通のエラー型。
//! ゲートウェイ・バックエンド・署名プロバイダ・入力分類のいずれの失敗も
//! 型付きの `Result` として呼び出し側へ返す。

/// 署名プロバイダのエラー型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// ユーザーが署名・アカウント接続を拒否した
    #[error("ユーザーが要求を拒否しました: {0}")]
    Rejected(String),
    /// プロバイダに到達できない
    #[error("署名プロバイダに接続できません: {0}")]
    Unavailable(String),
    /// プロバイダが不正な応答・要求エラーを返した
    #[error("署名プロバイダのエラー: {0}")]
    Malformed(String),
}

/// クライアントエラー型。
#[derive(Debug, thiserror::Error)]
pub enum PressError {
    /// セッション初期化時に署名プロバイダが利用できない
    #[error("署名プロバイダが利用できません: {0}")]
    ProviderUnavailable(String),
    /// 署名が拒否された（送信は行われない）
    #[error("署名が拒否されました: {0}")]
    SignDeclined(String),
    /// Initialize後も必須フィールドが欠落している
    #[error("必須フィールドが未設定です: {0}")]
    IncompleteMetadata(String),
    /// /ipfs/import がエラーを返した（メッセージはゲートウェイのもの）
    #[error("{0}")]
    Import(String),
    /// /ipfs/folder がエラーを返した（メッセージはゲートウェイのもの）
    #[error("{0}")]
    Folder(String),
    /// コンテンツ入力の種別を判定できない
    #[error("未対応のコンテンツ入力です: {0}")]
    UnsupportedInputKind(String),
    /// 指定されたMIMEタイプを解釈できない
    #[error("不正なMIMEタイプです: {0}")]
    InvalidMime(String),
    /// 署名者アドレスの形式が不正
    #[error("不正なアドレスです: {0}")]
    InvalidAddress(String),
    /// トークンIDが256ビット符号なし整数として表現できない
    #[error("不正なトークンIDです: {0}")]
    InvalidTokenId(String),
    /// バックエンドへの送信に失敗
    #[error("バックエンドに接続できません ({path}): {message}")]
    BackendUnreachable { path: String, message: String },
    /// バックエンドが2xx以外を返した（detailはレスポンス本文そのもの）
    #[error("バックエンドがエラーを返しました ({path}): HTTP {status} - {detail}")]
    BackendRejected {
        path: String,
        status: u16,
        detail: String,
    },
    /// レスポンスのパースに失敗
    #[error("レスポンスのパースに失敗 ({path}): {message}")]
    MalformedResponse { path: String, message: String },
    /// ローカル入出力の失敗（ファイル・ストリーム読み込み）
    #[error("入出力エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl PressError {
    /// バックエンドが返したレスポンス本文（2xx以外の場合のみ）。
    pub fn detail(&self) -> Option<&str> {
        match self {
            PressError::BackendRejected { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
