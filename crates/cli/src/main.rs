//! # Mintpress CLI
//!
//! クライアントの各操作をサブコマンドとして公開する。
//! 結果はJSONで標準出力に、ログは標準エラーに出力する。
//!
//! ## サブコマンド
//! - `account` — セッションを確立し、署名者アドレスを表示
//! - `add` — ファイル・URL・テキストをCIDに解決
//! - `folder` — `path=cid` の組をディレクトリCIDにまとめる
//! - `build` — ミント要求を初期化し、正規エンコーディングを表示
//! - `mint` — ミントを build → sign → send
//! - `trade` — 取引を build → sign → send

mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mintpress_client::ContentInput;
use mintpress_types::{FolderRequest, MintDraft};

use crate::config::{parse_folder_entry, CliConfig, TokenIdMode, WalletKind};

#[derive(Parser)]
#[command(name = "mintpress", about = "Build, sign and send mints and trades")]
struct Cli {
    /// バックエンドのベースURL（MINTPRESS_HOST）
    #[arg(long, global = true)]
    host: Option<String>,
    /// 署名プロバイダ（MINTPRESS_WALLET）
    #[arg(long, global = true, value_enum)]
    wallet: Option<WalletKind>,
    /// ウォレットのJSON-RPCエンドポイント（MINTPRESS_WALLET_RPC）
    #[arg(long, global = true)]
    wallet_rpc: Option<String>,
    /// HTTPタイムアウト秒数（MINTPRESS_HTTP_TIMEOUT_SECS）
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// トークンIDの採番方法（MINTPRESS_TOKEN_ID）
    #[arg(long, global = true, value_enum)]
    token_id: Option<TokenIdMode>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 署名者アドレスを表示する
    Account,
    /// コンテンツをCIDに解決する
    Add {
        /// ファイルを読み込んでアップロードする
        #[arg(long, conflicts_with_all = ["text", "input"])]
        file: Option<PathBuf>,
        /// テキストとしてアップロードする（URLでも取り込まない）
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,
        /// URL（http...）またはテキスト
        input: Option<String>,
    },
    /// path=cid の組をディレクトリCIDにまとめる
    Folder {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// ミント要求を初期化し、正規エンコーディングを表示する
    Build {
        /// ミント要求のJSONファイル
        #[arg(long)]
        json: PathBuf,
    },
    /// ミントする
    Mint {
        /// ミント要求のJSONファイル（他のオプションはこれを上書きする）
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// 画像のCIDまたはURI
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        supply: Option<u64>,
    },
    /// 取引を作成する
    Trade {
        /// 取引内容のJSONファイル
        #[arg(long)]
        json: PathBuf,
    },
}

impl Cli {
    /// 環境変数の設定にコマンドライン引数を重ねる。
    fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = CliConfig::from_env()?;
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(wallet) = self.wallet {
            config.wallet = wallet;
        }
        if let Some(wallet_rpc) = &self.wallet_rpc {
            config.wallet_rpc = wallet_rpc.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(token_id) = self.token_id {
            config.token_id = token_id;
        }
        Ok(config)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    tracing::debug!(host = %config.host, wallet = ?config.wallet, "設定を読み込みました");

    let press = config.connect().await?;

    let output = match cli.command {
        Command::Account => serde_json::json!({ "account": press.account() }),
        Command::Add { file, text, input } => {
            let content = match (file, text, input) {
                (Some(path), _, _) => ContentInput::from_path(path).await?,
                (None, Some(text), _) => ContentInput::LiteralText(text),
                (None, None, Some(input)) => ContentInput::from_text(input),
                (None, None, None) => anyhow::bail!("--file, --text, または入力を指定してください"),
            };
            let cid = press.add(content).await?;
            serde_json::json!({ "cid": cid })
        }
        Command::Folder { entries } => {
            let mut mapping = FolderRequest::new();
            for entry in &entries {
                let (path, cid) = parse_folder_entry(entry)?;
                mapping.insert(path, cid);
            }
            let cid = press.folder(&mapping).await?;
            serde_json::json!({ "cid": cid })
        }
        Command::Build { json } => {
            let draft: MintDraft = read_json(&json).await?;
            let built = press.build(draft).await?;
            serde_json::json!({
                "body": built.payload,
                "type": built.kind,
                "encoding": built.encoding,
            })
        }
        Command::Mint {
            json,
            name,
            description,
            image,
            supply,
        } => {
            let mut draft: MintDraft = match json {
                Some(path) => read_json(&path).await?,
                None => MintDraft::default(),
            };
            if name.is_some() {
                draft.metadata.name = name;
            }
            if description.is_some() {
                draft.metadata.description = description;
            }
            if image.is_some() {
                draft.metadata.image = image;
            }
            if supply.is_some() {
                draft.supply = supply;
            }
            press.create(draft).await?
        }
        Command::Trade { json } => {
            let body: serde_json::Value = read_json(&json).await?;
            press.trade().create(body).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
