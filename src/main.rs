mod ai;
mod cli;
mod command;
mod config;
mod device;
mod logging;
mod session;
mod shell;

use shell::Shell;
use tracing::info;

#[tokio::main]
async fn main() {
    // .env ファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // ログシステムの初期化（guard は終了直前まで保持する）
    let guard = logging::init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "coolish started");

    let mut shell = Shell::new();
    let code = shell.run().await;

    info!(exit_code = code, "coolish exiting");

    // process::exit はデストラクタを実行しないため、先にログをフラッシュする
    drop(guard);
    std::process::exit(code);
}
