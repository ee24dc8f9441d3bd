//! Shell モジュール — REPL ループと画面状態の管理
//!
//! `Shell` が REPL に必要な状態（エディタ、プロンプト、セッション）をまとめ、
//! 入力の振り分けは `input` サブモジュールに分離する。

mod editor;
mod input;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reedline::{Reedline, Signal};
use tracing::{info, warn};

use crate::ai::{Interpreter, OpenAiModel};
use crate::cli::banner;
use crate::cli::dashboard::render_fleet;
use crate::cli::prompt::CoolishPrompt;
use crate::config::CoolishConfig;
use crate::session::Session;

/// REPL の状態を管理する構造体。
pub struct Shell {
    editor: Reedline,
    prompt: CoolishPrompt,
    session: Session<OpenAiModel>,
    /// プロンプトと共有する稼働台数
    units_on: Arc<AtomicUsize>,
}

impl Shell {
    /// 設定を読み込み、フリート・AI クライアント・エディタを初期化する。
    pub fn new() -> Self {
        let config = CoolishConfig::load();
        let fleet = config.fleet();

        // API キー未設定などで失敗した場合は AI なしで起動する
        let interpreter = match OpenAiModel::new(&config.ai) {
            Ok(model) => {
                info!("AI client initialized successfully");
                Some(Interpreter::new(model, config.ai.timeout()))
            }
            Err(e) => {
                warn!("AI disabled: {e}");
                eprintln!("coolish: warning: AI disabled: {e}");
                None
            }
        };

        let unit_names: Vec<String> = fleet.devices().iter().map(|d| d.name.clone()).collect();
        let history_path = CoolishConfig::config_path().with_file_name("history.txt");
        let editor = editor::build_editor(&unit_names, history_path);

        let units_on = Arc::new(AtomicUsize::new(fleet.powered_on()));
        let prompt = CoolishPrompt::new(Arc::clone(&units_on), fleet.len());

        Self {
            editor,
            prompt,
            session: Session::new(fleet, interpreter),
            units_on,
        }
    }

    /// REPL ループを実行する。
    ///
    /// Ctrl-D または `exit` で終了する。
    /// 戻り値: 終了コード（REPL 内部エラー時のみ `1`）。
    pub async fn run(&mut self) -> i32 {
        banner::print_welcome(self.session.assistant_enabled());
        println!("{}\n", render_fleet(self.session.fleet()));

        let mut code = 0;

        loop {
            match self.editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => {
                    if !self.handle_input(&line).await {
                        break;
                    }
                }
                Ok(Signal::CtrlC) => {
                    // 入力中の行を破棄するだけ
                    println!();
                }
                Ok(Signal::CtrlD) => {
                    info!("Ctrl-D received, exiting");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "REPL error, exiting");
                    eprintln!("coolish: error: {e}");
                    code = 1;
                    break;
                }
            }
        }

        banner::print_goodbye();
        code
    }

    /// プロンプトの稼働台数表示をフリートに合わせる。
    fn refresh_prompt(&self) {
        self.units_on
            .store(self.session.fleet().powered_on(), Ordering::Relaxed);
    }
}
