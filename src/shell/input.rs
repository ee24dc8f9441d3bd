//! 入力ハンドリング
//!
//! 先頭単語がダッシュボードコマンドで引数もパースできればその場で実行し、
//! それ以外はアシスタントに送る。

use tracing::{debug, info};

use crate::cli::assistant::{assistant_notice, assistant_result, assistant_say, thinking_spinner};
use crate::cli::builtins::{dispatch_builtin, BuiltinResult, LoopAction};
use crate::cli::color::red;
use crate::cli::dashboard::render_card;
use crate::session::TurnOutcome;

use super::Shell;

impl Shell {
    /// ユーザー入力を処理する。
    ///
    /// 戻り値: `true` = REPL ループ続行、`false` = シェル終了
    pub(super) async fn handle_input(&mut self, line: &str) -> bool {
        let line = line.trim();
        debug!(input = %line, "User input received");

        // 引用符が閉じていない等で分割できない入力は自然言語として扱う
        if let Ok(words) = shell_words::split(line) {
            if let Some((cmd, rest)) = words.split_first() {
                let args: Vec<&str> = rest.iter().map(String::as_str).collect();
                match dispatch_builtin(&mut self.session, cmd, &args) {
                    Some(Ok(result)) => return self.handle_builtin(cmd, result),
                    Some(Err(usage)) if !self.session.assistant_enabled() => {
                        eprintln!("{}", red(usage.trim_end()));
                        println!();
                        return true;
                    }
                    Some(Err(usage)) => {
                        debug!(command = %cmd, usage = %usage, "Builtin arguments rejected, asking the assistant");
                    }
                    None => {}
                }
            }
        }

        self.ask_assistant(line).await;
        true
    }

    /// ダッシュボードコマンドの結果を表示する。
    fn handle_builtin(&mut self, cmd: &str, result: BuiltinResult) -> bool {
        debug!(command = %cmd, ok = result.ok, action = ?result.action, "Builtin command executed");

        if result.action == LoopAction::Exit {
            info!("Exit command received");
            return false;
        }

        if result.ok {
            println!("{}", result.output.trim_end());
        } else {
            eprintln!("{}", red(result.output.trim_end()));
        }
        println!();

        self.refresh_prompt();
        true
    }

    /// 発話をアシスタントに送り、応答と結果を表示する。
    ///
    /// 応答待ちの間に Ctrl-C が押された場合は、応答を待たずに次の入力に戻る。
    /// 呼び出しの適用は応答を受け取った後にしか行われないため、中断してもフリートは変化しない。
    async fn ask_assistant(&mut self, line: &str) {
        let spinner =
            (!line.is_empty() && self.session.assistant_enabled()).then(thinking_spinner);

        let outcome = tokio::select! {
            result = self.session.submit(line) => Some(result),
            Ok(()) = tokio::signal::ctrl_c() => None,
        };

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match outcome {
            None => {
                info!(input = %line, "Request cancelled by user");
                assistant_notice("Cancelled.");
            }
            Some(Err(e)) => assistant_notice(&e.to_string()),
            Some(Ok(turn)) => {
                if let Some(ref message) = turn.message {
                    assistant_say(message);
                }
                for result in &turn.results {
                    assistant_result(result);
                }
                let cards = affected_cards(&turn);
                if !cards.is_empty() {
                    println!("{cards}");
                }
            }
        }
        println!();

        self.refresh_prompt();
    }
}

/// 呼び出しが成功したユニットのカードを、最初に触れた順に 1 枚ずつ描画する。
fn affected_cards(turn: &TurnOutcome) -> String {
    let mut seen = Vec::new();
    for id in turn
        .results
        .iter()
        .filter(|r| r.ok)
        .filter_map(|r| r.device_id)
    {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }

    seen.iter()
        .filter_map(|id| turn.devices.iter().find(|d| d.id == *id))
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}
