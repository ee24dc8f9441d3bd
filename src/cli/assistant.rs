use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::color::{dim, green, red, white};
use crate::command::CallOutcome;

/// アシスタントが発話するときに使う共通関数。
/// 先頭に ❄️ を付与し、白色テキストで表示する。
pub fn assistant_say(message: &str) {
    println!("❄️  {}", white(message));
}

/// 呼び出し 1 件の結果を表示する。失敗は赤で示す。
pub fn assistant_result(outcome: &CallOutcome) {
    println!("{}", format_result(outcome));
}

fn format_result(outcome: &CallOutcome) -> String {
    if outcome.ok {
        format!("{} {}", green("\u{2714}\u{fe0e}"), white(&outcome.text))
    } else {
        format!("{} {}", red("\u{2717}"), red(&outcome.text))
    }
}

/// 入力エラーなど、会話に残さない注意書き
pub fn assistant_notice(message: &str) {
    println!("{}", dim(message));
}

/// AI 処理中に表示するスピナーを生成・開始する。
/// 呼び出し元で `finish_and_clear()` を呼んでスピナーを停止すること。
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("❄️  {spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
