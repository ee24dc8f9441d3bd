use clap::Parser;

use super::{parse_args, BuiltinResult};
use crate::cli::color::{cyan, white};
use crate::session::{Sender, Turn};

/// history: アシスタントとの会話を表示する。
#[derive(Parser)]
#[command(name = "history", about = "Show the conversation with the assistant")]
struct HistoryArgs {
    /// 表示する件数 (デフォルト: 20)
    #[arg(short = 'n', long, default_value = "20")]
    count: usize,
}

/// 直近 N 件の発言を古い順に表示する。
pub(super) fn execute(conversation: &[Turn], args: &[&str]) -> Result<BuiltinResult, String> {
    let parsed = match parse_args::<HistoryArgs>("history", args)? {
        Ok(a) => a,
        Err(help) => return Ok(help),
    };

    if conversation.is_empty() {
        return Ok(BuiltinResult::success(
            "No conversation yet.".to_string(),
        ));
    }

    let skip = conversation.len().saturating_sub(parsed.count);
    let lines: Vec<String> = conversation[skip..].iter().map(format_turn).collect();
    Ok(BuiltinResult::success(lines.join("\n")))
}

fn format_turn(turn: &Turn) -> String {
    let who = match turn.sender {
        Sender::User => cyan("you    "),
        Sender::Assistant => white("coolish"),
    };
    format!("{:>5}  {who}  {}", turn.id, turn.text)
}
