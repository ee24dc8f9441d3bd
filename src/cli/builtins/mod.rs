//! ダッシュボードコマンド
//!
//! AI を介さずにフリートを直接操作・表示するコマンド群。
//! 引数は clap でパースする。パースできなかった入力は自然言語として
//! アシスタントに回せるよう、エラー文を呼び出し元に返す。

mod control;
mod help;
mod history;
mod status;

use crate::ai::LanguageModel;
use crate::session::Session;

/// 補完・ヘルプ用のコマンド名一覧（アルファベット順）
pub const BUILTIN_NAMES: [&str; 10] = [
    "energy", "exit", "fan", "help", "history", "mode", "power", "snapshot", "status", "temp",
];

/// REPL ループの制御アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// ループを続行する
    Continue,
    /// ループを終了する（exit コマンド）
    Exit,
}

/// ダッシュボードコマンドの実行結果
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinResult {
    /// 画面に表示する文字列
    pub output: String,
    /// 成功したか
    pub ok: bool,
    /// REPL ループの制御アクション
    pub action: LoopAction,
}

impl BuiltinResult {
    /// 成功結果（Continue）を返すヘルパー
    pub fn success(output: String) -> Self {
        Self {
            output,
            ok: true,
            action: LoopAction::Continue,
        }
    }

    /// エラー結果（Continue）を返すヘルパー
    pub fn error(output: String) -> Self {
        Self {
            output,
            ok: false,
            action: LoopAction::Continue,
        }
    }

    /// exit コマンド用のヘルパー
    pub fn exit() -> Self {
        Self {
            output: String::new(),
            ok: true,
            action: LoopAction::Exit,
        }
    }
}

/// clap の `try_parse_from` を使って引数をパースする共通ヘルパー。
///
/// - パース成功 → `Ok(Ok(T))`
/// - `--help` → `Ok(Err(BuiltinResult))`（ヘルプ文を出力として返す）
/// - 引数エラー → `Err(エラー文)`
fn parse_args<T: clap::Parser>(
    cmd: &str,
    args: &[&str],
) -> Result<Result<T, BuiltinResult>, String> {
    match T::try_parse_from(std::iter::once(cmd).chain(args.iter().copied())) {
        Ok(parsed) => Ok(Ok(parsed)),
        Err(e) if e.use_stderr() => Err(e.to_string()),
        Err(e) => Ok(Err(BuiltinResult::success(e.to_string()))),
    }
}

/// 指定されたコマンド名がダッシュボードコマンドかどうかを判定する（軽量チェック用）。
pub fn is_builtin(cmd: &str) -> bool {
    BUILTIN_NAMES.contains(&cmd)
}

/// ダッシュボードコマンドを振り分ける。
///
/// - `None` → ダッシュボードコマンドではない
/// - `Some(Err(msg))` → コマンド名は一致したが引数がパースできなかった
/// - `Some(Ok(result))` → 実行済み
pub fn dispatch_builtin<M: LanguageModel>(
    session: &mut Session<M>,
    cmd: &str,
    args: &[&str],
) -> Option<Result<BuiltinResult, String>> {
    let result = match cmd {
        "power" | "temp" | "mode" | "fan" | "energy" => control::execute(session, cmd, args),
        "status" => status::status(session.fleet(), args),
        "snapshot" => status::snapshot(session, args),
        "history" => history::execute(session.conversation(), args),
        "help" => help::execute(args),
        "exit" => exit(args),
        _ => return None,
    };
    Some(result)
}

/// exit: シェルを終了する。
fn exit(args: &[&str]) -> Result<BuiltinResult, String> {
    #[derive(clap::Parser)]
    #[command(name = "exit", about = "Leave the dashboard")]
    struct ExitArgs {}

    Ok(match parse_args::<ExitArgs>("exit", args)? {
        Ok(_) => BuiltinResult::exit(),
        Err(help) => help,
    })
}
