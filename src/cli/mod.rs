//! 端末 UI — REPL の表示部品とダッシュボードコマンド

pub mod assistant;
pub mod banner;
pub mod builtins;
pub mod color;
pub mod completer;
pub mod dashboard;
pub mod highlighter;
pub mod prompt;
