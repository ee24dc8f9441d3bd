//! AI ツール関連モジュール
//!
//! エアコン操作用の関数宣言と、モデルが返した Tool Call の蓄積・検査を管理する。

pub mod call;
pub mod definitions;

use async_openai::types::ChatCompletionTool;

use crate::command::ActionKind;

/// すべてのツール定義を構築する
pub fn build_tools() -> Vec<ChatCompletionTool> {
    ActionKind::ALL
        .into_iter()
        .map(definitions::tool_for)
        .collect()
}
