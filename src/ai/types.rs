//! AI モジュールの公開型定義

use async_openai::types::ChatCompletionTool;

use crate::command::ProposedCall;

/// 言語モデルへの 1 回分のリクエスト。過去の会話は含めない。
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// システム指示（フリートのスナップショットを埋め込み済み）
    pub system: String,
    /// ユーザーの発話
    pub user: String,
    /// 呼び出し可能な関数の宣言
    pub tools: Vec<ChatCompletionTool>,
}

/// 言語モデルが返した Tool Call（未検証）
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawToolCall {
    pub id: String,
    pub name: String,
    /// JSON 文字列のままの引数
    pub arguments: String,
}

/// 言語モデルの応答
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<RawToolCall>,
}

/// インタープリタの解釈結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interpretation {
    /// AI の自然文応答
    pub text: Option<String>,
    /// 形が整った提案呼び出し（受信順）
    pub calls: Vec<ProposedCall>,
    /// 対象ユニット名だけが欠けていたため破棄した呼び出しの数
    pub missing_target: usize,
    /// モデルとの往復に失敗し、定型のお詫び文を返した場合 true
    pub failed: bool,
}
