//! セッション — 1 人のユーザーとの対話状態
//!
//! インタープリタ、ディスパッチャ（フリートの唯一の書き込み手）、会話履歴をまとめる。
//! `submit` は `&mut self` を取るため、1 つのセッションで解釈の往復が同時に
//! 2 つ走ることはない。

use thiserror::Error;
use tracing::{debug, info};

use crate::ai::{Interpreter, LanguageModel};
use crate::command::{CallOutcome, Command, Dispatcher};
use crate::device::{Device, Fleet, FleetError};

/// AI が何も言わず、呼び出しも無かった場合の応答
pub const NOT_UNDERSTOOD_REPLY: &str = "Sorry, I didn't understand that. Could you rephrase?";

/// AI が無効なときの応答
pub const ASSISTANT_OFFLINE_REPLY: &str =
    "The assistant is offline. You can still use the dashboard commands (type `help`).";

/// 発言者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// 会話の 1 発言。追記のみで、書き換えはしない。
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
}

/// 送信の拒否理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a command.")]
    EmptyInput,
}

/// 1 回の送信の結果
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// 呼び出しごとの結果（処理順）
    pub results: Vec<CallOutcome>,
    /// 呼び出し結果以外のアシスタント発言（AI の自然文、確認の質問、お詫び文）
    pub message: Option<String>,
    /// 処理後のフリート
    pub devices: Vec<Device>,
}

pub struct Session<M> {
    interpreter: Option<Interpreter<M>>,
    dispatcher: Dispatcher,
    conversation: Vec<Turn>,
    next_turn_id: u64,
}

impl<M: LanguageModel> Session<M> {
    /// `interpreter` が `None` の場合、自然言語の送信にはオフライン応答を返す。
    pub fn new(fleet: Fleet, interpreter: Option<Interpreter<M>>) -> Self {
        Self {
            interpreter,
            dispatcher: Dispatcher::new(fleet),
            conversation: Vec::new(),
            next_turn_id: 1,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        self.dispatcher.fleet()
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    pub fn assistant_enabled(&self) -> bool {
        self.interpreter.is_some()
    }

    /// ユーザーの発話を解釈・実行する。
    ///
    /// 空入力はモデルに送らずに拒否する。それ以外の失敗はすべて
    /// アシスタントの発言として会話に追記され、`Err` にはならない。
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Rejected empty submission");
            return Err(SubmitError::EmptyInput);
        }

        self.push_turn(Sender::User, text.to_string());

        let Some(interpreter) = self.interpreter.as_ref() else {
            self.push_turn(Sender::Assistant, ASSISTANT_OFFLINE_REPLY.to_string());
            return Ok(self.outcome(Vec::new(), Some(ASSISTANT_OFFLINE_REPLY.to_string())));
        };

        let interpretation = interpreter.interpret(text, self.dispatcher.fleet()).await;

        let message = if interpretation.text.is_some() {
            interpretation.text.clone()
        } else if !interpretation.calls.is_empty() {
            None
        } else if interpretation.missing_target > 0 {
            Some(self.clarification())
        } else {
            Some(NOT_UNDERSTOOD_REPLY.to_string())
        };

        if let Some(ref m) = message {
            self.push_turn(Sender::Assistant, m.clone());
        }

        let results = self.dispatcher.dispatch(&interpretation.calls);
        for r in &results {
            self.push_turn(Sender::Assistant, r.text.clone());
        }

        info!(
            calls = results.len(),
            succeeded = results.iter().filter(|r| r.ok).count(),
            failed_round_trip = interpretation.failed,
            "Turn completed"
        );

        Ok(self.outcome(results, message))
    }

    /// ダッシュボードからの手動操作。会話には記録しない。
    pub fn apply_manual(&mut self, command: &Command) -> CallOutcome {
        debug!(unit = %command.target, action = ?command.action, "Manual command");
        self.dispatcher.apply(command)
    }

    /// 保存したスナップショットからフリートの状態を戻す。会話には記録しない。
    pub fn restore_fleet(&mut self, fleet: Fleet) -> Result<(), FleetError> {
        self.dispatcher.restore(fleet)
    }

    /// 対象ユニットが指定されなかったときの確認の質問
    fn clarification(&self) -> String {
        let names: Vec<&str> = self
            .fleet()
            .devices()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        format!(
            "Which AC unit would you like me to control? Available units: {}.",
            names.join(", ")
        )
    }

    fn push_turn(&mut self, sender: Sender, text: String) {
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        self.conversation.push(Turn { id, text, sender });
    }

    fn outcome(&self, results: Vec<CallOutcome>, message: Option<String>) -> TurnOutcome {
        TurnOutcome {
            results,
            message,
            devices: self.fleet().devices().to_vec(),
        }
    }
}
