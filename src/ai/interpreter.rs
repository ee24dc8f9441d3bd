//! コマンドインタープリタ
//!
//! ユーザーの発話とフリートのスナップショットを言語モデルに送り、
//! 応答を自然文と提案呼び出しのリストに整形する。
//! モデルとの往復で起きた失敗は呼び出し元に伝えず、定型のお詫び文に置き換える。

use std::time::Duration;

use tracing::{debug, info, warn};

use super::client::LanguageModel;
use super::prompts::{build_system_prompt, FALLBACK_REPLY};
use super::tools::{build_tools, call::sanitize_calls};
use super::types::{Interpretation, ModelRequest};
use crate::device::Fleet;

pub struct Interpreter<M> {
    model: M,
    timeout: Duration,
}

impl<M: LanguageModel> Interpreter<M> {
    pub fn new(model: M, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// 発話を解釈する。モデルには過去の会話を渡さず、現在のスナップショットと発話だけを送る。
    pub async fn interpret(&self, utterance: &str, fleet: &Fleet) -> Interpretation {
        let snapshot = match fleet.snapshot_json() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize fleet snapshot");
                return Interpretation::fallback();
            }
        };

        let request = ModelRequest {
            system: build_system_prompt(&snapshot),
            user: utterance.to_string(),
            tools: build_tools(),
        };

        debug!(
            user_input = %utterance,
            system_prompt_length = request.system.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Interpreting utterance"
        );

        let reply = match tokio::time::timeout(self.timeout, self.model.complete(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, user_input = %utterance, "Language model call failed");
                return Interpretation::fallback();
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    user_input = %utterance,
                    "Language model call timed out"
                );
                return Interpretation::fallback();
            }
        };

        let sanitized = sanitize_calls(&reply.tool_calls);
        let text = reply
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        info!(
            has_text = text.is_some(),
            raw_calls = reply.tool_calls.len(),
            accepted_calls = sanitized.calls.len(),
            missing_target = sanitized.missing_target,
            "Model reply interpreted"
        );

        Interpretation {
            text,
            calls: sanitized.calls,
            missing_target: sanitized.missing_target,
            failed: false,
        }
    }
}

impl Interpretation {
    /// 往復に失敗したときの応答。呼び出しは空。
    pub fn fallback() -> Self {
        Self {
            text: Some(FALLBACK_REPLY.to_string()),
            calls: Vec::new(),
            missing_target: 0,
            failed: true,
        }
    }
}
