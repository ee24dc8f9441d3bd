//! Tool Call のストリーミング蓄積・検査ヘルパー
//!
//! ストリーミングで受信した Tool Call チャンクを蓄積し、
//! 形が崩れた呼び出し（名前なし、引数が JSON オブジェクトでない、必須引数の欠落）を取り除く。

use anyhow::{bail, Result};
use async_openai::types::ChatCompletionMessageToolCallChunk;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::types::RawToolCall;
use crate::command::{ActionKind, ProposedCall, TARGET_ARG};

/// 1 応答で受け付ける Tool Call の上限。index はモデルの出力なのでこれを超えたら応答ごと捨てる。
pub const MAX_TOOL_CALLS: usize = 32;

/// ストリーミングで受信した Tool Call チャンクを index ごとに蓄積する
pub fn accumulate_tool_call(
    accumulators: &mut Vec<RawToolCall>,
    chunk: &ChatCompletionMessageToolCallChunk,
) -> Result<()> {
    let idx = chunk.index as usize;
    if idx >= MAX_TOOL_CALLS {
        bail!("tool call index {idx} exceeds the limit of {MAX_TOOL_CALLS}");
    }

    // 必要に応じてアキュムレータを拡張
    if accumulators.len() <= idx {
        accumulators.resize_with(idx + 1, RawToolCall::default);
    }

    let Some(acc) = accumulators.get_mut(idx) else {
        return Ok(());
    };

    if let Some(ref id) = chunk.id {
        acc.id = id.clone();
    }
    if let Some(ref func) = chunk.function {
        if let Some(ref name) = func.name {
            acc.name = name.clone();
        }
        if let Some(ref args) = func.arguments {
            acc.arguments.push_str(args);
        }
    }
    Ok(())
}

/// 検査済みの呼び出し
#[derive(Debug, Default, PartialEq)]
pub struct SanitizedCalls {
    pub calls: Vec<ProposedCall>,
    /// 対象ユニット名だけが欠けていた呼び出しの数
    pub missing_target: usize,
}

/// 形が崩れた呼び出しを取り除き、残りを受信順に `ProposedCall` へ変換する。
///
/// 取り除かれた呼び出しは、モデルが何も言わなかったのと同じ扱いになる。
/// 未知の関数名はここでは落とさず、ディスパッチャでエラー文にする。
pub fn sanitize_calls(raw: &[RawToolCall]) -> SanitizedCalls {
    let mut result = SanitizedCalls::default();

    for tc in raw {
        debug!(
            function_name = %tc.name,
            arguments = %tc.arguments,
            id = %tc.id,
            "Processing tool call"
        );

        let name = tc.name.trim();
        if name.is_empty() {
            warn!(id = %tc.id, "Dropping tool call without a function name");
            continue;
        }

        let args = match serde_json::from_str::<Value>(&tc.arguments) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(function_name = %name, parsed = %other, "Dropping tool call: arguments are not an object");
                continue;
            }
            Err(e) => {
                warn!(
                    function_name = %name,
                    error = %e,
                    raw_arguments = %tc.arguments,
                    "Dropping tool call: failed to parse arguments as JSON"
                );
                continue;
            }
        };

        if let Some(kind) = ActionKind::from_function_name(name) {
            let missing: Vec<&str> = kind
                .required_args()
                .into_iter()
                .filter(|arg| !has_arg(&args, arg))
                .collect();

            if !missing.is_empty() {
                warn!(function_name = %name, missing = ?missing, "Dropping tool call with missing arguments");
                if missing == [TARGET_ARG] {
                    result.missing_target += 1;
                }
                continue;
            }
        }

        result.calls.push(ProposedCall {
            name: name.to_string(),
            args,
        });
    }

    result
}

/// 引数が存在し、null や空文字列でないこと
fn has_arg(args: &serde_json::Map<String, Value>, key: &str) -> bool {
    match args.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::FunctionCallStream;

    fn raw(name: &str, arguments: &str) -> RawToolCall {
        RawToolCall {
            id: format!("call_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    fn chunk(index: u32, id: Option<&str>, name: Option<&str>, args: &str) -> ChatCompletionMessageToolCallChunk {
        ChatCompletionMessageToolCallChunk {
            index,
            id: id.map(str::to_string),
            r#type: None,
            function: Some(FunctionCallStream {
                name: name.map(str::to_string),
                arguments: Some(args.to_string()),
            }),
        }
    }

    #[test]
    fn accumulates_chunks_by_index() {
        let mut acc = Vec::new();
        accumulate_tool_call(&mut acc, &chunk(0, Some("call_a"), Some("setAcPower"), "{\"acUnit")).unwrap();
        accumulate_tool_call(&mut acc, &chunk(1, Some("call_b"), Some("getEnergyUsage"), "{")).unwrap();
        accumulate_tool_call(&mut acc, &chunk(0, None, None, "Name\": \"Office\", \"power\": true}")).unwrap();
        accumulate_tool_call(&mut acc, &chunk(1, None, None, "\"acUnitName\": \"Bedroom\"}")).unwrap();

        assert_eq!(acc.len(), 2);
        assert_eq!(acc[0].id, "call_a");
        assert_eq!(acc[0].name, "setAcPower");
        assert_eq!(acc[0].arguments, r#"{"acUnitName": "Office", "power": true}"#);
        assert_eq!(acc[1].name, "getEnergyUsage");
        assert_eq!(acc[1].arguments, r#"{"acUnitName": "Bedroom"}"#);
    }

    #[test]
    fn rejects_out_of_range_index_without_growing() {
        let mut acc = Vec::new();
        accumulate_tool_call(&mut acc, &chunk(0, Some("call_a"), Some("setAcPower"), "{")).unwrap();

        for index in [MAX_TOOL_CALLS as u32, 20_000_000, u32::MAX] {
            let err = accumulate_tool_call(&mut acc, &chunk(index, None, Some("setAcPower"), "{"));
            assert!(err.is_err(), "index {index} should be rejected");
        }
        assert_eq!(acc.len(), 1);

        let last = MAX_TOOL_CALLS as u32 - 1;
        accumulate_tool_call(&mut acc, &chunk(last, None, Some("setAcMode"), "{")).unwrap();
        assert_eq!(acc.len(), MAX_TOOL_CALLS);
    }

    #[test]
    fn keeps_well_formed_calls_in_order() {
        let result = sanitize_calls(&[
            raw("setAcPower", r#"{"acUnitName": "Bedroom", "power": true}"#),
            raw("setAcTemperature", r#"{"acUnitName": "Bedroom", "temperature": 25}"#),
        ]);
        assert_eq!(result.calls.len(), 2);
        assert_eq!(result.calls[0].name, "setAcPower");
        assert_eq!(result.calls[1].args["temperature"], 25);
        assert_eq!(result.missing_target, 0);
    }

    #[test]
    fn drops_nameless_and_unparsable_calls() {
        let result = sanitize_calls(&[
            raw("", r#"{"acUnitName": "Bedroom", "power": true}"#),
            raw("setAcPower", "invalid json"),
            raw("setAcPower", "[1, 2]"),
            raw("setAcPower", ""),
        ]);
        assert!(result.calls.is_empty());
        assert_eq!(result.missing_target, 0);
    }

    #[test]
    fn drops_calls_missing_required_arguments() {
        let result = sanitize_calls(&[
            raw("setAcMode", r#"{"acUnitName": "Office"}"#),
            raw("setAcPower", r#"{"acUnitName": null, "power": true}"#),
        ]);
        assert!(result.calls.is_empty());
        // 対象名のみ欠けていたのは 2 件目だけ
        assert_eq!(result.missing_target, 1);
    }

    #[test]
    fn counts_calls_missing_only_the_target() {
        let result = sanitize_calls(&[
            raw("setAcPower", r#"{"power": true}"#),
            raw("getEnergyUsage", r#"{"acUnitName": " "}"#),
        ]);
        assert!(result.calls.is_empty());
        assert_eq!(result.missing_target, 2);
    }

    #[test]
    fn unknown_functions_pass_through_to_dispatch() {
        let result = sanitize_calls(&[raw("openWindow", r#"{"acUnitName": "Office"}"#)]);
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].name, "openWindow");
    }

    #[test]
    fn value_types_are_left_for_the_dispatcher() {
        // 型の検証はディスパッチャの責務。ここでは形だけを見る
        let result = sanitize_calls(&[raw(
            "setAcTemperature",
            r#"{"acUnitName": "Office", "temperature": "hot"}"#,
        )]);
        assert_eq!(result.calls.len(), 1);
    }
}
