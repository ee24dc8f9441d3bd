//! AI ツールの JSON スキーマ定義
//!
//! Function Calling で宣言する 5 つの関数。関数名と必須引数は `ActionKind` と共有する。

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde_json::{json, Map, Value};

use crate::command::{ActionKind, TARGET_ARG};

/// アクション種別に対応するツール定義
pub fn tool_for(kind: ActionKind) -> ChatCompletionTool {
    let mut properties = Map::new();
    properties.insert(
        TARGET_ARG.to_string(),
        json!({
            "type": "string",
            "description": "The name of the AC unit, exactly as listed in the current state, e.g. \"Living Room\"."
        }),
    );
    if let Some(arg) = kind.value_arg() {
        properties.insert(arg.to_string(), value_schema(kind));
    }

    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: kind.function_name().to_string(),
            description: Some(description(kind).to_string()),
            parameters: Some(json!({
                "type": "object",
                "properties": Value::Object(properties),
                "required": kind.required_args(),
            })),
            strict: None,
        },
    }
}

fn description(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::SetPower => "Turn an AC unit on or off.",
        ActionKind::SetTemperature => "Set the target temperature for an AC unit.",
        ActionKind::SetMode => "Set the operating mode for an AC unit.",
        ActionKind::SetFanSpeed => "Set the fan speed for an AC unit.",
        ActionKind::GetEnergyUsage => "Get the daily and monthly energy usage of an AC unit.",
    }
}

fn value_schema(kind: ActionKind) -> Value {
    match kind {
        ActionKind::SetPower => json!({
            "type": "boolean",
            "description": "Set to true to turn on, false to turn off."
        }),
        ActionKind::SetTemperature => json!({
            "type": "integer",
            "description": "The target temperature in Celsius (between 16 and 30)."
        }),
        ActionKind::SetMode => json!({
            "type": "string",
            "enum": ["cool", "heat", "fan", "auto"],
            "description": "The mode to set. Must be one of: \"cool\", \"heat\", \"fan\", \"auto\"."
        }),
        ActionKind::SetFanSpeed => json!({
            "type": "string",
            "enum": ["low", "medium", "high", "auto"],
            "description": "The fan speed to set. Must be one of: \"low\", \"medium\", \"high\", \"auto\"."
        }),
        ActionKind::GetEnergyUsage => Value::Null,
    }
}
