//! 型付きコマンド
//!
//! AI が提案した関数呼び出し（名前 + 型なし引数）を、アクションごとの
//! 型付きバリアントに変換する。変換に失敗した呼び出しはディスパッチャに入らない。

pub mod dispatch;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::device::{temperature_in_range, DeviceUpdate, FanSpeed, Mode, TEMP_MAX, TEMP_MIN};

pub use dispatch::{CallOutcome, Dispatcher};

/// 対象ユニット名の引数名（全アクション共通）
pub const TARGET_ARG: &str = "acUnitName";

/// AI が提案した関数呼び出し。ディスパッチ前の一時的な値。
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedCall {
    pub name: String,
    pub args: Map<String, Value>,
}

impl ProposedCall {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        let Value::Object(args) = args else {
            panic!("test call arguments must be a JSON object, got {args}");
        };
        Self {
            name: name.into(),
            args,
        }
    }

    /// 対象ユニット名を取り出す。
    pub fn target(&self) -> Result<&str, CommandError> {
        match self.args.get(TARGET_ARG) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
            Some(Value::String(_)) | None => Err(CommandError::MissingArgument {
                function: self.name.clone(),
                argument: TARGET_ARG,
            }),
            Some(other) => Err(CommandError::InvalidArgument {
                argument: TARGET_ARG,
                expected: "a unit name",
                got: other.to_string(),
            }),
        }
    }
}

/// 認識する 5 種類の関数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    SetPower,
    SetTemperature,
    SetMode,
    SetFanSpeed,
    GetEnergyUsage,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::SetPower,
        ActionKind::SetTemperature,
        ActionKind::SetMode,
        ActionKind::SetFanSpeed,
        ActionKind::GetEnergyUsage,
    ];

    /// AI に宣言する関数名
    pub fn function_name(&self) -> &'static str {
        match self {
            ActionKind::SetPower => "setAcPower",
            ActionKind::SetTemperature => "setAcTemperature",
            ActionKind::SetMode => "setAcMode",
            ActionKind::SetFanSpeed => "setAcFanSpeed",
            ActionKind::GetEnergyUsage => "getEnergyUsage",
        }
    }

    /// 値の引数名（GetEnergyUsage は対象名のみ）
    pub fn value_arg(&self) -> Option<&'static str> {
        match self {
            ActionKind::SetPower => Some("power"),
            ActionKind::SetTemperature => Some("temperature"),
            ActionKind::SetMode => Some("mode"),
            ActionKind::SetFanSpeed => Some("fanSpeed"),
            ActionKind::GetEnergyUsage => None,
        }
    }

    /// 必須引数の一覧
    pub fn required_args(&self) -> Vec<&'static str> {
        std::iter::once(TARGET_ARG).chain(self.value_arg()).collect()
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.function_name() == name)
    }
}

/// 検証済みのアクション
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SetPower { power: bool },
    SetTemperature { temperature: i64 },
    SetMode { mode: Mode },
    SetFanSpeed { fan_speed: FanSpeed },
    GetEnergyUsage,
}

impl Action {
    /// 範囲検証付きの温度設定アクション。範囲外はクランプせずに拒否する。
    pub fn set_temperature(temperature: i64) -> Result<Self, CommandError> {
        if !temperature_in_range(temperature) {
            return Err(CommandError::TemperatureOutOfRange(temperature));
        }
        Ok(Action::SetTemperature { temperature })
    }

    /// 型なし引数から値部分を検証して組み立てる。対象名は見ない。
    pub fn from_args(kind: ActionKind, args: &Map<String, Value>) -> Result<Self, CommandError> {
        let value = match kind.value_arg() {
            Some(arg) => match args.get(arg) {
                Some(v) => v,
                None => {
                    return Err(CommandError::MissingArgument {
                        function: kind.function_name().to_string(),
                        argument: arg,
                    })
                }
            },
            None => return Ok(Action::GetEnergyUsage),
        };

        match kind {
            ActionKind::SetPower => match value {
                Value::Bool(power) => Ok(Action::SetPower { power: *power }),
                other => Err(CommandError::InvalidArgument {
                    argument: "power",
                    expected: "true or false",
                    got: other.to_string(),
                }),
            },
            ActionKind::SetTemperature => Self::set_temperature(parse_whole_degrees(value)?),
            ActionKind::SetMode => {
                let token = expect_str("mode", value)?;
                token
                    .parse::<Mode>()
                    .map(|mode| Action::SetMode { mode })
                    .map_err(|e| CommandError::UnknownMode(e.0))
            }
            ActionKind::SetFanSpeed => {
                let token = expect_str("fanSpeed", value)?;
                token
                    .parse::<FanSpeed>()
                    .map(|fan_speed| Action::SetFanSpeed { fan_speed })
                    .map_err(|e| CommandError::UnknownFanSpeed(e.0))
            }
            ActionKind::GetEnergyUsage => Ok(Action::GetEnergyUsage),
        }
    }

    /// デバイスへの更新内容。読み取り専用アクションは `None`。
    pub fn to_update(&self) -> Option<DeviceUpdate> {
        let mut update = DeviceUpdate::default();
        match *self {
            Action::SetPower { power } => update.power = Some(power),
            Action::SetTemperature { temperature } => update.temperature = Some(temperature),
            Action::SetMode { mode } => update.mode = Some(mode),
            Action::SetFanSpeed { fan_speed } => update.fan_speed = Some(fan_speed),
            Action::GetEnergyUsage => return None,
        }
        Some(update)
    }
}

/// 対象ユニット名 + アクション
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub target: String,
    pub action: Action,
}

impl Command {
    pub fn new(target: impl Into<String>, action: Action) -> Self {
        Self {
            target: target.into(),
            action,
        }
    }

    /// 提案された呼び出しを丸ごと検証する（対象の存在確認は行わない）。
    pub fn parse(call: &ProposedCall) -> Result<Self, CommandError> {
        let kind = ActionKind::from_function_name(&call.name)
            .ok_or_else(|| CommandError::UnknownFunction(call.name.clone()))?;
        let target = call.target()?;
        let action = Action::from_args(kind, &call.args)?;
        Ok(Self::new(target, action))
    }
}

/// 呼び出し単位のエラー。Display はそのままユーザーに表示する文になっている。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("I don't know how to do \"{0}\".")]
    UnknownFunction(String),
    #[error("The {function} request is missing '{argument}'.")]
    MissingArgument {
        function: String,
        argument: &'static str,
    },
    #[error("Expected {argument} to be {expected}, but got {got}.")]
    InvalidArgument {
        argument: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("Temperature must be a whole number of degrees, not {0}.")]
    NonIntegerTemperature(String),
    #[error("{0}°C is out of range. Please choose a temperature between {min} and {max}°C.", min = TEMP_MIN, max = TEMP_MAX)]
    TemperatureOutOfRange(i64),
    #[error("\"{0}\" is not a valid mode. Choose one of: cool, heat, fan, auto.")]
    UnknownMode(String),
    #[error("\"{0}\" is not a valid fan speed. Choose one of: low, medium, high, auto.")]
    UnknownFanSpeed(String),
    #[error("I couldn't find an AC unit named \"{0}\".")]
    DeviceNotFound(String),
}

fn expect_str<'a>(argument: &'static str, value: &'a Value) -> Result<&'a str, CommandError> {
    value.as_str().ok_or_else(|| CommandError::InvalidArgument {
        argument,
        expected: "a string",
        got: value.to_string(),
    })
}

/// 整数値の数値だけを受け付ける。`25` と `25.0` は可、`25.5` や `"25"` は不可。
fn parse_whole_degrees(value: &Value) -> Result<i64, CommandError> {
    let number = match value {
        Value::Number(n) => n,
        other => {
            return Err(CommandError::InvalidArgument {
                argument: "temperature",
                expected: "a number",
                got: other.to_string(),
            })
        }
    };

    if let Some(i) = number.as_i64() {
        return Ok(i);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            // i64 に収まらない値は飽和させ、その後の範囲検証で拒否させる
            Ok(f as i64)
        }
        _ => Err(CommandError::NonIntegerTemperature(number.to_string())),
    }
}
