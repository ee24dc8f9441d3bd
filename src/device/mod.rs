//! エアコンユニットのデータモデル
//!
//! スナップショット（AI に渡す JSON）と同じ形でシリアライズされる。
//! フィールド名は camelCase（`fanSpeed`, `energyUsage`）。

mod fleet;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fleet::{Fleet, FleetError};

/// 設定温度の下限（℃）
pub const TEMP_MIN: i64 = 16;
/// 設定温度の上限（℃）
pub const TEMP_MAX: i64 = 30;

/// 運転モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cool,
    Heat,
    Fan,
    Auto,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Cool, Mode::Heat, Mode::Fan, Mode::Auto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Cool => "cool",
            Mode::Heat => "heat",
            Mode::Fan => "fan",
            Mode::Auto => "auto",
        }
    }
}

/// 風量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    Low,
    Medium,
    High,
    Auto,
}

impl FanSpeed {
    pub const ALL: [FanSpeed; 4] = [
        FanSpeed::Low,
        FanSpeed::Medium,
        FanSpeed::High,
        FanSpeed::Auto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Low => "low",
            FanSpeed::Medium => "medium",
            FanSpeed::High => "high",
            FanSpeed::Auto => "auto",
        }
    }
}

/// 列挙トークンのパース失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token '{0}'")]
pub struct UnknownToken(pub String);

/// 前後の空白を除去し、大文字小文字を区別せずに照合する。
fn match_token<T: Copy>(
    s: &str,
    candidates: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Result<T, UnknownToken> {
    let token = s.trim();
    candidates
        .iter()
        .find(|c| name(*c).eq_ignore_ascii_case(token))
        .copied()
        .ok_or_else(|| UnknownToken(token.to_string()))
}

impl FromStr for Mode {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match_token(s, &Mode::ALL, Mode::as_str)
    }
}

impl FromStr for FanSpeed {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match_token(s, &FanSpeed::ALL, FanSpeed::as_str)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 電力使用量（表示専用。コマンドで変更されることはない）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyUsage {
    pub daily_kwh: f64,
    pub monthly_kwh: f64,
}

/// シミュレートされたエアコン 1 台
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: u32,
    pub name: String,
    pub power: bool,
    pub temperature: i64,
    pub mode: Mode,
    pub fan_speed: FanSpeed,
    pub energy_usage: EnergyUsage,
}

/// 設定温度が許容範囲内かどうか
pub fn temperature_in_range(t: i64) -> bool {
    (TEMP_MIN..=TEMP_MAX).contains(&t)
}

/// 1 台のデバイスに対する部分更新。
/// `Fleet::update` で全フィールドを検証してから一括で書き込む。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceUpdate {
    pub power: Option<bool>,
    pub temperature: Option<i64>,
    pub mode: Option<Mode>,
    pub fan_speed: Option<FanSpeed>,
}
