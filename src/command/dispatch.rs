//! コマンドディスパッチャ
//!
//! 提案された呼び出しを順番に検証・適用し、呼び出しごとに 1 つの結果文を返す。
//! 無効な呼び出しはエラー文になるだけで、残りの呼び出しの処理は止めない。

use tracing::{debug, info, warn};

use crate::device::{Device, Fleet, FleetError};

use super::{Action, Command, CommandError, ProposedCall};

/// 呼び出し 1 件の処理結果
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// 対象を解決できた場合のデバイス ID
    pub device_id: Option<u32>,
    /// ユーザーに表示する文
    pub text: String,
    /// 適用（または照会）に成功したか
    pub ok: bool,
}

impl CallOutcome {
    fn success(device_id: u32, text: String) -> Self {
        Self {
            device_id: Some(device_id),
            text,
            ok: true,
        }
    }

    fn failure(device_id: Option<u32>, error: &CommandError) -> Self {
        Self {
            device_id,
            text: error.to_string(),
            ok: false,
        }
    }
}

/// フリートの唯一の書き込み手。
pub struct Dispatcher {
    fleet: Fleet,
}

impl Dispatcher {
    pub fn new(fleet: Fleet) -> Self {
        Self { fleet }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// 保存済みの状態でフリートを置き換える。ユニット構成が異なる場合は拒否する。
    pub fn restore(&mut self, fleet: Fleet) -> Result<(), FleetError> {
        if !self.fleet.same_layout(&fleet) {
            warn!("Rejected snapshot with a different unit layout");
            return Err(FleetError::LayoutMismatch);
        }
        info!(device_count = fleet.len(), "Fleet restored from snapshot");
        self.fleet = fleet;
        Ok(())
    }

    /// 提案された呼び出しを受け取った順に処理する。
    ///
    /// 後続の呼び出しは先行する呼び出しの結果を観測できる（並べ替えやまとめ処理はしない）。
    pub fn dispatch(&mut self, calls: &[ProposedCall]) -> Vec<CallOutcome> {
        debug!(call_count = calls.len(), "Dispatching proposed calls");
        calls.iter().map(|call| self.dispatch_one(call)).collect()
    }

    fn dispatch_one(&mut self, call: &ProposedCall) -> CallOutcome {
        debug!(function = %call.name, args = ?call.args, "Dispatching call");

        // 1. 対象ユニットを名前で解決
        let target = match call.target() {
            Ok(t) => t,
            Err(e) => {
                warn!(function = %call.name, error = %e, "Call rejected");
                return CallOutcome::failure(None, &e);
            }
        };
        let device_id = match self.fleet.find_by_name(target) {
            Some(d) => d.id,
            None => {
                warn!(unit = %target, "Device not found");
                return CallOutcome::failure(
                    None,
                    &CommandError::DeviceNotFound(target.trim().to_string()),
                );
            }
        };

        // 2. 関数名とアクション固有の引数を検証
        let command = match Command::parse(call) {
            Ok(c) => c,
            Err(e) => {
                warn!(device_id, function = %call.name, error = %e, "Call rejected");
                return CallOutcome::failure(Some(device_id), &e);
            }
        };

        // 3. 対象デバイスだけに適用
        self.apply_to(device_id, command.action)
    }

    /// 検証済みコマンドを適用する。ダッシュボードからの手動操作もここを通る。
    pub fn apply(&mut self, command: &Command) -> CallOutcome {
        match self.fleet.find_by_name(&command.target) {
            Some(d) => {
                let id = d.id;
                self.apply_to(id, command.action)
            }
            None => {
                warn!(unit = %command.target, "Device not found");
                CallOutcome::failure(
                    None,
                    &CommandError::DeviceNotFound(command.target.trim().to_string()),
                )
            }
        }
    }

    fn apply_to(&mut self, device_id: u32, action: Action) -> CallOutcome {
        let Some(update) = action.to_update() else {
            return match self.fleet.get(device_id) {
                Some(device) => CallOutcome::success(device_id, energy_summary(device)),
                None => CallOutcome::failure(
                    None,
                    &CommandError::DeviceNotFound(device_id.to_string()),
                ),
            };
        };

        match self.fleet.update(device_id, &update) {
            Ok(device) => {
                info!(
                    device_id,
                    device = %device.name,
                    action = ?action,
                    "Command applied"
                );
                CallOutcome::success(device_id, confirmation(device, &action))
            }
            Err(e) => {
                // Action 構築時に検証済みのため通常は到達しない
                warn!(device_id, error = %e, "Fleet rejected update");
                let error = match action {
                    Action::SetTemperature { temperature } => {
                        CommandError::TemperatureOutOfRange(temperature)
                    }
                    _ => CommandError::DeviceNotFound(device_id.to_string()),
                };
                CallOutcome::failure(Some(device_id), &error)
            }
        }
    }
}

/// 適用後の状態を自然文で表す。
fn confirmation(device: &Device, action: &Action) -> String {
    let name = &device.name;
    match action {
        Action::SetPower { power } => {
            format!("{name} is now {}.", if *power { "on" } else { "off" })
        }
        Action::SetTemperature { temperature } => {
            format!("{name} temperature set to {temperature}°C.")
        }
        Action::SetMode { mode } => format!("{name} mode set to {mode}."),
        Action::SetFanSpeed { fan_speed } => format!("{name} fan speed set to {fan_speed}."),
        Action::GetEnergyUsage => energy_summary(device),
    }
}

fn energy_summary(device: &Device) -> String {
    format!(
        "{} has used {} kWh today and {} kWh this month.",
        device.name, device.energy_usage.daily_kwh, device.energy_usage.monthly_kwh
    )
}
