//! エアコン群（フリート）の所有と更新
//!
//! セッション中はここが唯一の書き込み先。デバイスの追加・削除は行わず、
//! 起動時に与えられた一覧をフィールド単位で更新するだけ。

use thiserror::Error;
use tracing::debug;

use super::{temperature_in_range, Device, DeviceUpdate, EnergyUsage, FanSpeed, Mode};

/// フリート構築・更新時のエラー
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("duplicate device id {0}")]
    DuplicateId(u32),
    #[error("duplicate device name '{0}'")]
    DuplicateName(String),
    #[error("device {0} has an empty name")]
    EmptyName(u32),
    #[error("{name}: temperature {temperature} is outside 16-30")]
    TemperatureOutOfRange { name: String, temperature: i64 },
    #[error("{0}: energy figures must be finite and non-negative")]
    InvalidEnergy(String),
    #[error("no device with id {0}")]
    UnknownId(u32),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("snapshot describes different units than the current fleet")]
    LayoutMismatch,
}

/// 順序付きのデバイス一覧
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    devices: Vec<Device>,
}

impl Fleet {
    /// デバイス一覧を検証してフリートを作る。
    ///
    /// ID と名前（大文字小文字を無視）はフリート内で一意でなければならない。
    /// AI は名前でユニットを指定するため、名前の重複は許可しない。
    pub fn new(devices: Vec<Device>) -> Result<Self, FleetError> {
        for (i, device) in devices.iter().enumerate() {
            if device.name.trim().is_empty() {
                return Err(FleetError::EmptyName(device.id));
            }
            if !temperature_in_range(device.temperature) {
                return Err(FleetError::TemperatureOutOfRange {
                    name: device.name.clone(),
                    temperature: device.temperature,
                });
            }
            let usage = &device.energy_usage;
            // 非有限値は JSON で null になり、スナップショットを読み戻せなくなる
            let valid = |kwh: f64| kwh.is_finite() && kwh >= 0.0;
            if !(valid(usage.daily_kwh) && valid(usage.monthly_kwh)) {
                return Err(FleetError::InvalidEnergy(device.name.clone()));
            }
            for other in &devices[..i] {
                if other.id == device.id {
                    return Err(FleetError::DuplicateId(device.id));
                }
                if names_match(&other.name, &device.name) {
                    return Err(FleetError::DuplicateName(device.name.clone()));
                }
            }
        }
        Ok(Self { devices })
    }

    /// 既定の 3 台構成
    pub fn seeded() -> Self {
        Self {
            devices: vec![
                Device {
                    id: 1,
                    name: "Living Room".to_string(),
                    power: false,
                    temperature: 22,
                    mode: Mode::Cool,
                    fan_speed: FanSpeed::Auto,
                    energy_usage: EnergyUsage {
                        daily_kwh: 3.1,
                        monthly_kwh: 72.5,
                    },
                },
                Device {
                    id: 2,
                    name: "Bedroom".to_string(),
                    power: true,
                    temperature: 20,
                    mode: Mode::Cool,
                    fan_speed: FanSpeed::Low,
                    energy_usage: EnergyUsage {
                        daily_kwh: 1.8,
                        monthly_kwh: 45.2,
                    },
                },
                Device {
                    id: 3,
                    name: "Office".to_string(),
                    power: false,
                    temperature: 24,
                    mode: Mode::Fan,
                    fan_speed: FanSpeed::Medium,
                    energy_usage: EnergyUsage {
                        daily_kwh: 0.5,
                        monthly_kwh: 15.8,
                    },
                },
            ],
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// 名前でデバイスを探す。前後の空白を除去し、ASCII の大文字小文字を区別しない完全一致。
    pub fn find_by_name(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| names_match(&d.name, name))
    }

    /// 電源が入っている台数
    pub fn powered_on(&self) -> usize {
        self.devices.iter().filter(|d| d.power).count()
    }

    /// 部分更新を適用する。
    ///
    /// すべてのフィールドを検証してから書き込むため、エラー時はデバイスに一切変更がない。
    pub fn update(&mut self, id: u32, update: &DeviceUpdate) -> Result<&Device, FleetError> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(FleetError::UnknownId(id))?;

        if let Some(t) = update.temperature {
            if !temperature_in_range(t) {
                return Err(FleetError::TemperatureOutOfRange {
                    name: device.name.clone(),
                    temperature: t,
                });
            }
        }

        if let Some(power) = update.power {
            device.power = power;
        }
        if let Some(t) = update.temperature {
            device.temperature = t;
        }
        if let Some(mode) = update.mode {
            device.mode = mode;
        }
        if let Some(speed) = update.fan_speed {
            device.fan_speed = speed;
        }

        debug!(device_id = id, update = ?update, "Device updated");
        Ok(device)
    }

    /// スナップショット形式（整形済み JSON）にシリアライズする。
    pub fn snapshot_json(&self) -> Result<String, FleetError> {
        Ok(serde_json::to_string_pretty(&self.devices)?)
    }

    /// スナップショット形式の JSON からフリートを復元する。`new` と同じ検証を通す。
    pub fn from_snapshot_json(json: &str) -> Result<Self, FleetError> {
        let devices: Vec<Device> = serde_json::from_str(json)?;
        Self::new(devices)
    }

    /// 同じユニット（ID と名前、並び順）で構成されているか。名前は `find_by_name` と同じ規則で比べる。
    pub fn same_layout(&self, other: &Fleet) -> bool {
        self.devices.len() == other.devices.len()
            && self
                .devices
                .iter()
                .zip(&other.devices)
                .all(|(a, b)| a.id == b.id && names_match(&a.name, &b.name))
    }
}

fn names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_fleet_has_three_named_units() {
        let fleet = Fleet::seeded();
        let names: Vec<&str> = fleet.devices().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Living Room", "Bedroom", "Office"]);
        assert_eq!(fleet.powered_on(), 1);
        // seeded() も new() の検証を通ること
        assert!(Fleet::new(fleet.devices().to_vec()).is_ok());
    }

    #[test]
    fn find_by_name_ignores_case_and_whitespace() {
        let fleet = Fleet::seeded();
        assert_eq!(fleet.find_by_name("living room").unwrap().id, 1);
        assert_eq!(fleet.find_by_name("  BEDROOM ").unwrap().id, 2);
        assert!(fleet.find_by_name("Basement").is_none());
        assert!(fleet.find_by_name("Living").is_none());
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let mut devices = Fleet::seeded().devices().to_vec();
        devices[2].name = "bedroom".to_string();
        assert!(matches!(
            Fleet::new(devices),
            Err(FleetError::DuplicateName(_))
        ));
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let mut devices = Fleet::seeded().devices().to_vec();
        devices[1].id = 1;
        assert!(matches!(Fleet::new(devices), Err(FleetError::DuplicateId(1))));
    }

    #[test]
    fn new_rejects_out_of_range_temperature() {
        let mut devices = Fleet::seeded().devices().to_vec();
        devices[0].temperature = 40;
        assert!(matches!(
            Fleet::new(devices),
            Err(FleetError::TemperatureOutOfRange { temperature: 40, .. })
        ));
    }

    #[test]
    fn new_rejects_negative_energy() {
        let mut devices = Fleet::seeded().devices().to_vec();
        devices[0].energy_usage.daily_kwh = -1.0;
        assert!(matches!(
            Fleet::new(devices),
            Err(FleetError::InvalidEnergy(_))
        ));
    }

    #[test]
    fn new_rejects_non_finite_energy() {
        for bad in [f64::INFINITY, f64::NAN] {
            let mut devices = Fleet::seeded().devices().to_vec();
            devices[1].energy_usage.monthly_kwh = bad;
            assert!(matches!(
                Fleet::new(devices),
                Err(FleetError::InvalidEnergy(_))
            ));
        }
    }

    #[test]
    fn update_touches_only_the_target() {
        let mut fleet = Fleet::seeded();
        let before = fleet.clone();

        let update = DeviceUpdate {
            power: Some(true),
            temperature: Some(25),
            ..Default::default()
        };
        let device = fleet.update(3, &update).unwrap();
        assert!(device.power);
        assert_eq!(device.temperature, 25);

        assert_eq!(fleet.get(1), before.get(1));
        assert_eq!(fleet.get(2), before.get(2));
        assert_eq!(fleet.get(3).unwrap().mode, Mode::Fan);
    }

    #[test]
    fn update_is_atomic_on_invalid_temperature() {
        let mut fleet = Fleet::seeded();
        let before = fleet.clone();

        let update = DeviceUpdate {
            power: Some(true),
            temperature: Some(12),
            ..Default::default()
        };
        assert!(fleet.update(1, &update).is_err());
        // power も書き込まれていないこと
        assert_eq!(fleet, before);
    }

    #[test]
    fn update_unknown_id_fails() {
        let mut fleet = Fleet::seeded();
        assert!(matches!(
            fleet.update(99, &DeviceUpdate::default()),
            Err(FleetError::UnknownId(99))
        ));
    }

    #[test]
    fn snapshot_round_trip_preserves_values() {
        let mut fleet = Fleet::seeded();
        fleet
            .update(
                2,
                &DeviceUpdate {
                    temperature: Some(27),
                    fan_speed: Some(FanSpeed::High),
                    ..Default::default()
                },
            )
            .unwrap();

        let json = fleet.snapshot_json().unwrap();
        let restored = Fleet::from_snapshot_json(&json).unwrap();
        assert_eq!(restored, fleet);

        // 温度は整数のまま、電力量は小数のまま出力される
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value[1]["temperature"].is_i64());
        assert!(value[0]["energyUsage"]["dailyKwh"].is_f64());
    }

    #[test]
    fn from_snapshot_json_rejects_garbage_and_invalid_state() {
        assert!(matches!(
            Fleet::from_snapshot_json("not json"),
            Err(FleetError::Snapshot(_))
        ));

        let mut json: serde_json::Value =
            serde_json::from_str(&Fleet::seeded().snapshot_json().unwrap()).unwrap();
        json[0]["temperature"] = serde_json::json!(40);
        assert!(matches!(
            Fleet::from_snapshot_json(&json.to_string()),
            Err(FleetError::TemperatureOutOfRange { .. })
        ));
    }

    #[test]
    fn layout_compares_ids_and_names_only() {
        let seeded = Fleet::seeded();
        let mut changed = seeded.clone();
        changed
            .update(
                1,
                &DeviceUpdate {
                    power: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(seeded.same_layout(&changed));

        let fewer = Fleet::new(seeded.devices()[..2].to_vec()).unwrap();
        assert!(!seeded.same_layout(&fewer));
    }

    #[test]
    fn layout_matches_names_like_lookup_does() {
        let seeded = Fleet::seeded();
        let mut devices = seeded.devices().to_vec();
        devices[2].name = " office ".to_string();
        let renamed = Fleet::new(devices).unwrap();
        assert!(seeded.same_layout(&renamed));

        let mut devices = seeded.devices().to_vec();
        devices[2].name = "Study".to_string();
        assert!(!seeded.same_layout(&Fleet::new(devices).unwrap()));

        let mut devices = seeded.devices().to_vec();
        devices.swap(0, 1);
        assert!(!seeded.same_layout(&Fleet::new(devices).unwrap()));
    }
}
