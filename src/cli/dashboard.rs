//! デバイスカードの描画
//!
//! フリートの内容をそのまま文字列にするだけで、状態は持たない。

use super::color::{bold_cyan, cyan, dim, green, white, yellow};
use crate::device::{Device, Fleet};

/// カード内側の幅（表示文字数）
const CARD_WIDTH: usize = 34;

/// 1 台分のカードを描画する。
///
/// ```text
/// ┌──────────────────────────────────┐
/// │ Bedroom                     ● ON │
/// │ 20°C   cool   fan low            │
/// │ 1.8 kWh today · 45.2 kWh month   │
/// └──────────────────────────────────┘
/// ```
pub fn render_card(device: &Device) -> String {
    let border = "─".repeat(CARD_WIDTH);

    let power_label = if device.power { "● ON" } else { "○ OFF" };
    let header = row(
        &format!(
            "{:<width$}{}",
            device.name,
            power_label,
            width = CARD_WIDTH.saturating_sub(power_label.chars().count() + 2)
        ),
        |s| {
            // 名前とバッジを別々に色付けする
            let (name, badge) = s.split_at(s.len() - power_label.len());
            let badge = if device.power { green(badge) } else { dim(badge) };
            format!("{}{}", bold_cyan(name), badge)
        },
    );

    let settings = row(
        &format!(
            "{}°C   {}   fan {}",
            device.temperature, device.mode, device.fan_speed
        ),
        |s| if device.power { yellow(s) } else { dim(s) },
    );

    let energy = row(
        &format!(
            "{} kWh today · {} kWh month",
            device.energy_usage.daily_kwh, device.energy_usage.monthly_kwh
        ),
        white,
    );

    [
        cyan(&format!("┌{border}┐")),
        header,
        settings,
        energy,
        cyan(&format!("└{border}┘")),
    ]
    .join("\n")
}

/// フリート全体を描画する。先頭に稼働台数の要約を付ける。
pub fn render_fleet(fleet: &Fleet) -> String {
    let mut out = summary_line(fleet);
    for device in fleet.devices() {
        out.push('\n');
        out.push_str(&render_card(device));
    }
    out
}

/// `2 of 3 units running` のような要約行
pub fn summary_line(fleet: &Fleet) -> String {
    let on = fleet.powered_on();
    let total = fleet.len();
    let noun = if total == 1 { "unit" } else { "units" };
    white(&format!("{on} of {total} {noun} running"))
}

/// 内容を幅に合わせて左寄せし、枠線付きの 1 行にする。
/// 色付けはパディング前の文字列に対して行う（エスケープ文字が幅計算を狂わせないように）。
fn row(content: &str, paint: impl Fn(&str) -> String) -> String {
    let len = content.chars().count();
    let padding = " ".repeat(CARD_WIDTH.saturating_sub(len + 2));
    format!(
        "{} {}{} {}",
        cyan("│"),
        paint(content),
        padding,
        cyan("│")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_shows_every_field() {
        let fleet = Fleet::seeded();
        let card = render_card(fleet.get(2).unwrap());
        assert!(card.contains("Bedroom"));
        assert!(card.contains("ON"));
        assert!(card.contains("20°C"));
        assert!(card.contains("cool"));
        assert!(card.contains("fan low"));
        assert!(card.contains("1.8 kWh today"));
        assert!(card.contains("45.2 kWh month"));
    }

    #[test]
    fn powered_off_unit_is_marked_off() {
        let fleet = Fleet::seeded();
        let card = render_card(fleet.get(3).unwrap());
        assert!(card.contains("OFF"));
        assert!(card.contains("fan medium"));
    }

    #[test]
    fn fleet_renders_one_card_per_device_in_order() {
        let fleet = Fleet::seeded();
        let out = render_fleet(&fleet);
        assert!(out.contains("1 of 3 units running"));
        assert_eq!(out.matches('┌').count(), 3);

        let living = out.find("Living Room").unwrap();
        let bedroom = out.find("Bedroom").unwrap();
        let office = out.find("Office").unwrap();
        assert!(living < bedroom && bedroom < office);
    }

    #[test]
    fn long_names_do_not_panic() {
        let mut device = Fleet::seeded().get(1).unwrap().clone();
        device.name = "A very long unit name that overflows the card".to_string();
        let card = render_card(&device);
        assert!(card.contains("overflows"));
    }
}
