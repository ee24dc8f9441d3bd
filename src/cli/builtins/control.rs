use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use super::{parse_args, BuiltinResult};
use crate::ai::LanguageModel;
use crate::command::{Action, Command, CommandError};
use crate::device::{FanSpeed, Mode};
use crate::session::Session;

/// power: ユニットの電源を入れる・切る。
#[derive(Parser)]
#[command(name = "power", about = "Turn a unit on or off")]
struct PowerArgs {
    /// ユニット名（空白を含む場合は引用符で囲む）
    unit: String,
    /// on / off
    #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    state: bool,
}

/// temp: 設定温度を変更する。
#[derive(Parser)]
#[command(name = "temp", about = "Set a unit's target temperature (16-30°C)")]
struct TempArgs {
    unit: String,
    #[arg(allow_negative_numbers = true)]
    temperature: i64,
}

/// mode: 運転モードを変更する。
#[derive(Parser)]
#[command(name = "mode", about = "Set a unit's mode (cool, heat, fan, auto)")]
struct ModeArgs {
    unit: String,
    mode: String,
}

/// fan: 風量を変更する。
#[derive(Parser)]
#[command(name = "fan", about = "Set a unit's fan speed (low, medium, high, auto)")]
struct FanArgs {
    unit: String,
    speed: String,
}

/// energy: 電力使用量を表示する。
#[derive(Parser)]
#[command(name = "energy", about = "Show a unit's energy usage")]
struct EnergyArgs {
    unit: String,
}

/// 引数を `Command` に組み立てる。値の検証エラーはユーザー向けの文になる。
fn build_command(cmd: &str, args: &[&str]) -> Result<Result<Command, BuiltinResult>, String> {
    let command = match cmd {
        "power" => parse_args::<PowerArgs>(cmd, args)?
            .map(|a| Ok(Command::new(a.unit, Action::SetPower { power: a.state }))),
        "temp" => parse_args::<TempArgs>(cmd, args)?
            .map(|a| Action::set_temperature(a.temperature).map(|action| Command::new(a.unit, action))),
        "mode" => parse_args::<ModeArgs>(cmd, args)?.map(|a| {
            a.mode
                .parse::<Mode>()
                .map(|mode| Command::new(a.unit, Action::SetMode { mode }))
                .map_err(|e| CommandError::UnknownMode(e.0))
        }),
        "fan" => parse_args::<FanArgs>(cmd, args)?.map(|a| {
            a.speed
                .parse::<FanSpeed>()
                .map(|fan_speed| Command::new(a.unit, Action::SetFanSpeed { fan_speed }))
                .map_err(|e| CommandError::UnknownFanSpeed(e.0))
        }),
        _ => parse_args::<EnergyArgs>(cmd, args)?
            .map(|a| Ok(Command::new(a.unit, Action::GetEnergyUsage))),
    };

    Ok(match command {
        Ok(Ok(command)) => Ok(command),
        Ok(Err(e)) => Err(BuiltinResult::error(e.to_string())),
        Err(help) => Err(help),
    })
}

/// 操作系コマンドを実行する。フリートの更新は AI 経由と同じディスパッチャを通る。
pub(super) fn execute<M: LanguageModel>(
    session: &mut Session<M>,
    cmd: &str,
    args: &[&str],
) -> Result<BuiltinResult, String> {
    let command = match build_command(cmd, args)? {
        Ok(c) => c,
        Err(result) => return Ok(result),
    };

    let outcome = session.apply_manual(&command);
    Ok(if outcome.ok {
        BuiltinResult::success(outcome.text)
    } else {
        BuiltinResult::error(outcome.text)
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::offline_session;
    use super::*;

    fn run(cmd: &str, args: &[&str]) -> (BuiltinResult, Session<crate::ai::testing::ScriptedModel>) {
        let mut s = offline_session();
        let result = execute(&mut s, cmd, args).unwrap();
        (result, s)
    }

    #[test]
    fn power_accepts_on_and_off() {
        let (result, s) = run("power", &["Office", "on"]);
        assert!(result.ok);
        assert_eq!(result.output, "Office is now on.");
        assert!(s.fleet().get(3).unwrap().power);

        let (result, s) = run("power", &["bedroom", "off"]);
        assert_eq!(result.output, "Bedroom is now off.");
        assert!(!s.fleet().get(2).unwrap().power);
    }

    #[test]
    fn multi_word_unit_names_work_as_one_argument() {
        let (result, s) = run("temp", &["Living Room", "25"]);
        assert!(result.ok);
        assert_eq!(s.fleet().get(1).unwrap().temperature, 25);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let (result, s) = run("temp", &["Office", "31"]);
        assert!(!result.ok);
        assert!(result.output.contains("out of range"));
        assert_eq!(s.fleet(), &crate::device::Fleet::seeded());

        let (result, _) = run("temp", &["Office", "-5"]);
        assert!(!result.ok);
    }

    #[test]
    fn mode_and_fan_tokens_are_case_insensitive() {
        let (result, s) = run("mode", &["Office", "HEAT"]);
        assert!(result.ok);
        assert_eq!(s.fleet().get(3).unwrap().mode, Mode::Heat);

        let (result, s) = run("fan", &["Office", "High"]);
        assert!(result.ok);
        assert_eq!(s.fleet().get(3).unwrap().fan_speed, FanSpeed::High);
    }

    #[test]
    fn invalid_mode_reports_choices() {
        let (result, _) = run("mode", &["Office", "dry"]);
        assert!(!result.ok);
        assert!(result.output.contains("cool, heat, fan, auto"));
    }

    #[test]
    fn unknown_unit_is_reported() {
        let (result, _) = run("energy", &["Garage"]);
        assert!(!result.ok);
        assert!(result.output.contains("Garage"));
    }

    #[test]
    fn energy_reports_usage() {
        let (result, _) = run("energy", &["Bedroom"]);
        assert_eq!(
            result.output,
            "Bedroom has used 1.8 kWh today and 45.2 kWh this month."
        );
    }

    #[test]
    fn manual_commands_stay_out_of_the_conversation() {
        let (_, s) = run("power", &["Office", "on"]);
        assert!(s.conversation().is_empty());
    }

    #[test]
    fn missing_value_is_a_parse_error() {
        let mut s = offline_session();
        assert!(execute(&mut s, "power", &["Office"]).is_err());
        assert!(execute(&mut s, "temp", &["Office", "warm"]).is_err());
        assert!(execute(&mut s, "power", &["Office", "maybe"]).is_err());
    }
}
