use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use super::{parse_args, BuiltinResult};
use crate::ai::LanguageModel;
use crate::cli::dashboard::{render_card, render_fleet};
use crate::command::CommandError;
use crate::device::Fleet;
use crate::session::Session;

/// status: ダッシュボードを表示する。
#[derive(Parser)]
#[command(name = "status", about = "Show the dashboard, or a single unit")]
struct StatusArgs {
    /// 表示するユニット名（省略時は全台）
    unit: Option<String>,
}

/// snapshot: アシスタントに送られるのと同じ JSON を表示・保存・復元する。
#[derive(Parser)]
#[command(name = "snapshot", about = "Print, save or load the fleet snapshot (JSON)")]
struct SnapshotArgs {
    #[command(subcommand)]
    command: Option<SnapshotCommand>,
}

#[derive(Subcommand)]
enum SnapshotCommand {
    /// 現在の状態をファイルに保存する
    Save { path: PathBuf },
    /// 保存した状態を読み込む（同じユニット構成のみ）
    Load { path: PathBuf },
}

pub(super) fn status(fleet: &Fleet, args: &[&str]) -> Result<BuiltinResult, String> {
    let parsed = match parse_args::<StatusArgs>("status", args)? {
        Ok(a) => a,
        Err(help) => return Ok(help),
    };

    Ok(match parsed.unit {
        None => BuiltinResult::success(render_fleet(fleet)),
        Some(name) => match fleet.find_by_name(&name) {
            Some(device) => BuiltinResult::success(render_card(device)),
            None => BuiltinResult::error(
                CommandError::DeviceNotFound(name.trim().to_string()).to_string(),
            ),
        },
    })
}

pub(super) fn snapshot<M: LanguageModel>(
    session: &mut Session<M>,
    args: &[&str],
) -> Result<BuiltinResult, String> {
    let parsed = match parse_args::<SnapshotArgs>("snapshot", args)? {
        Ok(a) => a,
        Err(help) => return Ok(help),
    };

    Ok(match parsed.command {
        None => match session.fleet().snapshot_json() {
            Ok(json) => BuiltinResult::success(json),
            Err(e) => BuiltinResult::error(format!("coolish: snapshot: {e}")),
        },
        Some(SnapshotCommand::Save { path }) => save(session.fleet(), &path),
        Some(SnapshotCommand::Load { path }) => load(session, &path),
    })
}

fn save(fleet: &Fleet, path: &Path) -> BuiltinResult {
    let result = fleet
        .snapshot_json()
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json + "\n").map_err(|e| e.to_string()));

    match result {
        Ok(()) => {
            info!(path = %path.display(), "Snapshot saved");
            BuiltinResult::success(format!("Saved {} units to {}.", fleet.len(), path.display()))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to save snapshot");
            BuiltinResult::error(format!("coolish: snapshot: {}: {e}", path.display()))
        }
    }
}

fn load<M: LanguageModel>(session: &mut Session<M>, path: &Path) -> BuiltinResult {
    let result = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| Fleet::from_snapshot_json(&json).map_err(|e| e.to_string()))
        .and_then(|fleet| session.restore_fleet(fleet).map_err(|e| e.to_string()));

    match result {
        Ok(()) => BuiltinResult::success(format!(
            "Restored from {}.\n{}",
            path.display(),
            render_fleet(session.fleet())
        )),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load snapshot");
            BuiltinResult::error(format!("coolish: snapshot: {}: {e}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::offline_session;
    use super::*;
    use crate::command::{Action, Command};

    #[test]
    fn status_without_unit_shows_every_card() {
        let result = status(&Fleet::seeded(), &[]).unwrap();
        assert!(result.ok);
        assert!(result.output.contains("Living Room"));
        assert!(result.output.contains("Bedroom"));
        assert!(result.output.contains("Office"));
    }

    #[test]
    fn status_for_one_unit() {
        let result = status(&Fleet::seeded(), &["office"]).unwrap();
        assert!(result.ok);
        assert!(result.output.contains("Office"));
        assert!(!result.output.contains("Bedroom"));
    }

    #[test]
    fn status_for_unknown_unit() {
        let result = status(&Fleet::seeded(), &["Garage"]).unwrap();
        assert!(!result.ok);
        assert!(result.output.contains("Garage"));
    }

    #[test]
    fn snapshot_prints_the_prompt_json() {
        let mut s = offline_session();
        let result = snapshot(&mut s, &[]).unwrap();
        assert!(result.ok);
        assert_eq!(Fleet::from_snapshot_json(&result.output).unwrap(), Fleet::seeded());
    }

    #[test]
    fn snapshot_save_then_load_restores_state() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fleet.json");
        let path_str = path.to_str().unwrap();

        let mut s = offline_session();
        s.apply_manual(&Command::new("Office", Action::SetPower { power: true }));
        let saved = s.fleet().clone();

        let result = snapshot(&mut s, &["save", path_str]).unwrap();
        assert!(result.ok, "{}", result.output);

        s.apply_manual(&Command::new("Office", Action::SetPower { power: false }));
        assert_ne!(s.fleet(), &saved);

        let result = snapshot(&mut s, &["load", path_str]).unwrap();
        assert!(result.ok, "{}", result.output);
        assert_eq!(s.fleet(), &saved);
    }

    #[test]
    fn snapshot_load_rejects_bad_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut s = offline_session();
        let result = snapshot(&mut s, &["load", path.to_str().unwrap()]).unwrap();
        assert!(!result.ok);
        assert_eq!(s.fleet(), &Fleet::seeded());

        let missing = tmp.path().join("missing.json");
        let result = snapshot(&mut s, &["load", missing.to_str().unwrap()]).unwrap();
        assert!(!result.ok);
    }

    #[test]
    fn snapshot_rejects_unknown_subcommands() {
        let mut s = offline_session();
        assert!(snapshot(&mut s, &["extra"]).is_err());
    }
}
