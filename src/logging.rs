//! ログ初期化モジュール
//!
//! `tracing` + `tracing-subscriber` でデバッグログをファイルに出力する。
//! 画面は REPL が使うため、ログは端末には一切出さない。
//! ログファイルは `var/logs/` に日次ローテーションで保存される。

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルを指定する環境変数
pub const LOG_ENV: &str = "COOLISH_LOG";

/// ログ行のタイムスタンプをローカル時刻（オフセット付き）で出力するタイマー
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// ログの出力先ディレクトリ。
/// 開発時は `CARGO_MANIFEST_DIR`、それ以外はカレントディレクトリ基準の `var/logs/`。
fn log_dir() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        return PathBuf::from(manifest_dir).join("var").join("logs");
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("var")
        .join("logs")
}

/// 日次ローテーションするライターを作る。失敗した場合はログを捨てるライターを返す。
fn make_writer(dir: PathBuf) -> Box<dyn Write + Send> {
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!(
            "coolish: warning: failed to create log directory {}: {e}",
            dir.display()
        );
        return Box::new(std::io::sink());
    }

    match Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix("coolish")
        .filename_suffix("log")
        .build(&dir)
    {
        Ok(appender) => Box::new(appender),
        Err(e) => {
            eprintln!(
                "coolish: warning: failed to open log file in {}: {e}",
                dir.display()
            );
            Box::new(std::io::sink())
        }
    }
}

/// ログシステムを初期化する。
///
/// - ログレベルは `COOLISH_LOG` 環境変数で制御（デフォルト: `debug`）
/// - 出力先は `var/logs/coolish.YYYY-MM-DD.log`
///
/// 返り値のガードは `main()` で保持し続けること（ドロップするとログ出力が止まる）。
pub fn init_logging() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(make_writer(log_dir()));

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));

    // 二重初期化（テスト等）は無視する
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(non_blocking)
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_file(true)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_falls_back_when_directory_is_unusable() {
        let tmp = tempfile::tempdir().unwrap();
        // ファイルの下にディレクトリは作れない
        let blocker = tmp.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let mut writer = make_writer(blocker.join("logs"));
        assert!(writer.write_all(b"dropped\n").is_ok());
    }

    #[test]
    fn writer_creates_log_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("var").join("logs");

        let mut writer = make_writer(dir.clone());
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let files: Vec<_> = std::fs::read_dir(&dir).unwrap().flatten().collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().to_string_lossy().to_string();
        assert!(name.starts_with("coolish."));
        assert!(name.ends_with(".log"));
    }
}
