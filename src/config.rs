//! 設定ファイル管理
//!
//! `~/.config/coolish/config.toml` から TOML 形式の設定を読み込む。
//! ファイルが存在しない場合はテンプレートを生成し、デフォルト値を使用する。
//!
//! # 設定ファイル例
//!
//! ```toml
//! [ai]
//! model = "gemini-2.5-flash"
//! api_base = "https://generativelanguage.googleapis.com/v1beta/openai"
//! api_key_env = "GEMINI_API_KEY"
//! timeout_secs = 30
//!
//! [[devices]]
//! id = 1
//! name = "Den"
//! power = false
//! temperature = 23
//! mode = "cool"
//! fanSpeed = "auto"
//! energyUsage = { dailyKwh = 2.0, monthlyKwh = 40.0 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::device::{Device, Fleet};

/// coolish の設定全体
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CoolishConfig {
    /// AI 関連設定
    pub ai: AiConfig,
    /// 既定の 3 台の代わりに使うフリート（省略時は既定構成）
    pub devices: Option<Vec<Device>>,
}

/// AI 関連の設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 使用するモデル名
    pub model: String,
    /// OpenAI 互換 API のベース URL
    pub api_base: String,
    /// API キーを読み取る環境変数名
    pub api_key_env: String,
    /// 1 回の問い合わせのタイムアウト（秒）
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl CoolishConfig {
    /// 設定ファイルを読み込む。
    ///
    /// 存在しなければテンプレートを生成してデフォルト値を返す。
    /// 読み込み・パースに失敗した場合は警告を表示してデフォルト値を返す。
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// 指定パスから設定を読み込む。
    pub fn load_from(path: &Path) -> Self {
        debug!(path = %path.display(), "Loading config file");

        if !path.exists() {
            Self::create_default_config(path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<CoolishConfig>(&content) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        model = %config.ai.model,
                        api_base = %config.ai.api_base,
                        timeout_secs = config.ai.timeout_secs,
                        custom_devices = config.devices.as_ref().map_or(0, Vec::len),
                        "Config loaded successfully"
                    );
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    eprintln!("coolish: warning: failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config file");
                eprintln!("coolish: warning: failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// 設定ファイルのパス。`$HOME` が取得できない場合はカレントディレクトリ基準。
    pub fn config_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/coolish/config.toml")
    }

    /// 設定に従ってフリートを構築する。
    ///
    /// `[[devices]]` が無ければ既定の 3 台。検証に失敗した場合は警告を出して既定構成に戻す。
    pub fn fleet(&self) -> Fleet {
        let Some(devices) = self.devices.clone() else {
            return Fleet::seeded();
        };

        match Fleet::new(devices) {
            Ok(fleet) if !fleet.is_empty() => {
                info!(device_count = fleet.len(), "Using fleet from config");
                fleet
            }
            Ok(_) => {
                warn!("Config defines an empty fleet, using the seeded fleet");
                eprintln!("coolish: warning: config defines no devices, using defaults");
                Fleet::seeded()
            }
            Err(e) => {
                warn!(error = %e, "Invalid fleet in config, using the seeded fleet");
                eprintln!("coolish: warning: invalid devices in config: {e}");
                Fleet::seeded()
            }
        }
    }

    /// 設定ファイルが存在しない場合にテンプレートから生成する。
    /// 失敗しても警告のみで起動は継続する。
    fn create_default_config(path: &Path) {
        const TEMPLATE: &str = r#"# coolish configuration

[ai]
# model = "gemini-2.5-flash"
# api_base = "https://generativelanguage.googleapis.com/v1beta/openai"
# api_key_env = "GEMINI_API_KEY"
# timeout_secs = 30

# Replace the default fleet (Living Room, Bedroom, Office):
# [[devices]]
# id = 1
# name = "Den"
# power = false
# temperature = 23
# mode = "cool"
# fanSpeed = "auto"
# energyUsage = { dailyKwh = 2.0, monthlyKwh = 40.0 }
"#;

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create config directory");
                eprintln!("coolish: warning: failed to create config directory: {e}");
                return;
            }
        }

        match std::fs::write(path, TEMPLATE) {
            Ok(()) => info!(path = %path.display(), "Created default config file"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to create default config file");
                eprintln!("coolish: warning: failed to create config file: {e}");
            }
        }
    }
}
