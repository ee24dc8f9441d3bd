//! コマンド補完 — Tab キーでダッシュボードコマンド・ユニット名・設定値を補完
//!
//! - 先頭トークン: ダッシュボードコマンド名
//! - 2 番目: ユニット名（空白を含む名前は引用符付き）
//! - 3 番目: コマンドに応じた値（on/off、モード、風量）

use reedline::{Completer, Span, Suggestion};

use super::builtins::BUILTIN_NAMES;
use crate::device::{FanSpeed, Mode};

/// coolish 用の補完エンジン
pub struct CoolishCompleter {
    /// 補完候補として使うユニット名（引用済み）
    units: Vec<String>,
}

impl CoolishCompleter {
    pub fn new(unit_names: &[String]) -> Self {
        let units = unit_names
            .iter()
            .map(|name| {
                if name.contains(char::is_whitespace) {
                    format!("\"{name}\"")
                } else {
                    name.clone()
                }
            })
            .collect();
        Self { units }
    }

    /// 値トークンの候補。対象を持たないコマンドや値を取らないコマンドは空。
    fn value_candidates(command: &str) -> Vec<&'static str> {
        match command {
            "power" => vec!["on", "off"],
            "mode" => Mode::ALL.iter().map(Mode::as_str).collect(),
            "fan" => FanSpeed::ALL.iter().map(FanSpeed::as_str).collect(),
            _ => vec![],
        }
    }

    fn takes_unit(command: &str) -> bool {
        matches!(
            command,
            "power" | "temp" | "mode" | "fan" | "energy" | "status"
        )
    }

    fn suggest<'a>(
        candidates: impl IntoIterator<Item = &'a str>,
        partial: &str,
        span: Span,
    ) -> Vec<Suggestion> {
        // 引用符の有無は照合に影響させない
        let partial_lower = partial.trim_start_matches('"').to_ascii_lowercase();
        candidates
            .into_iter()
            .filter(|c| {
                c.trim_start_matches('"')
                    .to_ascii_lowercase()
                    .starts_with(&partial_lower)
            })
            .map(|c| Suggestion {
                value: c.to_string(),
                span,
                append_whitespace: true,
                ..Default::default()
            })
            .collect()
    }

    /// カーソル位置までを「確定済みトークン」と「入力中の部分文字列の開始位置」に分ける。
    /// 引用符で囲まれた空白はトークンの区切りとみなさない。
    fn split_line(line: &str, pos: usize) -> (Vec<String>, usize) {
        let before = &line[..pos];
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut start = 0;
        let mut in_quotes = false;

        for (i, ch) in before.char_indices() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                c if c.is_whitespace() && !in_quotes => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    start = i + c.len_utf8();
                }
                c => current.push(c),
            }
        }
        (tokens, start)
    }
}

impl Completer for CoolishCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let (tokens, start) = Self::split_line(line, pos);
        let partial = &line[start..pos];
        let span = Span::new(start, pos);

        match tokens.as_slice() {
            [] => Self::suggest(BUILTIN_NAMES.iter().copied(), partial, span),
            [command] if Self::takes_unit(command) => {
                Self::suggest(self.units.iter().map(String::as_str), partial, span)
            }
            [command] if command == "snapshot" => Self::suggest(["save", "load"], partial, span),
            [command, _unit] => Self::suggest(Self::value_candidates(command), partial, span),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> CoolishCompleter {
        CoolishCompleter::new(&[
            "Living Room".to_string(),
            "Bedroom".to_string(),
            "Office".to_string(),
        ])
    }

    fn values(suggestions: Vec<Suggestion>) -> Vec<String> {
        suggestions.into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn first_token_completes_commands() {
        let mut c = completer();
        let got = values(c.complete("po", 2));
        assert_eq!(got, vec!["power"]);
    }

    #[test]
    fn second_token_completes_units_with_quotes() {
        let mut c = completer();
        let got = values(c.complete("power li", 8));
        assert_eq!(got, vec!["\"Living Room\""]);

        let got = values(c.complete("energy ", 7));
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn third_token_completes_values() {
        let mut c = completer();
        let line = "mode \"Living Room\" h";
        let got = values(c.complete(line, line.len()));
        assert_eq!(got, vec!["heat"]);

        let line = "power Office o";
        let got = values(c.complete(line, line.len()));
        assert_eq!(got, vec!["on", "off"]);
    }

    #[test]
    fn commands_without_units_complete_nothing() {
        let mut c = completer();
        assert!(c.complete("help x", 6).is_empty());
        assert!(c.complete("temp Office 2", 13).is_empty());
    }

    #[test]
    fn snapshot_completes_subcommands() {
        let mut c = completer();
        assert_eq!(values(c.complete("snapshot l", 10)), vec!["load"]);
        assert_eq!(values(c.complete("snapshot ", 9)), vec!["save", "load"]);
    }
}
