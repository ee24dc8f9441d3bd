use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Local;
use reedline::{Color, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::color::{cyan, dim, green, white};

/// coolish のカスタムプロンプト。
///
/// ```text
/// ❄ coolish · 1/3 on
/// ❯
/// ```
pub struct CoolishPrompt {
    /// 稼働中のユニット数。ターンごとにメインループから更新される。
    units_on: Arc<AtomicUsize>,
    /// フリートの台数（起動後は変わらない）
    total: usize,
}

impl CoolishPrompt {
    pub fn new(units_on: Arc<AtomicUsize>, total: usize) -> Self {
        Self { units_on, total }
    }

    fn status_label(&self) -> String {
        let on = self.units_on.load(Ordering::Relaxed);
        let label = format!("{on}/{} on", self.total);
        if on > 0 {
            green(&label)
        } else {
            dim(&label)
        }
    }
}

impl Prompt for CoolishPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{} · {}\n",
            cyan("\u{2744} coolish"),
            self.status_label()
        ))
    }

    fn get_prompt_color(&self) -> Color {
        Color::White
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        let now = Local::now().format("%H:%M:%S").to_string();
        Cow::Owned(white(&now))
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Owned(green("\u{276f} "))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(" :: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("{prefix}(search: '{}') ", history_search.term))
    }
}
