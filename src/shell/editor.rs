//! reedline エディタの構築
//!
//! ハイライター、補完、キーバインディング、履歴、オートサジェストを設定した
//! reedline エディタを構築する。

use std::path::PathBuf;

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu,
};
use tracing::warn;

use crate::cli::completer::CoolishCompleter;
use crate::cli::highlighter::CoolishHighlighter;

/// 入力履歴として保持する行数
const HISTORY_CAPACITY: usize = 1000;

/// エディタを構築する。
///
/// `history_path` に入力履歴を保存する。開けない場合は履歴なしで続行する。
pub fn build_editor(unit_names: &[String], history_path: PathBuf) -> Reedline {
    let completer = Box::new(CoolishCompleter::new(unit_names));
    let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

    // Fish ライクなオートサジェスト（履歴からグレーテキストで候補を表示）
    let hinter = Box::new(
        DefaultHinter::default()
            .with_style(Style::new().fg(Color::DarkGray))
            .with_min_chars(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    let editor = Reedline::create()
        .with_hinter(hinter)
        .with_highlighter(Box::new(CoolishHighlighter))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    match FileBackedHistory::with_file(HISTORY_CAPACITY, history_path.clone()) {
        Ok(history) => editor.with_history(Box::new(history)),
        Err(e) => {
            warn!(path = %history_path.display(), error = %e, "Failed to open input history");
            editor
        }
    }
}
