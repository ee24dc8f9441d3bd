use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use super::builtins::is_builtin;

/// 入力行のハイライター
///
/// - 先頭単語がダッシュボードコマンド: Cyan + Bold、以降の引数は White
/// - 引用符で囲まれたユニット名: Yellow
/// - 閉じられていない引用符: Red (警告)
///
/// 自然言語入力（先頭単語がコマンドでない）は明るい白のプレーンテキストで表示する。
pub struct CoolishHighlighter;

impl Highlighter for CoolishHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        let first = line.split_whitespace().next().unwrap_or("");
        if !is_builtin(first) {
            // Color::White は ANSI 7 (灰色) になるため、RGB で明るい白を指定
            styled.push((Style::new().fg(Color::Rgb(255, 255, 255)), line.to_string()));
            return styled;
        }

        let mut current = String::new();
        let mut in_quote = false;
        let mut is_command = true;

        for c in line.chars() {
            if in_quote {
                current.push(c);
                if c == '"' {
                    styled.push((Style::new().fg(Color::Yellow), std::mem::take(&mut current)));
                    in_quote = false;
                }
            } else if c == '"' {
                flush_word(&mut styled, &mut current, &mut is_command);
                current.push(c);
                in_quote = true;
            } else if c.is_whitespace() {
                flush_word(&mut styled, &mut current, &mut is_command);
                styled.push((Style::default(), c.to_string()));
            } else {
                current.push(c);
            }
        }

        if in_quote {
            styled.push((Style::new().fg(Color::Red), current));
        } else {
            flush_word(&mut styled, &mut current, &mut is_command);
        }
        styled
    }
}

fn flush_word(styled: &mut StyledText, word: &mut String, is_command: &mut bool) {
    if word.is_empty() {
        return;
    }
    let style = if *is_command {
        *is_command = false;
        Style::new().fg(Color::Cyan).bold()
    } else {
        Style::new().fg(Color::LightGray)
    };
    styled.push((style, std::mem::take(word)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(line: &str) -> Vec<(Style, String)> {
        CoolishHighlighter.highlight(line, 0).buffer
    }

    #[test]
    fn natural_language_is_one_plain_segment() {
        let segs = segments("make the bedroom warmer");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].1, "make the bedroom warmer");
    }

    #[test]
    fn command_name_and_quoted_unit_are_styled() {
        let segs = segments("power \"Living Room\" on");
        assert_eq!(segs[0].1, "power");
        assert_eq!(segs[0].0, Style::new().fg(Color::Cyan).bold());
        assert!(segs
            .iter()
            .any(|(style, text)| text == "\"Living Room\"" && *style == Style::new().fg(Color::Yellow)));
    }

    #[test]
    fn unclosed_quote_is_red() {
        let segs = segments("status \"Living");
        let last = segs.last().unwrap();
        assert_eq!(last.1, "\"Living");
        assert_eq!(last.0, Style::new().fg(Color::Red));
    }

    #[test]
    fn highlighting_preserves_the_line() {
        let line = "temp  Office 25";
        let joined: String = segments(line).into_iter().map(|(_, t)| t).collect();
        assert_eq!(joined, line);
    }
}
