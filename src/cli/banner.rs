use chrono::{Local, Timelike};

use super::assistant::assistant_say;
use super::color::{bold_cyan, cyan, white, yellow};

/// 時間帯に応じた挨拶を返す。
///  - 5〜11時:  "Good morning"
///  - 12〜17時: "Good afternoon"
///  - 18〜4時:  "Good evening"
fn greeting_for(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

fn time_greeting() -> &'static str {
    greeting_for(Local::now().hour())
}

/// 起動時の Welcome バナーを表示する。
pub fn print_welcome(assistant_enabled: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let separator = "==========================================";

    println!();
    println!(
        "  {}  ::  {} {}",
        bold_cyan("\u{2744} COOLISH"),
        white("Smart AC Dashboard"),
        yellow(&format!("v{version}"))
    );
    println!("{}", cyan(separator));
    println!();

    let status = if assistant_enabled {
        "Tell me what you'd like, or type `help` for dashboard commands."
    } else {
        "The assistant is offline, but dashboard commands still work. Type `help`."
    };
    assistant_say(&format!("{}! {status}", time_greeting()));
    println!();
}

/// 終了時の Farewell メッセージを表示する。
pub fn print_goodbye() {
    let farewell = match time_greeting() {
        "Good evening" => "Stay cool and sleep well.",
        _ => "Stay cool out there.",
    };
    println!();
    assistant_say(farewell);
    println!();
}
