use clap::Parser;

use super::{parse_args, BuiltinResult};
use crate::cli::color::{cyan, white};

/// help: 使えるコマンドの一覧を表示する。
#[derive(Parser)]
#[command(name = "help", about = "Show available dashboard commands")]
struct HelpArgs {}

const COMMANDS: &[(&str, &str)] = &[
    ("status [unit]", "Show the dashboard, or a single unit"),
    ("power <unit> <on|off>", "Turn a unit on or off"),
    ("temp <unit> <16-30>", "Set the target temperature"),
    ("mode <unit> <mode>", "cool, heat, fan or auto"),
    ("fan <unit> <speed>", "low, medium, high or auto"),
    ("energy <unit>", "Show energy usage"),
    ("history [-n N]", "Show the conversation"),
    ("snapshot", "Print the fleet as JSON, or save/load it"),
    ("help", "Show this help"),
    ("exit", "Leave the dashboard"),
];

pub(super) fn execute(args: &[&str]) -> Result<BuiltinResult, String> {
    if let Err(help) = parse_args::<HelpArgs>("help", args)? {
        return Ok(help);
    }

    let mut lines = vec![white("Dashboard commands:")];
    for (usage, about) in COMMANDS {
        lines.push(format!("  {}  {}", cyan(&format!("{usage:<24}")), about));
    }
    lines.push(String::new());
    lines.push(white(
        "Anything else is sent to the assistant, e.g. \"make the bedroom a bit warmer\".",
    ));
    lines.push(white("Quote unit names that contain spaces: power \"Living Room\" on"));

    Ok(BuiltinResult::success(lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::builtins::BUILTIN_NAMES;

    #[test]
    fn help_mentions_every_command() {
        let result = execute(&[]).unwrap();
        for name in BUILTIN_NAMES {
            assert!(result.output.contains(name), "help is missing {name}");
        }
    }
}
