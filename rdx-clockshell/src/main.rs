use anyhow::Result;
use colored::Colorize;
use gameclock::prelude::*;
use gameclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    for line in [
        "  ┌─┐┬  ┌─┐┌─┐┬┌─┌─┐┬ ┬┌─┐┬  ┬",
        "  │  │  │ ││  ├┴┐└─┐├─┤├┤ │  │",
        "  └─┘┴─┘└─┘└─┘┴ ┴└─┘┴ ┴└─┘┴─┘┴─┘",
    ] {
        println!("{}", line.cyan());
    }
    println!("{}", rule.dimmed());
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!(
        "{}",
        "    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

fn format_ms(ms: u64) -> String {
    let tenths = (ms % 1_000) / 100;
    let seconds = ms / 1_000;
    format!("{}:{:02}.{}", seconds / 60, seconds % 60, tenths)
}

fn status_line(state: &ClockState) -> String {
    let mark = |player: Player| {
        if state.active_player() == Some(player) {
            "▶".green().bold().to_string()
        } else {
            " ".to_string()
        }
    };
    format!(
        "{} P0 {}  |  {} P1 {}  [{}]  moves {:?}",
        mark(Player::First),
        format_ms(state.remaining(Player::First)),
        mark(Player::Second),
        format_ms(state.remaining(Player::Second)),
        state.status,
        state.moves,
    )
}

/// Spawns a task that prints every event broadcast by the clock.
fn spawn_event_listener(clock: &ClockEngine) {
    let mut events = clock.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("\n<-- [EVENT] {:?}", event);
        }
    });
}

fn parse_player(arg: Option<&&str>) -> Option<Player> {
    arg.and_then(|s| s.parse::<u8>().ok())
        .and_then(|n| Player::try_from(n).ok())
}

fn print_help() {
    println!("Available commands:");
    println!("  presets               - Lists the known time controls.");
    println!("  use <NAME>            - Resets the clock to the named time control.");
    println!("  push <0|1>            - Ends the given player's turn.");
    println!("  pause | resume        - Suspends or resumes counting.");
    println!("  add <0|1> <MS>        - Adds (or with a minus sign, removes) time.");
    println!("  reset                 - Restarts the current time control.");
    println!("  state                 - Prints the full clock state as JSON.");
    println!("  watch on|off          - Prints a status line on every tick.");
    println!("  exit                  - Quits the shell.");
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let mut registry = ConfigRegistry::with_presets();
    if let Some(path) = env::args().nth(1) {
        let count = registry.merge_file(&path)?;
        info!("Loaded {} presets from {}", count, path);
    }

    let initial = registry.require("Fischer Blitz 5|0")?;
    let clock = ClockEngine::from_preset(initial, Arc::new(TokioTickSource::new()?))?;

    // Shared flag for the tick printer.
    let is_watching = Arc::new(AtomicBool::new(false));
    let watching = is_watching.clone();
    clock.on_update(move |state| {
        if watching.load(Ordering::Relaxed) {
            println!("{}", status_line(state));
        }
    });
    spawn_event_listener(&clock);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHighlighter));

    println!(
        "{} is running. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting clockshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some(command) = args.first() else {
            continue;
        };

        match *command {
            "presets" => {
                for (name, stages) in registry.list_config_entries() {
                    let modes: Vec<&str> = stages.iter().map(|s| s.mode.as_str()).collect();
                    println!("  {:<28} {}", name, modes.join(" → ").dimmed());
                }
            }
            "use" => {
                let name = args[1..].join(" ");
                match registry.require(&name) {
                    Ok(preset) => match clock.reset_with(preset) {
                        Ok(()) => println!("--> Now playing '{}'.", name),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Error: {}", e),
                }
            }
            "push" => match parse_player(args.get(1)) {
                Some(player) => {
                    clock.push(player);
                    println!("{}", status_line(&clock.state()));
                }
                None => println!("Usage: push <0|1>"),
            },
            "pause" => {
                clock.pause();
                println!("{}", status_line(&clock.state()));
            }
            "resume" => {
                clock.resume();
                println!("{}", status_line(&clock.state()));
            }
            "add" => {
                let ms = args.get(2).and_then(|s| s.parse::<i64>().ok());
                match (parse_player(args.get(1)), ms) {
                    (Some(player), Some(ms)) => {
                        clock.add_time(player, ms);
                        println!("{}", status_line(&clock.state()));
                    }
                    _ => println!("Usage: add <0|1> <MS>"),
                }
            }
            "reset" => {
                clock.reset();
                println!("{}", status_line(&clock.state()));
            }
            "state" => println!("{}", serde_json::to_string_pretty(&clock.state())?),
            "watch" => match args.get(1) {
                Some(&"on") => {
                    is_watching.store(true, Ordering::Relaxed);
                    println!("--> Printing a status line on every tick.");
                }
                Some(&"off") => {
                    is_watching.store(false, Ordering::Relaxed);
                    println!("--> Stopped printing ticks.");
                }
                _ => println!("Usage: watch on|off"),
            },
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line),
        }
    }

    Ok(())
}
