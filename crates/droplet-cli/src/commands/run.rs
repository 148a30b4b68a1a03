//! The `run` command: the reminder loop in the foreground.
//!
//! Host menu actions are read as lines from stdin and marshaled onto the
//! loop thread; sleep/wake can be injected the same way (or by whatever
//! power-event watcher a platform shell wires to the handle).

use std::io::BufRead;
use std::time::Duration;

use clap::Args;
use droplet_core::runtime::{HostSignal, ReminderLoop};
use droplet_core::scheduler::PAUSE_WINDOW;
use droplet_core::{Config, Event};

use crate::host::{surface_factory, LogIndicator, SurfaceKind, TomlSettings};

#[derive(Args)]
pub struct RunArgs {
    /// Notification surface
    #[arg(long, value_enum, default_value = "toast")]
    pub surface: SurfaceKind,

    /// Print events as JSON lines on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    let sink: Box<dyn FnMut(&Event)> = if args.json {
        Box::new(|event| {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
        })
    } else {
        Box::new(|event| tracing::debug!(?event, "event"))
    };

    let reminder_loop = ReminderLoop::new(Box::new(TomlSettings::new(config)))
        .with_indicator(Box::new(LogIndicator::default()))
        .with_surface_factory(surface_factory(args.surface))
        .with_event_sink(sink);
    let handle = reminder_loop.handle();

    // The menu collaborator, rendered as a line prompt. EOF quits.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                Some(signal) => {
                    let done = signal == HostSignal::Shutdown;
                    handle.signal_blocking(signal);
                    if done {
                        return;
                    }
                }
                None => eprintln!(
                    "commands: toggle | on | off | pause [secs] | now | sleep | wake | status | quit"
                ),
            }
        }
        handle.signal_blocking(HostSignal::Shutdown);
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(reminder_loop.run());
    Ok(())
}

/// Map one input line to a host signal.
pub fn parse_line(line: &str) -> Option<HostSignal> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "toggle" => Some(HostSignal::Toggle),
        "on" => Some(HostSignal::SetEnabled(true)),
        "off" => Some(HostSignal::SetEnabled(false)),
        "pause" => {
            let window = match parts.next() {
                Some(secs) => Duration::from_secs(secs.parse().ok()?),
                None => PAUSE_WINDOW,
            };
            Some(HostSignal::Pause(window))
        }
        "now" => Some(HostSignal::TriggerNow),
        "sleep" => Some(HostSignal::Sleep),
        "wake" => Some(HostSignal::Wake),
        "status" => Some(HostSignal::Snapshot),
        "quit" | "exit" => Some(HostSignal::Shutdown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_commands() {
        assert_eq!(parse_line("toggle"), Some(HostSignal::Toggle));
        assert_eq!(parse_line("now"), Some(HostSignal::TriggerNow));
        assert_eq!(parse_line("  wake  "), Some(HostSignal::Wake));
        assert_eq!(parse_line("quit"), Some(HostSignal::Shutdown));
    }

    #[test]
    fn pause_defaults_to_the_menu_window() {
        assert_eq!(parse_line("pause"), Some(HostSignal::Pause(PAUSE_WINDOW)));
        assert_eq!(
            parse_line("pause 600"),
            Some(HostSignal::Pause(Duration::from_secs(600)))
        );
    }

    #[test]
    fn junk_lines_are_rejected() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("dance"), None);
        assert_eq!(parse_line("pause soon"), None);
    }
}
