use crossbeam_channel::Sender;
use log::{info, warn};
use std::{
    io::{BufRead, stdin},
    str::FromStr,
};
use thiserror::Error;

/// Actions the announcer can take from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    PostMatchResult,
    Quit,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("Unknown command `{0}`, expected `post` or `quit`")]
pub struct UnknownCommand(String);

impl FromStr for OperatorCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "post" | "p" => Ok(Self::PostMatchResult),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Reads commands from stdin until it closes or the receiver goes away
pub fn stdin_thread(tx: Sender<OperatorCommand>) {
    for line in stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from stdin: {e}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<OperatorCommand>() {
            Ok(cmd) => {
                if tx.send(cmd).is_err() {
                    return;
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
    info!("Stdin closed, console commands disabled");
}
