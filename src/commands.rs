//! Command parsing
//!
//! Turns a typed line into a [`SessionCommand`].

use crate::error::{CallerError, CallerResult};
use crate::narration::RepeatMode;
use crate::pool::Category;
use crate::session::SessionCommand;

/// Shown for `help`
pub const HELP: &str = "\
Commands:
  <enter>              start / pause
  start | pause        start or pause the game
  reset                clear the board
  interval <secs>      seconds between numbers (pauses a running game)
  enable <letter>      include a column (B I N G O); resets the game
  disable <letter>     exclude a column; resets the game
  toggle <letter>      flip a column; resets the game
  rate <x>             speech rate (0.1 - 10)
  pitch <x>            speech pitch (0 - 2)
  repeat <mode>        digits | number | none
  voice <id>           choose a voice
  voices               list voices
  theme                switch light / dark
  status               show the current state
  quit                 leave";

/// Parse one line of user input
pub fn parse_command(line: &str) -> CallerResult<SessionCommand> {
    let text = line.trim().to_lowercase();
    let mut words = text.split_whitespace();
    let head = words.next().unwrap_or("");
    let arg = words.next();

    let command = match (head, arg) {
        ("", None) => SessionCommand::Toggle,
        ("start" | "s" | "go" | "resume", None) => SessionCommand::Start,
        ("pause" | "p" | "stop", None) => SessionCommand::Pause,
        ("reset" | "r" | "new", None) => SessionCommand::Reset,
        ("interval" | "i", Some(secs)) => SessionCommand::SetInterval(parse_number(line, secs)?),
        ("enable", Some(letter)) => {
            SessionCommand::SetCategory(parse_category(line, letter)?, true)
        }
        ("disable", Some(letter)) => {
            SessionCommand::SetCategory(parse_category(line, letter)?, false)
        }
        ("toggle", Some(letter)) => SessionCommand::ToggleCategory(parse_category(line, letter)?),
        ("rate", Some(value)) => SessionCommand::SetRate(parse_float(line, value)?),
        ("pitch", Some(value)) => SessionCommand::SetPitch(parse_float(line, value)?),
        ("repeat", Some(mode)) => SessionCommand::SetRepeatMode(
            mode.parse::<RepeatMode>()
                .map_err(|_| CallerError::Command(line.trim().to_string()))?,
        ),
        // Voice ids keep their case
        ("voice", Some(_)) => SessionCommand::SetVoice(
            line.split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string(),
        ),
        ("voices", None) => SessionCommand::ListVoices,
        ("theme", None) => SessionCommand::ToggleTheme,
        ("status", None) => SessionCommand::Status,
        ("quit" | "q" | "exit", None) => SessionCommand::Quit,
        _ => return Err(CallerError::Command(line.trim().to_string())),
    };

    if words.next().is_some() {
        return Err(CallerError::Command(line.trim().to_string()));
    }
    Ok(command)
}

fn parse_category(line: &str, letter: &str) -> CallerResult<Category> {
    letter
        .parse()
        .map_err(|_| CallerError::Command(line.trim().to_string()))
}

fn parse_number(line: &str, value: &str) -> CallerResult<u32> {
    value
        .parse()
        .map_err(|_| CallerError::Command(line.trim().to_string()))
}

/// Floats that parse but make no sense (`nan`, `inf`) are rejected too
fn parse_float(line: &str, value: &str) -> CallerResult<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CallerError::Command(line.trim().to_string()))
}
