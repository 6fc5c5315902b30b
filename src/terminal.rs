//! Terminal renderer
//!
//! Prints the board, the call history and the countdown as plain text
//! with ANSI colors picked from the active theme.

use crate::config::Theme;
use crate::pool::{Category, Pool};
use crate::render::{Notice, Renderer};
use std::io::Write;
use tracing::warn;

const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// How many recent calls the history line shows
const HISTORY_LEN: usize = 10;

#[derive(Debug, Clone, Copy)]
struct Palette {
    called: &'static str,
    pending: &'static str,
    highlight: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                called: "\x1b[1;97m",
                pending: "\x1b[2;37m",
                highlight: "\x1b[1;30;103m",
            },
            Theme::Light => Self {
                called: "\x1b[1;30m",
                pending: "\x1b[37m",
                highlight: "\x1b[1;97;44m",
            },
        }
    }
}

pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    palette: Palette,
    last_drawn: Option<u8>,
    controls_enabled: bool,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            palette: Palette::for_theme(Theme::Light),
            last_drawn: None,
            controls_enabled: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}{}", CLEAR_LINE, text).and_then(|_| self.out.flush())
        {
            warn!("⚠️ Terminal write failed: {}", e);
        }
    }

    fn board_row(&self, category: Category, pool: &Pool, drawn: &[u8]) -> String {
        let cells: Vec<String> = category
            .range()
            .map(|n| {
                if !pool.contains(n) {
                    "  ".to_string()
                } else if Some(n) == self.last_drawn && drawn.contains(&n) {
                    format!("{}{:>2}{}", self.palette.highlight, n, RESET)
                } else if drawn.contains(&n) {
                    format!("{}{:>2}{}", self.palette.called, n, RESET)
                } else {
                    format!("{}{:>2}{}", self.palette.pending, n, RESET)
                }
            })
            .collect();
        format!(" {} │ {}", category, cells.join(" "))
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn show_current_draw(&mut self, number: u8, category: Option<Category>) {
        self.last_drawn = Some(number);
        let label = category.map(|c| c.label()).unwrap_or("");
        let line = format!(
            "[{}] 🎱 {}{} {}{}",
            chrono::Local::now().format("%H:%M:%S"),
            self.palette.highlight,
            label,
            number,
            RESET
        );
        self.emit(&line);
    }

    fn refresh_board(&mut self, pool: &Pool, drawn: &[u8]) {
        if drawn.is_empty() {
            self.last_drawn = None;
        }
        let rows: Vec<String> = Category::all()
            .into_iter()
            .map(|c| self.board_row(c, pool, drawn))
            .collect();
        let remaining = pool.numbers().iter().filter(|n| !drawn.contains(n)).count();
        self.emit(&format!("{}\n   remaining: {}", rows.join("\n"), remaining));
    }

    fn refresh_history(&mut self, drawn: &[u8]) {
        if drawn.is_empty() {
            return;
        }
        let recent: Vec<String> = drawn
            .iter()
            .rev()
            .take(HISTORY_LEN)
            .map(|n| match Category::of(*n) {
                Some(c) => format!("{}{}", c, n),
                None => n.to_string(),
            })
            .collect();
        self.emit(&format!("   recent: {}", recent.join(" ")));
    }

    fn set_countdown_display(&mut self, value: Option<u32>) {
        let text = match value {
            Some(secs) => format!("⏱  next in {}s", secs),
            None => "⏱  —".to_string(),
        };
        // Overwritten in place by the next tick
        if let Err(e) = write!(self.out, "{}{}", CLEAR_LINE, text).and_then(|_| self.out.flush()) {
            warn!("⚠️ Terminal write failed: {}", e);
        }
    }

    fn set_controls_enabled(&mut self, can_start: bool) {
        if can_start != self.controls_enabled {
            self.controls_enabled = can_start;
            if !can_start {
                self.emit("   (start disabled; reset or change columns to play again)");
            }
        }
    }

    fn notify(&mut self, notice: Notice) {
        let text = match notice {
            Notice::NoCategoriesEnabled => {
                "⚠️  No columns selected, calling from all of B I N G O".to_string()
            }
            Notice::NoVoice => "⚠️  No voice available, numbers will not be spoken".to_string(),
            Notice::UnknownVoice(id) => format!("⚠️  Unknown voice '{}' (try 'voices')", id),
            Notice::Voices {
                available,
                selected,
            } => {
                if available.is_empty() {
                    "No voices available".to_string()
                } else {
                    available
                        .iter()
                        .map(|v| {
                            let mark = if selected.as_deref() == Some(v.id.as_str()) {
                                "*"
                            } else {
                                " "
                            };
                            format!(" {} {:<12} {:<8} {}", mark, v.id, v.lang, v.name)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Notice::Status(status) => format!(
                "{:?}: {} called, {} left, next in {}s (interval {}s)\n\
                 columns: {}  rate {:.2}  pitch {:.2}  repeat {}  voice {}",
                status.state,
                status.drawn,
                status.remaining,
                status.countdown,
                status.interval_secs,
                status
                    .enabled
                    .iter()
                    .map(|c| c.label())
                    .collect::<Vec<_>>()
                    .join(" "),
                status.rate,
                status.pitch,
                status.repeat_mode.id(),
                status.voice.as_deref().unwrap_or("none"),
            ),
            Notice::PausedForSettings => "⏸️  Interval changed, game paused".to_string(),
            Notice::Finished { drawn } => format!("🏁 All {} numbers called", drawn),
        };
        self.emit(&text);
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.palette = Palette::for_theme(theme);
    }
}

/// Guess the terminal background from `COLORFGBG` ("15;0" is light text on
/// a dark background)
pub fn system_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map(|bg| bg < 7 || bg == 8)
        .unwrap_or(false)
}
