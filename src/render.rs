//! Display boundary
//!
//! The session reports everything the user should see through a
//! [`Renderer`]; how it is drawn is up to the implementation.

use crate::config::Theme;
use crate::narration::{RepeatMode, VoiceInfo};
use crate::pool::{Category, Pool};
use crate::session::SessionState;

/// Snapshot of the session for status displays
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub drawn: usize,
    pub remaining: usize,
    pub countdown: u32,
    pub interval_secs: u32,
    pub rate: f32,
    pub pitch: f32,
    pub repeat_mode: RepeatMode,
    pub enabled: Vec<Category>,
    pub voice: Option<String>,
}

/// Messages for the user that are not part of the board itself
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// No category is enabled; the full range is used instead
    NoCategoriesEnabled,
    /// Announcements are skipped because no voice is available
    NoVoice,
    UnknownVoice(String),
    Voices {
        available: Vec<VoiceInfo>,
        selected: Option<String>,
    },
    Status(SessionStatus),
    /// The interval changed while running, so the session was paused
    PausedForSettings,
    Finished {
        drawn: usize,
    },
}

/// Output side of the caller
pub trait Renderer: Send {
    /// Show the number that was just drawn
    fn show_current_draw(&mut self, number: u8, category: Option<Category>);

    /// Redraw the board, marking drawn numbers
    fn refresh_board(&mut self, pool: &Pool, drawn: &[u8]);

    /// Redraw the call history; `drawn` is oldest first
    fn refresh_history(&mut self, drawn: &[u8]);

    /// `None` clears the countdown ("—")
    fn set_countdown_display(&mut self, value: Option<u32>);

    fn set_controls_enabled(&mut self, can_start: bool);

    fn notify(&mut self, notice: Notice);

    fn apply_theme(&mut self, _theme: Theme) {}
}
