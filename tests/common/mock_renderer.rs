//! Mock Renderer and keep-awake lock for Testing

use bingo_caller::config::Theme;
use bingo_caller::error::{CallerError, CallerResult};
use bingo_caller::pool::{Category, Pool};
use bingo_caller::render::{Notice, Renderer};
use bingo_caller::wake_lock::WakeLock;
use std::sync::{Arc, Mutex};

/// One call made on the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Draw(u8, Option<Category>),
    Board { pool: Vec<u8>, drawn: Vec<u8> },
    History(Vec<u8>),
    Countdown(Option<u32>),
    Controls(bool),
    Notice(Notice),
    Theme(Theme),
}

/// Renderer that records every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    pub calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RenderCall::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn countdowns(&self) -> Vec<Option<u32>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RenderCall::Countdown(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn last_controls(&self) -> Option<bool> {
        self.calls().into_iter().rev().find_map(|c| match c {
            RenderCall::Controls(enabled) => Some(enabled),
            _ => None,
        })
    }

    pub fn draws(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RenderCall::Draw(n, _) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RenderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Renderer for MockRenderer {
    fn show_current_draw(&mut self, number: u8, category: Option<Category>) {
        self.record(RenderCall::Draw(number, category));
    }

    fn refresh_board(&mut self, pool: &Pool, drawn: &[u8]) {
        self.record(RenderCall::Board {
            pool: pool.numbers().to_vec(),
            drawn: drawn.to_vec(),
        });
    }

    fn refresh_history(&mut self, drawn: &[u8]) {
        self.record(RenderCall::History(drawn.to_vec()));
    }

    fn set_countdown_display(&mut self, value: Option<u32>) {
        self.record(RenderCall::Countdown(value));
    }

    fn set_controls_enabled(&mut self, can_start: bool) {
        self.record(RenderCall::Controls(can_start));
    }

    fn notify(&mut self, notice: Notice) {
        self.record(RenderCall::Notice(notice));
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.record(RenderCall::Theme(theme));
    }
}

/// Keep-awake lock that logs acquire/release. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockWakeLock {
    pub held: Arc<Mutex<bool>>,
    pub acquisitions: Arc<Mutex<usize>>,
    /// Simulate a platform without keep-awake support
    pub should_fail: Arc<Mutex<bool>>,
}

impl MockWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> bool {
        *self.held.lock().unwrap()
    }

    pub fn acquisitions(&self) -> usize {
        *self.acquisitions.lock().unwrap()
    }
}

impl WakeLock for MockWakeLock {
    fn acquire(&mut self) -> CallerResult<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(CallerError::WakeLock("not supported".to_string()));
        }
        let mut held = self.held.lock().unwrap();
        if !*held {
            *held = true;
            *self.acquisitions.lock().unwrap() += 1;
        }
        Ok(())
    }

    fn release(&mut self) -> CallerResult<()> {
        *self.held.lock().unwrap() = false;
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held()
    }
}
