#![allow(dead_code)]

pub mod mock_narrator;
pub mod mock_renderer;

use bingo_caller::config::MemorySettingsStore;
use bingo_caller::session::{Session, SessionCommand, SessionEvent};
use mock_narrator::MockNarrator;
use mock_renderer::{MockRenderer, MockWakeLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::Instant;

/// Upper bound for any scenario; virtual time, so it costs nothing
const SCENARIO_LIMIT: Duration = Duration::from_secs(3600);

/// A session wired to mocks, driven by hand from a test
pub struct Harness {
    pub session: Session,
    pub events: UnboundedReceiver<SessionEvent>,
    pub renderer: MockRenderer,
    pub narrator: Arc<MockNarrator>,
    pub store: MemorySettingsStore,
}

impl Harness {
    /// Session with stored settings `raw`, a fixed seed and two voices
    pub fn new(raw: &str) -> Self {
        Self::build(raw, 7, None)
    }

    pub fn with_seed(raw: &str, seed: u64) -> Self {
        Self::build(raw, seed, None)
    }

    pub fn with_wake_lock(raw: &str, lock: MockWakeLock) -> Self {
        Self::build(raw, 7, Some(lock))
    }

    fn build(raw: &str, seed: u64, lock: Option<MockWakeLock>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let store = MemorySettingsStore::with_raw(raw);
        let renderer = MockRenderer::new();
        let narrator = Arc::new(MockNarrator::new());

        let mut session = Session::new(
            Box::new(store.clone()),
            Box::new(renderer.clone()),
            narrator.clone(),
            tx,
        )
        .with_seed(seed);
        if let Some(lock) = lock {
            session = session.with_wake_lock(Box::new(lock));
        }

        session.initialize();
        session.set_available_voices(narrator.voice_list());

        Self {
            session,
            events,
            renderer,
            narrator,
            store,
        }
    }

    pub fn command(&mut self, command: SessionCommand) -> bool {
        self.session.handle_command(command)
    }

    /// Feed timer events to the session until `done` holds
    pub async fn run_until(&mut self, mut done: impl FnMut(&Session) -> bool) {
        let session = &mut self.session;
        let events = &mut self.events;
        let reached = tokio::time::timeout(SCENARIO_LIMIT, async {
            while !done(&*session) {
                let event = events.recv().await.expect("event channel closed");
                session.handle_event(event);
            }
        })
        .await;
        assert!(reached.is_ok(), "condition not reached in {:?}", SCENARIO_LIMIT);
    }

    /// Feed timer events to the session for `period` of virtual time
    pub async fn run_for(&mut self, period: Duration) {
        let deadline = Instant::now() + period;
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        self.session.handle_event(event);
                    }
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
    }

    pub fn drawn(&self) -> Vec<u8> {
        self.session.draw_state().drawn().to_vec()
    }
}
