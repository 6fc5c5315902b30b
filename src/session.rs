//! Session Controller
//!
//! Owns the whole game: pool, draw state, countdown, narration and the
//! collaborators they report to. Every change of state goes through this
//! type, driven by [`SessionEvent`]s arriving on a single channel.

use crate::config::{Settings, SettingsStore, INTERVAL_RANGE, PITCH_RANGE, RATE_RANGE};
use crate::countdown::{Countdown, CountdownUpdate, TimerPulse};
use crate::draw::DrawState;
use crate::error::{CallerError, CallerResult};
use crate::narration::{
    select_voice, voice_candidates, NarrationSequencer, Narrator, RepeatMode, SpeechOutcome,
    VoiceInfo,
};
use crate::pool::{generate_pool, Category, Pool};
use crate::render::{Notice, Renderer, SessionStatus};
use crate::wake_lock::WakeLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing drawn yet, or freshly reset
    Idle,
    Running,
    /// Suspended mid-game; the countdown position is kept
    Paused,
    /// Every number in the pool has been called
    Finished,
}

/// User intents
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start,
    Pause,
    /// Start when stopped, pause when running
    Toggle,
    Reset,
    SetInterval(u32),
    SetCategory(Category, bool),
    ToggleCategory(Category),
    SetRate(f32),
    SetPitch(f32),
    SetVoice(String),
    SetRepeatMode(RepeatMode),
    ToggleTheme,
    ListVoices,
    Status,
    Quit,
}

/// Everything the session reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Command(SessionCommand),
    Timer(TimerPulse),
}

impl From<TimerPulse> for SessionEvent {
    fn from(pulse: TimerPulse) -> Self {
        SessionEvent::Timer(pulse)
    }
}

impl From<SessionCommand> for SessionEvent {
    fn from(command: SessionCommand) -> Self {
        SessionEvent::Command(command)
    }
}

pub struct Session {
    state: SessionState,
    settings: Settings,
    pool: Pool,
    draw: DrawState,
    countdown: Countdown<SessionEvent>,
    narration: NarrationSequencer,
    voices: Vec<VoiceInfo>,
    voice: Option<VoiceInfo>,
    renderer: Box<dyn Renderer>,
    store: Box<dyn SettingsStore>,
    wake_lock: Option<Box<dyn WakeLock>>,
    rng: StdRng,
    system_prefers_dark: bool,
}

impl Session {
    /// Create an idle session. Timer pulses are sent to `events`, which
    /// must feed back into [`Session::handle_event`].
    pub fn new(
        store: Box<dyn SettingsStore>,
        renderer: Box<dyn Renderer>,
        narrator: Arc<dyn Narrator>,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        let settings = store.load();
        let pool = generate_pool(&settings.categories);
        let draw = DrawState::reset(&pool);

        info!(
            "🎱 Session created: {} numbers, {}s interval, narrator '{}'",
            pool.len(),
            settings.interval_secs,
            narrator.name()
        );

        Self {
            state: SessionState::Idle,
            settings,
            pool,
            draw,
            countdown: Countdown::new(events),
            narration: NarrationSequencer::new(narrator),
            voices: Vec::new(),
            voice: None,
            renderer,
            store,
            wake_lock: None,
            rng: StdRng::from_entropy(),
            system_prefers_dark: false,
        }
    }

    /// Use a fixed seed so draws are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = Some(wake_lock);
        self
    }

    pub fn with_system_theme(mut self, prefers_dark: bool) -> Self {
        self.system_prefers_dark = prefers_dark;
        self
    }

    /// Paint the initial screen
    pub fn initialize(&mut self) {
        let theme = self.settings.effective_theme(self.system_prefers_dark);
        self.renderer.apply_theme(theme);
        self.reset();
    }

    /// Offer the voices the narrator reported and pick one
    pub fn set_available_voices(&mut self, voices: Vec<VoiceInfo>) {
        self.voice = select_voice(&voices, self.settings.voice.as_deref());
        self.voices = voices;

        match &self.voice {
            Some(voice) => info!("🗣️ Using voice {} ({})", voice.name, voice.lang),
            None => {
                warn!("⚠️ No voices available, numbers will not be announced");
                self.renderer.notify(Notice::NoVoice);
            }
        }
    }

    /// Process events until a quit command arrives
    pub async fn run(mut self, mut events: UnboundedReceiver<SessionEvent>) {
        info!("✅ Session ready");
        while let Some(event) = events.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
        self.shutdown();
    }

    /// Apply one event. Returns `false` once the session should stop.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Command(command) => self.handle_command(command),
            SessionEvent::Timer(pulse) => {
                self.on_timer(pulse);
                true
            }
        }
    }

    pub fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!("Command: {:?}", command);
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Toggle => self.toggle(),
            SessionCommand::Reset => self.reset(),
            SessionCommand::SetInterval(secs) => self.set_interval(secs),
            SessionCommand::SetCategory(category, enabled) => {
                self.set_category_enabled(category, enabled)
            }
            SessionCommand::ToggleCategory(category) => self.toggle_category(category),
            SessionCommand::SetRate(rate) => self.set_rate(rate),
            SessionCommand::SetPitch(pitch) => self.set_pitch(pitch),
            SessionCommand::SetVoice(id) => self.set_voice(&id),
            SessionCommand::SetRepeatMode(mode) => self.set_repeat_mode(mode),
            SessionCommand::ToggleTheme => self.toggle_theme(),
            SessionCommand::ListVoices => self.renderer.notify(Notice::Voices {
                available: voice_candidates(&self.voices)
                    .into_iter()
                    .cloned()
                    .collect(),
                selected: self.voice.as_ref().map(|v| v.id.clone()),
            }),
            SessionCommand::Status => {
                let status = self.status();
                self.renderer.notify(Notice::Status(status));
            }
            SessionCommand::Quit => return false,
        }
        true
    }

    /// Begin a new game or continue a paused one
    pub fn start(&mut self) {
        if self.state == SessionState::Running {
            debug!("Already running");
            return;
        }

        self.pool = generate_pool(&self.settings.categories);
        if self.pool.is_fallback() {
            self.renderer.notify(Notice::NoCategoriesEnabled);
        }
        if let Err(e) = self.ensure_pool() {
            warn!("⚠️ Cannot start: {}", e);
            self.renderer.notify(Notice::NoCategoriesEnabled);
            self.renderer.set_controls_enabled(false);
            return;
        }

        let fresh = self.draw.drawn().is_empty();
        if fresh {
            self.draw = DrawState::reset(&self.pool);
        } else {
            self.draw.resume(&self.pool);
        }
        self.refresh_views();

        if self.draw.is_exhausted() {
            self.finish();
            return;
        }

        self.state = SessionState::Running;
        self.renderer.set_controls_enabled(true);
        self.hold_awake();

        if fresh {
            info!("▶️ New game with {} numbers", self.pool.len());
            self.draw_next();
        } else {
            let ticks = self.countdown.ticks_left();
            info!("▶️ Resuming with {}s on the clock", ticks);
            self.countdown.resume(ticks);
            self.renderer.set_countdown_display(Some(ticks));
        }
    }

    /// Suspend a running game, keeping the countdown position
    pub fn pause(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        self.state = SessionState::Paused;
        self.countdown.cancel();
        self.narration.cancel();
        self.let_sleep();
        self.renderer.set_controls_enabled(true);
        info!("⏸️ Paused with {}s left", self.countdown.ticks_left());
    }

    pub fn toggle(&mut self) {
        if self.state == SessionState::Running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Back to Idle with a fresh pool and nothing drawn
    pub fn reset(&mut self) {
        self.countdown.clear();
        self.narration.cancel();
        self.let_sleep();

        self.pool = generate_pool(&self.settings.categories);
        if self.pool.is_fallback() {
            self.renderer.notify(Notice::NoCategoriesEnabled);
        }
        self.draw = DrawState::reset(&self.pool);
        self.state = SessionState::Idle;

        self.renderer.set_countdown_display(None);
        self.refresh_views();
        self.renderer.set_controls_enabled(!self.pool.is_empty());
        info!("🔄 Reset: {} numbers in the pool", self.pool.len());
    }

    /// Change the gap between draws. A running game is paused so the new
    /// value never cuts into a countdown already on screen.
    pub fn set_interval(&mut self, secs: u32) {
        let secs = secs.clamp(*INTERVAL_RANGE.start() as u32, *INTERVAL_RANGE.end() as u32);
        self.settings.interval_secs = secs;
        self.persist();

        if self.state == SessionState::Running {
            self.pause();
            self.renderer.notify(Notice::PausedForSettings);
        }
    }

    /// Enable or disable a category. The legal numbers change, so the
    /// game is reset.
    pub fn set_category_enabled(&mut self, category: Category, enabled: bool) {
        self.settings.categories.set(category, enabled);
        self.persist();
        self.reset();
    }

    pub fn toggle_category(&mut self, category: Category) {
        let enabled = !self.settings.categories.is_enabled(category);
        self.set_category_enabled(category, enabled);
    }

    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            return;
        }
        self.settings.rate = (rate as f64).clamp(*RATE_RANGE.start(), *RATE_RANGE.end()) as f32;
        self.persist();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        if !pitch.is_finite() {
            return;
        }
        self.settings.pitch =
            (pitch as f64).clamp(*PITCH_RANGE.start(), *PITCH_RANGE.end()) as f32;
        self.persist();
    }

    /// Choose among the offered voices only, so the saved id is the one
    /// restored on the next run
    pub fn set_voice(&mut self, id: &str) {
        let chosen = voice_candidates(&self.voices)
            .into_iter()
            .find(|v| v.id == id)
            .cloned();
        let Some(voice) = chosen else {
            warn!("⚠️ Unknown voice '{}'", id);
            self.renderer.notify(Notice::UnknownVoice(id.to_string()));
            return;
        };

        info!("🗣️ Voice changed to {} ({})", voice.name, voice.lang);
        self.settings.voice = Some(voice.id.clone());
        self.voice = Some(voice);
        self.persist();
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.settings.repeat_mode = mode;
        self.persist();
    }

    pub fn toggle_theme(&mut self) {
        let theme = self
            .settings
            .effective_theme(self.system_prefers_dark)
            .toggled();
        self.settings.theme = Some(theme);
        self.persist();
        self.renderer.apply_theme(theme);
    }

    /// Stop timers, speech and the keep-awake lock
    pub fn shutdown(&mut self) {
        self.countdown.clear();
        self.narration.cancel();
        self.let_sleep();
        info!("👋 Session closed after {} draws", self.draw.drawn().len());
    }

    /// Wait for the announcement in flight, if any
    pub async fn wait_for_narration(&mut self) -> Option<SpeechOutcome> {
        self.narration.finish().await
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draw_state(&self) -> &DrawState {
        &self.draw
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn countdown_ticks(&self) -> u32 {
        self.countdown.ticks_left()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_active()
    }

    pub fn selected_voice(&self) -> Option<&VoiceInfo> {
        self.voice.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            drawn: self.draw.drawn().len(),
            remaining: self.draw.remaining().len(),
            countdown: self.countdown.ticks_left(),
            interval_secs: self.settings.interval_secs,
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            repeat_mode: self.settings.repeat_mode,
            enabled: self.settings.categories.enabled(),
            voice: self.voice.as_ref().map(|v| v.id.clone()),
        }
    }

    fn on_timer(&mut self, pulse: TimerPulse) {
        if self.state != SessionState::Running {
            debug!("Timer pulse while {:?}, ignored", self.state);
            return;
        }

        match self.countdown.handle(pulse) {
            Some(CountdownUpdate::Remaining(ticks)) => {
                self.renderer.set_countdown_display(Some(ticks))
            }
            Some(CountdownUpdate::Expired) => {
                self.renderer.set_countdown_display(Some(0));
                self.draw_next();
            }
            None => {}
        }
    }

    /// Draw one number, show it, announce it and schedule the next
    fn draw_next(&mut self) {
        let number = match self.draw.draw(&mut self.rng) {
            Ok(number) => number,
            Err(e) => {
                debug!("Draw stopped: {}", e);
                self.finish();
                return;
            }
        };

        let category = Category::of(number);
        info!(
            "🎱 {} {} ({} left)",
            category.map(|c| c.label()).unwrap_or("?"),
            number,
            self.draw.remaining().len()
        );

        // State is fully updated before anyone sees or hears the number
        self.renderer.show_current_draw(number, category);
        self.refresh_views();
        let narration = self.settings.narration(self.voice.clone());
        self.narration.speak(number, category, &narration);

        if self.draw.is_exhausted() {
            self.finish();
        } else if self.state == SessionState::Running {
            let interval = self.settings.interval_secs;
            self.countdown.start(interval);
            self.renderer.set_countdown_display(Some(interval));
        }
    }

    /// Pool exhausted. The last announcement is left to finish.
    fn finish(&mut self) {
        self.state = SessionState::Finished;
        self.countdown.clear();
        self.let_sleep();
        self.renderer.set_countdown_display(None);
        self.renderer.set_controls_enabled(false);
        self.renderer.notify(Notice::Finished {
            drawn: self.draw.drawn().len(),
        });
        info!("🏁 All {} numbers called", self.draw.drawn().len());
    }

    fn ensure_pool(&self) -> CallerResult<()> {
        if self.pool.is_empty() {
            return Err(CallerError::NoCategories);
        }
        Ok(())
    }

    fn refresh_views(&mut self) {
        self.renderer.refresh_board(&self.pool, self.draw.drawn());
        self.renderer.refresh_history(self.draw.drawn());
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("⚠️ Could not save settings: {}", e);
        }
    }

    fn hold_awake(&mut self) {
        if let Some(lock) = self.wake_lock.as_mut() {
            if let Err(e) = lock.acquire() {
                warn!("⚠️ Keep-awake lock unavailable: {}", e);
            }
        }
    }

    fn let_sleep(&mut self) {
        if let Some(lock) = self.wake_lock.as_mut() {
            if let Err(e) = lock.release() {
                warn!("⚠️ Could not release keep-awake lock: {}", e);
            }
        }
    }
}
