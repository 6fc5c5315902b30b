//! Narration Module
//!
//! Announces drawn numbers through a pluggable [`Narrator`] backend. The
//! [`NarrationSequencer`] keeps at most one announcement in flight and
//! chains the optional repetition after the primary call.

use crate::pool::Category;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod phrases;
pub mod speechd;
pub mod system;

pub use phrases::{spell_digits, NarrationPlan, RepeatMode};

/// A voice offered by a narrator backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Backend-specific identifier, persisted in settings
    pub id: String,
    pub name: String,
    /// BCP 47-ish language tag ("es", "es-419", "en-GB")
    pub lang: String,
}

/// Voice parameters applied to every phrase of an announcement
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice: VoiceInfo,
    pub rate: f32,
    pub pitch: f32,
}

/// Everything the sequencer needs to know about how to speak
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationSettings {
    /// Resolved voice; `None` means nothing is spoken
    pub voice: Option<VoiceInfo>,
    pub rate: f32,
    pub pitch: f32,
    pub repeat_mode: RepeatMode,
}

/// How a single utterance finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Ended,
    /// Cut short by a newer announcement or a pause
    Interrupted,
    Failed(String),
}

/// Trait for speech backends
#[async_trait]
pub trait Narrator: Send + Sync + std::fmt::Debug {
    /// Speak one phrase and wait until it is done
    async fn speak(&self, phrase: &str, voice: &VoiceSettings) -> SpeechOutcome;

    /// Stop whatever is currently being spoken
    fn cancel(&self) {}

    /// Voices this backend can speak with
    async fn voices(&self) -> Vec<VoiceInfo>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Speak `plan` to completion: primary first, then the repetition after
/// its pause, but only if the primary ended normally
pub async fn run_sequence(
    narrator: &dyn Narrator,
    plan: &NarrationPlan,
    voice: &VoiceSettings,
) -> SpeechOutcome {
    match narrator.speak(&plan.primary, voice).await {
        SpeechOutcome::Ended => {}
        other => return other,
    }

    let Some(secondary) = &plan.secondary else {
        return SpeechOutcome::Ended;
    };

    tokio::time::sleep(plan.pause).await;
    narrator.speak(secondary, voice).await
}

/// Keeps at most one announcement running
#[derive(Debug)]
pub struct NarrationSequencer {
    narrator: Arc<dyn Narrator>,
    active: Option<JoinHandle<SpeechOutcome>>,
}

impl NarrationSequencer {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self {
            narrator,
            active: None,
        }
    }

    /// Announce a number, replacing any announcement still in progress
    pub fn speak(&mut self, number: u8, category: Option<Category>, settings: &NarrationSettings) {
        self.cancel();

        let Some(voice) = settings.voice.clone() else {
            warn!("⚠️ No voice selected, skipping announcement of {}", number);
            return;
        };

        let plan = NarrationPlan::build(number, category, settings.repeat_mode);
        let voice = VoiceSettings {
            voice,
            rate: settings.rate,
            pitch: settings.pitch,
        };
        let narrator = self.narrator.clone();

        debug!("Announcing {:?}", plan);
        self.active = Some(tokio::spawn(async move {
            let outcome = run_sequence(narrator.as_ref(), &plan, &voice).await;
            match &outcome {
                SpeechOutcome::Ended => debug!("Announcement '{}' finished", plan.primary),
                SpeechOutcome::Interrupted => {
                    debug!("Announcement '{}' interrupted", plan.primary)
                }
                SpeechOutcome::Failed(reason) => {
                    warn!("⚠️ Announcement '{}' failed: {}", plan.primary, reason)
                }
            }
            outcome
        }));
    }

    /// Stop the running announcement, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.is_finished() {
                active.abort();
                self.narrator.cancel();
                debug!("Announcement cancelled");
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.is_finished())
    }

    /// Wait for the current announcement. Used by shutdown and tests.
    pub async fn finish(&mut self) -> Option<SpeechOutcome> {
        let active = self.active.take()?;
        match active.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => Some(SpeechOutcome::Interrupted),
            Err(e) => Some(SpeechOutcome::Failed(e.to_string())),
        }
    }
}

impl Drop for NarrationSequencer {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.abort();
        }
    }
}

/// Pick the voice to announce with.
///
/// Spanish voices are preferred when any exist. A saved voice is kept if it
/// is still among the candidates, otherwise the first candidate wins.
pub fn select_voice(available: &[VoiceInfo], saved: Option<&str>) -> Option<VoiceInfo> {
    let candidates = voice_candidates(available);
    saved
        .and_then(|id| candidates.iter().find(|v| v.id == id))
        .or_else(|| candidates.first())
        .map(|v| (*v).clone())
}

/// The voices offered for selection: the Spanish ones, or every voice
/// when there is no Spanish voice at all
pub fn voice_candidates(available: &[VoiceInfo]) -> Vec<&VoiceInfo> {
    let spanish: Vec<&VoiceInfo> = available
        .iter()
        .filter(|v| v.lang.to_lowercase().starts_with("es"))
        .collect();
    if spanish.is_empty() {
        available.iter().collect()
    } else {
        spanish
    }
}

/// Backend that never makes a sound and offers no voices
#[derive(Debug, Default)]
pub struct SilentNarrator;

#[async_trait]
impl Narrator for SilentNarrator {
    async fn speak(&self, phrase: &str, _voice: &VoiceSettings) -> SpeechOutcome {
        debug!("(silent) {}", phrase);
        SpeechOutcome::Ended
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Factory to create the requested narrator backend
pub async fn create_narrator(kind: &str) -> Arc<dyn Narrator> {
    info!("🛠️ Creating narrator: {}", kind);
    let narrator: Arc<dyn Narrator> = match kind {
        "speechd_ng" | "speechd" => match speechd::SpeechdNarrator::connect().await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("⚠️ speechd-ng unavailable ({}), falling back to system", e);
                Arc::new(system::SystemNarrator::new())
            }
        },
        "silent" | "none" => Arc::new(SilentNarrator),
        "system" | "espeak" => Arc::new(system::SystemNarrator::new()),
        _ => {
            warn!("  - Unknown narrator '{}', falling back to system", kind);
            Arc::new(system::SystemNarrator::new())
        }
    };
    info!("✅ Narrator '{}' initialized", narrator.name());
    narrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records phrases with the time they started
    #[derive(Debug, Default)]
    struct Recorder {
        spoken: Mutex<Vec<(String, tokio::time::Instant)>>,
        primary_outcome: Mutex<Option<SpeechOutcome>>,
    }

    #[async_trait]
    impl Narrator for Recorder {
        async fn speak(&self, phrase: &str, _voice: &VoiceSettings) -> SpeechOutcome {
            self.spoken
                .lock()
                .unwrap()
                .push((phrase.to_string(), tokio::time::Instant::now()));
            tokio::time::sleep(Duration::from_millis(600)).await;
            self.primary_outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or(SpeechOutcome::Ended)
        }

        async fn voices(&self) -> Vec<VoiceInfo> {
            vec![voice("es-1", "es-ES")]
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    fn voice(id: &str, lang: &str) -> VoiceInfo {
        VoiceInfo {
            id: id.to_string(),
            name: id.to_string(),
            lang: lang.to_string(),
        }
    }

    fn settings(repeat_mode: RepeatMode) -> NarrationSettings {
        NarrationSettings {
            voice: Some(voice("es-1", "es-ES")),
            rate: 1.0,
            pitch: 1.0,
            repeat_mode,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_secondary_follows_after_long_pause() {
        let recorder = Arc::new(Recorder::default());
        let mut sequencer = NarrationSequencer::new(recorder.clone());

        sequencer.speak(7, Some(Category::B), &settings(RepeatMode::SpellDigits));
        assert_eq!(sequencer.finish().await, Some(SpeechOutcome::Ended));

        let spoken = recorder.spoken.lock().unwrap().clone();
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[0].0, "B 7");
        assert_eq!(spoken[1].0, "siete");
        // 600ms of speech plus the single-digit pause
        assert_eq!(spoken[1].1 - spoken[0].1, Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_primary_skips_secondary() {
        let recorder = Arc::new(Recorder::default());
        *recorder.primary_outcome.lock().unwrap() = Some(SpeechOutcome::Failed("busy".into()));
        let mut sequencer = NarrationSequencer::new(recorder.clone());

        sequencer.speak(23, Some(Category::I), &settings(RepeatMode::RepeatNumber));
        assert_eq!(
            sequencer.finish().await,
            Some(SpeechOutcome::Failed("busy".into()))
        );
        assert_eq!(recorder.spoken.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_announcement_interrupts_previous() {
        let recorder = Arc::new(Recorder::default());
        let mut sequencer = NarrationSequencer::new(recorder.clone());

        sequencer.speak(23, Some(Category::I), &settings(RepeatMode::SpellDigits));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sequencer.is_speaking());

        sequencer.speak(64, Some(Category::O), &settings(RepeatMode::Off));
        assert_eq!(sequencer.finish().await, Some(SpeechOutcome::Ended));

        let phrases: Vec<String> = recorder
            .spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect();
        assert_eq!(phrases, vec!["I 23", "O 64"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_voice_speaks_nothing() {
        let recorder = Arc::new(Recorder::default());
        let mut sequencer = NarrationSequencer::new(recorder.clone());
        let mut quiet = settings(RepeatMode::SpellDigits);
        quiet.voice = None;

        sequencer.speak(5, Some(Category::B), &quiet);
        assert_eq!(sequencer.finish().await, None);
        assert!(recorder.spoken.lock().unwrap().is_empty());

        sequencer.cancel();
        sequencer.cancel();
    }

    #[test]
    fn test_select_voice_prefers_spanish() {
        let voices = vec![
            voice("en-1", "en-GB"),
            voice("es-1", "es-ES"),
            voice("es-2", "es-419"),
        ];

        assert_eq!(select_voice(&voices, None).unwrap().id, "es-1");
        assert_eq!(select_voice(&voices, Some("es-2")).unwrap().id, "es-2");
        // Saved voice filtered out by the Spanish preference
        assert_eq!(select_voice(&voices, Some("en-1")).unwrap().id, "es-1");
        assert_eq!(select_voice(&[], Some("es-1")), None);

        let ids: Vec<&str> = voice_candidates(&voices).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["es-1", "es-2"]);

        let english = vec![voice("en-1", "en-GB"), voice("en-2", "en-US")];
        assert_eq!(voice_candidates(&english).len(), 2);
        assert_eq!(select_voice(&english, Some("en-2")).unwrap().id, "en-2");
    }
}
