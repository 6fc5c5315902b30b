//! Mock Narrator for Testing
//!
//! Records every phrase with the virtual time it started.

use async_trait::async_trait;
use bingo_caller::narration::{Narrator, SpeechOutcome, VoiceInfo, VoiceSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How long each mock utterance takes
pub const SPEAK_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct MockNarrator {
    /// All phrases that were "spoken", with their start time
    pub spoken: Arc<Mutex<Vec<(String, Instant)>>>,
    /// Simulate failure on every speak
    pub should_fail: Arc<Mutex<bool>>,
    pub cancels: AtomicUsize,
}

impl MockNarrator {
    pub fn new() -> Self {
        Self {
            spoken: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn voice_list(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo {
                id: "en-test".to_string(),
                name: "English Test".to_string(),
                lang: "en-GB".to_string(),
            },
            VoiceInfo {
                id: "es-test".to_string(),
                name: "Spanish Test".to_string(),
                lang: "es-ES".to_string(),
            },
            VoiceInfo {
                id: "es-alt".to_string(),
                name: "Spanish Alt".to_string(),
                lang: "es-419".to_string(),
            },
        ]
    }

    /// Get all spoken phrases
    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(phrase, _)| phrase.clone())
            .collect()
    }

    pub fn timeline(&self) -> Vec<(String, Instant)> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn speak(&self, phrase: &str, _voice: &VoiceSettings) -> SpeechOutcome {
        self.spoken
            .lock()
            .unwrap()
            .push((phrase.to_string(), Instant::now()));
        tokio::time::sleep(SPEAK_DURATION).await;

        if *self.should_fail.lock().unwrap() {
            return SpeechOutcome::Failed("Mock narrator failure".to_string());
        }
        SpeechOutcome::Ended
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        self.voice_list()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
