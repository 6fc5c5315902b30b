//! Speechd-ng narrator using D-Bus

use super::{Narrator, SpeechOutcome, VoiceInfo, VoiceSettings};
use crate::error::{CallerError, CallerResult};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use zbus::{proxy, Connection};

/// Identifier of the service's own default voice
pub const DEFAULT_VOICE: &str = "default";

#[proxy(
    interface = "org.speech.Service",
    default_service = "org.speech.Service",
    default_path = "/org/speech/Service"
)]
trait SpeechService {
    /// Speak text using default voice
    fn speak(&self, text: &str) -> zbus::Result<()>;

    /// Speak text using specific voice
    fn speak_voice(&self, text: &str, voice: &str) -> zbus::Result<()>;

    /// Ping the service
    fn ping(&self) -> zbus::Result<String>;
}

pub struct SpeechdNarrator {
    proxy: SpeechServiceProxy<'static>,
}

impl std::fmt::Debug for SpeechdNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechdNarrator").finish()
    }
}

impl SpeechdNarrator {
    pub async fn connect() -> CallerResult<Self> {
        let connection = Connection::session()
            .await
            .map_err(|e| CallerError::Narration(format!("session bus: {}", e)))?;
        let proxy = SpeechServiceProxy::new(&connection)
            .await
            .map_err(|e| CallerError::Narration(e.to_string()))?;

        match proxy.ping().await {
            Ok(response) => {
                info!("🔊 Connected to speechd-ng: {}", response);
            }
            Err(e) => {
                warn!("⚠️ speechd-ng not responding: {}", e);
                return Err(CallerError::Narration(format!(
                    "speechd-ng not responding: {}",
                    e
                )));
            }
        }

        Ok(Self { proxy })
    }
}

#[async_trait]
impl Narrator for SpeechdNarrator {
    async fn speak(&self, phrase: &str, voice: &VoiceSettings) -> SpeechOutcome {
        // The service exposes no rate or pitch controls
        debug!(
            "speechd-ng speaking '{}' (rate {} and pitch {} ignored)",
            phrase, voice.rate, voice.pitch
        );

        let result = if voice.voice.id == DEFAULT_VOICE {
            self.proxy.speak(phrase).await
        } else {
            self.proxy.speak_voice(phrase, &voice.voice.id).await
        };

        match result {
            Ok(()) => SpeechOutcome::Ended,
            Err(e) => SpeechOutcome::Failed(e.to_string()),
        }
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            id: DEFAULT_VOICE.to_string(),
            name: "speechd-ng default".to_string(),
            lang: String::new(),
        }]
    }

    fn name(&self) -> &str {
        "speechd_ng"
    }
}
