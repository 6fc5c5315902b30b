//! System narrator backed by the `espeak-ng` binary

use super::{Narrator, SpeechOutcome, VoiceInfo, VoiceSettings};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

const PROGRAM: &str = "espeak-ng";

/// espeak-ng speaks 175 words per minute at rate 1.0
const BASE_WPM: f32 = 175.0;

/// espeak-ng pitch scale is 0-99 with 50 as neutral
const BASE_PITCH: f32 = 50.0;

#[derive(Debug)]
pub struct SystemNarrator {
    program: String,
}

impl Default for SystemNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemNarrator {
    pub fn new() -> Self {
        Self {
            program: PROGRAM.to_string(),
        }
    }

    /// Command-line arguments for one utterance
    pub fn args(phrase: &str, voice: &VoiceSettings) -> Vec<String> {
        let wpm = (voice.rate * BASE_WPM).clamp(80.0, 450.0).round() as u32;
        let pitch = (voice.pitch * BASE_PITCH).clamp(0.0, 99.0).round() as u32;
        vec![
            "-v".to_string(),
            voice.voice.id.clone(),
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            phrase.to_string(),
        ]
    }
}

#[async_trait]
impl Narrator for SystemNarrator {
    async fn speak(&self, phrase: &str, voice: &VoiceSettings) -> SpeechOutcome {
        debug!("System speaking: {}", phrase);

        // Dropping the future (announcement cancelled) kills the process
        let status = Command::new(&self.program)
            .args(Self::args(phrase, voice))
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => SpeechOutcome::Ended,
            Ok(status) => SpeechOutcome::Failed(format!("{} exited with {}", self.program, status)),
            Err(e) => SpeechOutcome::Failed(format!("failed to run {}: {}", self.program, e)),
        }
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        match Command::new(&self.program).arg("--voices").output().await {
            Ok(output) if output.status.success() => {
                parse_voice_list(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!("⚠️ {} --voices exited with {}", self.program, output.status);
                Vec::new()
            }
            Err(e) => {
                warn!("⚠️ Could not list voices with {}: {}", self.program, e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  es              --/M      Spanish_(Spain)    roa/es
/// ```
///
/// The language column doubles as the voice id for `-v`.
pub fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 4 {
                return None;
            }
            Some(VoiceInfo {
                id: columns[1].to_string(),
                name: columns[3].replace('_', " "),
                lang: columns[1].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  en-gb           --/M      English_(Great_Britain) gmw/en
 5  es              --/M      Spanish_(Spain)    roa/es
 5  es-419          --/M      Spanish_(Latin_America) roa/es-419
";

    #[test]
    fn test_parse_voice_list() {
        let voices = parse_voice_list(SAMPLE);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].id, "es");
        assert_eq!(voices[1].name, "Spanish (Spain)");
        assert_eq!(voices[2].lang, "es-419");
    }

    #[test]
    fn test_args_scale_rate_and_pitch() {
        let voice = VoiceSettings {
            voice: VoiceInfo {
                id: "es".into(),
                name: "Spanish".into(),
                lang: "es".into(),
            },
            rate: 2.0,
            pitch: 0.5,
        };
        let args = SystemNarrator::args("B 7", &voice);
        assert_eq!(args, vec!["-v", "es", "-s", "350", "-p", "25", "B 7"]);
    }
}
