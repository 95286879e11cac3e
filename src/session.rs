use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::gallery::{PreviewArena, PreviewHandle, UploadGallery};
use crate::llm::media::SourceImage;
use crate::llm::ImageBackend;
use crate::settings::HeadshotSettings;

/// Logical mode of the session. `Refining` is only ever entered from
/// `HasResult` and resolves back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    SourceSelected,
    Generating,
    HasResult,
    Refining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
}

/// The current result. Only the latest exists; each successful call replaces
/// the previous instance.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedHeadshot {
    pub data_uri: String,
    pub created_at: DateTime<Utc>,
}

const GENERATED_ACK: &str = "I have generated your professional headshot based on your settings. \
                             Let me know if you would like to make any adjustments!";
const REFINED_ACK: &str = "I've updated the headshot based on your feedback.";
const REFINE_APOLOGY: &str = "Sorry, I encountered an error while processing your request.";

#[derive(Debug)]
struct ActiveSource {
    image: Arc<SourceImage>,
    preview: PreviewHandle,
}

/// Owns the whole session state: active source image, current result, chat
/// transcript, settings, upload history and preview buffers. All mutation
/// goes through `&mut self` methods, so at most one generation or refinement
/// call is ever in flight and every await runs to completion before the next
/// command is accepted.
///
/// Failed calls never escape as errors; they resolve back to a stable phase
/// with a human-readable string in `last_error`.
pub struct SessionController {
    settings: HeadshotSettings,
    phase: SessionPhase,
    active: Option<ActiveSource>,
    result: Option<GeneratedHeadshot>,
    transcript: Vec<ChatMessage>,
    last_error: Option<String>,
    gallery: UploadGallery,
    previews: PreviewArena,
    next_message_id: u64,
}

impl Default for SessionController {
    fn default() -> Self {
        SessionController::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        SessionController {
            settings: HeadshotSettings::default(),
            phase: SessionPhase::Empty,
            active: None,
            result: None,
            transcript: Vec::new(),
            last_error: None,
            gallery: UploadGallery::new(),
            previews: PreviewArena::new(),
            next_message_id: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn settings(&self) -> &HeadshotSettings {
        &self.settings
    }

    /// Takes effect on the next generation call; an existing result is left
    /// untouched until regenerated.
    pub fn set_settings(&mut self, settings: HeadshotSettings) {
        self.settings = settings;
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.active.as_ref().map(|active| active.image.as_ref())
    }

    pub fn result(&self) -> Option<&GeneratedHeadshot> {
        self.result.as_ref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn gallery(&self) -> &UploadGallery {
        &self.gallery
    }

    pub fn active_preview_bytes(&self) -> Option<&[u8]> {
        let active = self.active.as_ref()?;
        self.previews.bytes(&active.preview)
    }

    /// Entry point for the file-selection capability. Builds a source image,
    /// records it in the history and makes it the active selection, clearing
    /// any prior result and transcript.
    pub fn select_source(
        &mut self,
        bytes: Vec<u8>,
        mime_type: Option<String>,
        name: impl Into<String>,
    ) {
        let image = Arc::new(SourceImage::new(bytes, mime_type, name));
        self.gallery.record(Arc::clone(&image), &mut self.previews);
        self.activate(image);
    }

    /// Re-activates a stored upload without reordering the history. Returns
    /// false on an unknown id, leaving the session untouched.
    pub fn select_from_history(&mut self, id: u64) -> bool {
        match self.gallery.get(id) {
            Some(image) => {
                self.activate(image);
                true
            }
            None => false,
        }
    }

    /// Evicts a history entry. The active image stays usable even when it is
    /// the one being removed. Unknown ids are a no-op.
    pub fn remove_from_history(&mut self, id: u64) -> bool {
        self.gallery.remove(id, &mut self.previews)
    }

    /// Drops the active image along with the result and transcript.
    pub fn clear_source(&mut self) {
        if let Some(previous) = self.active.take() {
            self.previews.release(previous.preview);
        }
        self.result = None;
        self.transcript.clear();
        self.last_error = None;
        self.phase = SessionPhase::Empty;
    }

    fn activate(&mut self, image: Arc<SourceImage>) {
        if let Some(previous) = self.active.take() {
            self.previews.release(previous.preview);
        }
        let preview = self.previews.acquire(Arc::clone(&image));
        self.active = Some(ActiveSource { image, preview });
        self.result = None;
        self.transcript.clear();
        self.last_error = None;
        self.phase = SessionPhase::SourceSelected;
    }

    fn push_message(&mut self, role: ChatRole, text: impl Into<String>) {
        self.next_message_id += 1;
        self.transcript.push(ChatMessage {
            id: self.next_message_id,
            role,
            text: text.into(),
        });
    }

    /// Runs a generation (or regeneration) against the active source with the
    /// current settings. Ignored unless a source is selected and no call is
    /// in flight.
    pub async fn generate<B: ImageBackend>(&mut self, backend: &B) {
        if !matches!(
            self.phase,
            SessionPhase::SourceSelected | SessionPhase::HasResult
        ) {
            return;
        }
        let Some(source) = self.active.as_ref().map(|active| Arc::clone(&active.image)) else {
            return;
        };

        self.phase = SessionPhase::Generating;
        self.last_error = None;
        self.transcript.clear();

        match backend.generate_headshot(&source, &self.settings).await {
            Ok(data_uri) => {
                info!(source = %source.name, "Headshot generated");
                self.result = Some(GeneratedHeadshot {
                    data_uri,
                    created_at: Utc::now(),
                });
                self.push_message(ChatRole::Assistant, GENERATED_ACK);
                self.phase = SessionPhase::HasResult;
            }
            Err(err) => {
                warn!(source = %source.name, "Headshot generation failed: {err}");
                self.last_error = Some(err.to_string());
                // A failed regenerate keeps the previous result.
                self.phase = if self.result.is_some() {
                    SessionPhase::HasResult
                } else {
                    SessionPhase::SourceSelected
                };
            }
        }
    }

    /// Submits a free-text refinement of the current result. The user message
    /// is appended before the call and never rolled back; a failure adds an
    /// assistant apology instead of undoing the transcript.
    pub async fn refine<B: ImageBackend>(&mut self, backend: &B, instruction: &str) {
        if self.phase != SessionPhase::HasResult {
            return;
        }
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return;
        }
        let Some(current) = self.result.as_ref().map(|result| result.data_uri.clone()) else {
            return;
        };

        self.push_message(ChatRole::User, instruction);
        self.phase = SessionPhase::Refining;
        self.last_error = None;

        match backend.refine_headshot(&current, instruction).await {
            Ok(data_uri) => {
                info!("Headshot refined");
                self.result = Some(GeneratedHeadshot {
                    data_uri,
                    created_at: Utc::now(),
                });
                self.push_message(ChatRole::Assistant, REFINED_ACK);
            }
            Err(err) => {
                warn!("Headshot refinement failed: {err}");
                self.last_error = Some(err.to_string());
                self.push_message(ChatRole::Assistant, REFINE_APOLOGY);
            }
        }
        self.phase = SessionPhase::HasResult;
    }
}
