//! Session core of an AI professional-headshot studio: prompt construction
//! from a fixed settings model, a Gemini image-editing client, a bounded
//! upload history, and the state machine driving generation and chat-based
//! refinement. The embedding surface drives everything through
//! [`SessionController`] method calls.

pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod llm;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod utils;

pub use error::GenerationError;
pub use llm::{GeminiClient, ImageBackend, SourceImage};
pub use session::{ChatMessage, ChatRole, GeneratedHeadshot, SessionController, SessionPhase};
pub use settings::{BackgroundStyle, ClothingStyle, HeadshotSettings, LightingStyle};
