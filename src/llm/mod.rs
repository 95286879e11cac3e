pub mod gemini;
pub mod media;

pub use gemini::GeminiClient;
pub use media::{decode_data_uri, encode_data_uri, SourceImage};

use crate::error::GenerationError;
use crate::settings::HeadshotSettings;

/// The remote generation capability as the session controller sees it:
/// given an image and an instruction, produce a new image or fail. Both
/// operations resolve to a self-contained `data:<mime>;base64,<payload>`
/// string, the canonical cross-call representation of a result.
#[allow(async_fn_in_trait)]
pub trait ImageBackend {
    async fn generate_headshot(
        &self,
        source: &SourceImage,
        settings: &HeadshotSettings,
    ) -> Result<String, GenerationError>;

    async fn refine_headshot(
        &self,
        current_data_uri: &str,
        instruction: &str,
    ) -> Result<String, GenerationError>;
}
