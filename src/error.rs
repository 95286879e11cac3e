use thiserror::Error;

/// Failures a generation or refinement call can resolve to. The session
/// controller turns these into user-facing error strings; none of them is
/// fatal at the application level.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The remote response contained no usable inline image data, e.g. the
    /// model refused the request or replied with text only.
    #[error("No image generated. The model might have refused the request or generated text only.")]
    NoImageGenerated,

    /// The stored result is not in the expected `data:<mime>;base64,<payload>`
    /// form. Refinement cannot proceed for this call.
    #[error("Invalid image data format for refinement: {0}")]
    MalformedImage(String),

    /// The remote call itself failed (network, auth, quota).
    #[error("{0}")]
    Transport(String),
}
