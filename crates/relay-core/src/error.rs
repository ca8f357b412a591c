// decode errors - none of these ever reach the relay as a failure,
// the decoder turns every one of them into a pass-through

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// line does not belong to any rule of the dialect
    #[error("no {vendor} dialect rule matched")]
    NoDialectMatch { vendor: &'static str },

    /// discriminator present but the key=value scan found nothing
    #[error("{vendor} discriminator present but no fields could be extracted")]
    ExtractionEmpty { vendor: &'static str },

    #[error("failed to serialize {vendor} envelope: {source}")]
    Serialize {
        vendor: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Raised while building a dialect, never while decoding.
#[derive(Error, Debug)]
#[error("invalid pattern for rule '{rule}': {source}")]
pub struct PatternError {
    pub rule: String,
    #[source]
    pub source: regex::Error,
}
