//! Error type for media-type parsing and content negotiation.
//!
//! HTTP handlers translate these into responses through
//! [`AppError`](crate::handlers::AppError).

/// Failures raised while parsing media types or resolving a variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// A media-type token could not be parsed.
    #[error("invalid media type \"{input}\": {reason}")]
    Parse {
        /// The offending token, as supplied.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A default variant was requested from an empty variant set.
    #[error("no candidate variants to fall back on")]
    EmptyCandidates,

    /// More variants than precedence values.
    #[error("too many variants: {0}")]
    TooManyVariants(usize),

    /// Two variants in one set share a name.
    #[error("duplicate variant name: {0}")]
    DuplicateVariant(String),
}

impl NegotiationError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}
