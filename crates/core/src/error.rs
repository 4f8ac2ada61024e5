use std::fmt;

/// Request-level failures reported back to the caller. Never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendError {
    InvalidInput { field: &'static str, detail: String },
}

impl RecommendError {
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for RecommendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, detail } => write!(f, "invalid {field}: {detail}"),
        }
    }
}

impl std::error::Error for RecommendError {}

/// Failure while evaluating a single card. The engine skips the card and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    MissingFallback { card_id: String },
    InvalidRate { card_id: String, rate: f64 },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFallback { card_id } => {
                write!(f, "card {card_id} has no \"other\" reward rule to fall back on")
            }
            Self::InvalidRate { card_id, rate } => {
                write!(f, "card {card_id} resolved to an invalid rate ({rate})")
            }
        }
    }
}

impl std::error::Error for ResolveError {}
