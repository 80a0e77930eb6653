use serde::{Deserialize, Serialize};

/// Dominant content type inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// More than the configured share of sampled values are numbers
    Numeric,
    /// More than the configured share of sampled values parse as dates
    Date,
    /// Anything else with at least one sampled value
    Text,
    /// The column exists but every value is null
    Empty,
    /// The column does not exist or the dataset has no rows
    Unknown,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Date => write!(f, "date"),
            Self::Text => write!(f, "text"),
            Self::Empty => write!(f, "empty"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Textual value pattern detected while profiling a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePattern {
    /// Text made only of digits, e.g. `"004512"`
    DigitsOnly,
    /// Text containing `/` or `-`, e.g. `"2024-01-31"`
    DateLike,
    /// Digits once `.` and `,` are removed, e.g. `"1.234,50"`
    DecimalLike,
}

impl std::fmt::Display for ValuePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DigitsOnly => write!(f, "digits_only"),
            Self::DateLike => write!(f, "date_like"),
            Self::DecimalLike => write!(f, "decimal_like"),
        }
    }
}

/// Which side of a comparison a column or dataset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}
