use serde::{Deserialize, Serialize};

/// Key value of the single tracked counter record.
pub const COUNTER_ID: &str = "global";
pub const COUNTER_KEY_ATTRIBUTE: &str = "counter_id";
pub const COUNT_ATTRIBUTE: &str = "count";

/// Adds one to `count`, materializing a zero baseline when the attribute is absent.
pub const INCREMENT_UPDATE_EXPRESSION: &str = "SET #c = if_not_exists(#c, :zero) + :one";
pub const COUNT_NAME_PLACEHOLDER: &str = "#c";
pub const ZERO_VALUE_PLACEHOLDER: &str = ":zero";
pub const ONE_VALUE_PLACEHOLDER: &str = ":one";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountBody {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Store,
    Unhandled,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "DynamoDB error",
            Self::Unhandled => "Unhandled error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorBody {
    pub fn new(category: ErrorCategory, detail: impl Into<String>) -> Self {
        Self {
            error: category.as_str().to_string(),
            detail: detail.into(),
        }
    }
}

/// Parses a stored number into a counter value.
///
/// Stores may hand numbers back in decimal form (`"7.0"`), so an all-zero
/// fractional part is accepted. Negative and fractional values are rejected
/// rather than truncated, so a corrupted record surfaces as an error instead
/// of a silently rounded count.
pub fn parse_count(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|byte| byte == b'0') {
            return Err(format!("count '{raw}' must be a whole number"));
        }
    }

    if whole.is_empty() || !whole.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!("count '{raw}' must be a non-negative integer"));
    }

    whole
        .parse::<u64>()
        .map_err(|error| format!("count '{raw}' is out of range: {error}"))
}
