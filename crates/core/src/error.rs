use std::fmt;

/// Upstream listing fetch failed: transport, HTTP status, or body decoding.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub source_name: &'static str,
    pub stage: &'static str,
    pub detail: String,
}

impl FetchError {
    pub fn new(source_name: &'static str, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            source_name,
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listing fetch failed (source={}, stage={}): {}",
            self.source_name, self.stage, self.detail
        )
    }
}

impl std::error::Error for FetchError {}

/// An explicitly supplied target date is not `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateFormat {
    pub input: String,
    pub reason: String,
}

impl fmt::Display for InvalidDateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid date {:?} (expected YYYY-MM-DD): {}",
            self.input, self.reason
        )
    }
}

impl std::error::Error for InvalidDateFormat {}
