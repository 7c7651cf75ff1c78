use serde::{Deserialize, Serialize};

/// One convertible-bond issue from the upstream listing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondListing {
    pub security_code: String,
    pub security_name: String,
    pub subscription_code: Option<String>,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    pub subscription_start_date: Option<String>,
}

impl BondListing {
    /// Date portion of the subscription start, if present.
    pub fn subscription_date(&self) -> Option<&str> {
        let raw = self.subscription_start_date.as_deref()?.trim();
        let date = raw.split(' ').next().unwrap_or(raw);
        (!date.is_empty()).then_some(date)
    }

    pub fn subscription_code(&self) -> Option<&str> {
        self.subscription_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
