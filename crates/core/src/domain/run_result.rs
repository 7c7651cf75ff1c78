use crate::domain::listing::BondListing;
use serde::{Deserialize, Serialize};

/// Audit snapshot of one run. Written once, never read back by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub date: String,
    pub listings: Vec<BondListing>,
    pub message: String,
    pub count: usize,
    pub is_business_day: bool,
}

impl RunResult {
    pub fn new(
        date: String,
        listings: Vec<BondListing>,
        message: String,
        is_business_day: bool,
    ) -> Self {
        let count = listings.len();
        Self {
            date,
            listings,
            message,
            count,
            is_business_day,
        }
    }
}
