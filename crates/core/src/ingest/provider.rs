use crate::config::Settings;
use crate::domain::listing::BondListing;
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

const SOURCE_NAME: &str = "eastmoney";
const DEFAULT_BASE_URL: &str = "https://datacenter-web.eastmoney.com";
const LIST_PATH: &str = "/api/data/v1/get";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REPORT_NAME: &str = "RPT_BOND_CB_LIST";
const COLUMNS: &str = "SECURITY_CODE,SECURITY_NAME_ABBR,PUBLIC_START_DATE,CORRECODE";
const SORT_COLUMNS: &str = "PUBLIC_START_DATE,SECURITY_CODE";
const SORT_TYPES: &str = "-1,-1";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_PAGE_SIZE: u32 = 500;
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Produces one page of bond listings in upstream sort order.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_listings(&self, page_size: u32, page_number: u32) -> Result<Vec<BondListing>>;
}

#[derive(Debug, Clone)]
pub struct EastmoneyClient {
    http: reqwest::Client,
    base_url: String,
}

impl EastmoneyClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .eastmoney_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            settings
                .eastmoney_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        Self::new(base_url, timeout)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build eastmoney http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), LIST_PATH)
    }
}

#[async_trait::async_trait]
impl ListingSource for EastmoneyClient {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_listings(&self, page_size: u32, page_number: u32) -> Result<Vec<BondListing>> {
        let params = [
            ("reportName", REPORT_NAME.to_string()),
            ("columns", COLUMNS.to_string()),
            ("pageSize", page_size.to_string()),
            ("pageNumber", page_number.to_string()),
            ("sortColumns", SORT_COLUMNS.to_string()),
            ("sortTypes", SORT_TYPES.to_string()),
            ("source", "WEB".to_string()),
            ("client", "WEB".to_string()),
        ];

        let res = self
            .http
            .get(self.url())
            .query(&params)
            .send()
            .await
            .map_err(|err| FetchError::new(SOURCE_NAME, "http", err.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| FetchError::new(SOURCE_NAME, "body", err.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::new(
                SOURCE_NAME,
                "http",
                format!("HTTP {status}: {}", snippet(&text)),
            )
            .into());
        }

        let raw = serde_json::from_str::<Value>(&text).map_err(|err| {
            FetchError::new(
                SOURCE_NAME,
                "decode",
                format!("{err}: {}", snippet(&text)),
            )
        })?;

        let listings = parse_listings(&raw);
        tracing::debug!(
            page_size,
            page_number,
            fetched = listings.len(),
            "eastmoney listing page received"
        );
        Ok(listings)
    }
}

/// Extracts `result.data`. A missing or null envelope means no records.
pub fn parse_listings(raw: &Value) -> Vec<BondListing> {
    let Some(records) = raw.pointer("/result/data").and_then(Value::as_array) else {
        if let Some(message) = raw.get("message").and_then(Value::as_str) {
            tracing::debug!(message, "eastmoney response carries no result.data");
        }
        return Vec::new();
    };

    records.iter().filter_map(record_to_listing).collect()
}

fn record_to_listing(record: &Value) -> Option<BondListing> {
    let security_code = field_str(record, "SECURITY_CODE")?;
    Some(BondListing {
        security_code,
        security_name: field_str(record, "SECURITY_NAME_ABBR").unwrap_or_default(),
        subscription_code: field_str(record, "CORRECODE"),
        subscription_start_date: field_str(record, "PUBLIC_START_DATE"),
    })
}

fn field_str(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn snippet(text: &str) -> String {
    const MAX_CHARS: usize = 300;
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CHARS).collect();
    out.push('…');
    out
}
