use crate::domain::run_result::RunResult;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// `bond_result.json` + `2026-01-16` -> `bond_result_2026-01-16.json`.
pub fn dated_path(base: &Path, date: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bond_result".to_string());
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}_{date}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{date}"),
    };
    base.with_file_name(file_name)
}

/// Writes the run snapshot as indented UTF-8 JSON, creating parent directories.
pub fn persist_run_result(path: &Path, result: &RunResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(result).context("serialize run result failed")?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::BondListing;

    #[test]
    fn dated_path_inserts_date_before_extension() {
        assert_eq!(
            dated_path(Path::new("out/bond_result.json"), "2026-01-16"),
            PathBuf::from("out/bond_result_2026-01-16.json")
        );
        assert_eq!(
            dated_path(Path::new("result"), "2026-01-16"),
            PathBuf::from("result_2026-01-16")
        );
    }

    #[test]
    fn writes_readable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bond_result.json");
        let result = RunResult::new(
            "2026-01-16".to_string(),
            vec![BondListing {
                security_code: "123456".to_string(),
                security_name: "测试转债A".to_string(),
                subscription_code: Some("789012".to_string()),
                subscription_start_date: Some("2026-01-16 00:00:00".to_string()),
            }],
            "message".to_string(),
            true,
        );

        persist_run_result(&path, &result).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("测试转债A"));
        assert!(text.contains("\n  \"date\": \"2026-01-16\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["isBusinessDay"], true);
        let listing = &value["listings"][0];
        assert_eq!(listing["securityCode"], "123456");
        assert_eq!(listing["securityName"], "测试转债A");
        assert_eq!(listing["subscriptionCode"], "789012");
        assert_eq!(listing["subscriptionStartDate"], "2026-01-16 00:00:00");
        assert!(!text.contains("security_code"));
    }
}
