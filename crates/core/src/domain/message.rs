use crate::domain::listing::BondListing;

const PLACEHOLDER: &str = "N/A";

pub fn notification_title(target_date: &str) -> String {
    format!("可转债申购提醒 - {target_date}")
}

/// Renders the daily summary. Empty input yields a single banner line.
pub fn format_message(listings: &[BondListing], target_date: &str) -> String {
    if listings.is_empty() {
        return format!("📊 {target_date} 今日无可转债申购（共 0 只）");
    }

    let mut out = format!(
        "🎉 {target_date} 今日有 {} 只可转债可申购！\n\n",
        listings.len()
    );

    for (i, listing) in listings.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})\n",
            i + 1,
            non_blank(&listing.security_name),
            non_blank(&listing.security_code)
        ));
        if let Some(code) = listing.subscription_code() {
            out.push_str(&format!("   申购代码: {code}\n"));
        }
        if let Some(date) = listing.subscription_date() {
            out.push_str(&format!("   申购日期: {date}\n"));
        }
    }

    out.push_str("\n记得今日申购哦！💰");
    out
}

fn non_blank(s: &str) -> &str {
    let t = s.trim();
    if t.is_empty() {
        PLACEHOLDER
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(code: &str, name: &str, sub: Option<&str>, start: Option<&str>) -> BondListing {
        BondListing {
            security_code: code.to_string(),
            security_name: name.to_string(),
            subscription_code: sub.map(str::to_string),
            subscription_start_date: start.map(str::to_string),
        }
    }

    #[test]
    fn empty_set_is_single_zero_banner() {
        let msg = format_message(&[], "2026-01-18");
        assert!(msg.contains("2026-01-18"));
        assert!(msg.contains("共 0 只"));
        assert!(msg.contains("无"));
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn renders_one_block_per_listing() {
        let listings = vec![
            listing("123456", "测试转债A", Some("789012"), Some("2026-01-16 00:00:00")),
            listing("654321", "测试转债B", Some("210987"), Some("2026-01-16")),
        ];
        let msg = format_message(&listings, "2026-01-16");

        let expected = "🎉 2026-01-16 今日有 2 只可转债可申购！\n\n\
                        1. 测试转债A (123456)\n\
                        \x20  申购代码: 789012\n\
                        \x20  申购日期: 2026-01-16\n\
                        2. 测试转债B (654321)\n\
                        \x20  申购代码: 210987\n\
                        \x20  申购日期: 2026-01-16\n\
                        \n记得今日申购哦！💰";
        assert_eq!(msg, expected);
    }

    #[test]
    fn omits_blank_optional_lines() {
        let listings = vec![listing("110001", "", Some(""), None)];
        let msg = format_message(&listings, "2026-01-16");
        assert!(msg.contains("1. N/A (110001)"));
        assert!(!msg.contains("申购代码"));
        assert!(!msg.contains("申购日期"));
        assert!(msg.ends_with("记得今日申购哦！💰"));
    }

    #[test]
    fn title_contains_date() {
        assert_eq!(notification_title("2026-01-16"), "可转债申购提醒 - 2026-01-16");
    }
}
