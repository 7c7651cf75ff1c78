use crate::domain::listing::BondListing;

/// Keeps listings whose subscription start begins with `target_date`, in input order.
///
/// This is a literal prefix comparison on the leading 10 characters, so a malformed
/// upstream date simply fails to match.
pub fn filter_by_date(listings: &[BondListing], target_date: &str) -> Vec<BondListing> {
    listings
        .iter()
        .filter(|l| {
            l.subscription_start_date
                .as_deref()
                .and_then(|s| s.get(..10))
                .is_some_and(|prefix| prefix == target_date)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(code: &str, start: Option<&str>) -> BondListing {
        BondListing {
            security_code: code.to_string(),
            security_name: format!("Bond {code}"),
            subscription_code: None,
            subscription_start_date: start.map(str::to_string),
        }
    }

    #[test]
    fn keeps_matching_dates_in_order() {
        let input = vec![
            listing("3", Some("2026-01-16 00:00:00")),
            listing("2", Some("2026-01-17 00:00:00")),
            listing("1", Some("2026-01-16")),
        ];
        let out = filter_by_date(&input, "2026-01-16");
        let codes: Vec<_> = out.iter().map(|l| l.security_code.as_str()).collect();
        assert_eq!(codes, vec!["3", "1"]);
    }

    #[test]
    fn ignores_missing_short_and_malformed_dates() {
        let input = vec![
            listing("a", None),
            listing("b", Some("")),
            listing("c", Some("2026-01")),
            listing("d", Some("16/01/2026")),
            listing("e", Some("债券日期2026-01-16")),
        ];
        assert!(filter_by_date(&input, "2026-01-16").is_empty());
    }

    #[test]
    fn output_is_exactly_the_prefix_matches() {
        let dates = ["2026-01-15", "2026-01-16 09:30:00", "2026-01-16", "2026-01-161", "2025-01-16"];
        let input: Vec<_> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| listing(&i.to_string(), Some(d)))
            .collect();

        let out = filter_by_date(&input, "2026-01-16");
        let expected: Vec<_> = input
            .iter()
            .filter(|l| l.subscription_start_date.as_deref().unwrap().starts_with("2026-01-16"))
            .cloned()
            .collect();
        assert_eq!(out, expected);
        assert_eq!(out.len(), 3);
    }
}
