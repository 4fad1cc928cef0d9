use crate::models::NormalizedCategory;

/// Maps an upstream status onto a display category. Unknown values are absences.
pub fn normalize(raw: &str) -> NormalizedCategory {
    match raw {
        "Present" => NormalizedCategory::FullDay,
        "Absent" => NormalizedCategory::Absent,
        "Half Day" => NormalizedCategory::HalfDay,
        "Paid Leave" => NormalizedCategory::Paid,
        "Activity" => NormalizedCategory::Activity,
        _ => NormalizedCategory::Absent,
    }
}

/// Like [`normalize`], but also accepts full-day statuses that an earlier
/// pass re-spelled (`present`, `Full Day`, `full-day`).
pub fn classify(raw: &str) -> NormalizedCategory {
    match normalize(raw) {
        NormalizedCategory::Absent if is_full_day_spelling(raw) => NormalizedCategory::FullDay,
        category => category,
    }
}

fn is_full_day_spelling(raw: &str) -> bool {
    let trimmed = raw.trim();
    ["present", "full day", "full-day"]
        .iter()
        .any(|spelling| trimmed.eq_ignore_ascii_case(spelling))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_known_vocabulary() {
        assert_eq!(normalize("Present"), NormalizedCategory::FullDay);
        assert_eq!(normalize("Absent"), NormalizedCategory::Absent);
        assert_eq!(normalize("Half Day"), NormalizedCategory::HalfDay);
        assert_eq!(normalize("Paid Leave"), NormalizedCategory::Paid);
        assert_eq!(normalize("Activity"), NormalizedCategory::Activity);
    }

    #[test]
    fn normalize_is_total() {
        for raw in ["", " ", "present", "HALF DAY", "Sick", "Paid  Leave", "\u{0}", "日勤"] {
            let category = normalize(raw);
            assert!(NormalizedCategory::ALL.contains(&category));
            assert_eq!(category, NormalizedCategory::Absent, "input {raw:?}");
        }
    }

    #[test]
    fn classify_folds_full_day_spellings() {
        assert_eq!(classify("present"), NormalizedCategory::FullDay);
        assert_eq!(classify("PRESENT"), NormalizedCategory::FullDay);
        assert_eq!(classify("Full Day"), NormalizedCategory::FullDay);
        assert_eq!(classify("full-day"), NormalizedCategory::FullDay);
        assert_eq!(classify("half day"), NormalizedCategory::Absent);
        assert_eq!(classify("Half Day"), NormalizedCategory::HalfDay);
        assert_eq!(classify(""), NormalizedCategory::Absent);
    }
}
