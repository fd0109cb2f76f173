/// Day list shown in the navigation UI.
///
/// When a pinned day-key range is configured and the dataset intersects it,
/// the whole intersection is shown. Otherwise every day is shown up to
/// `cap`, keeping the most recent ones.
pub fn visible_days(all_days: &[String], pinned: Option<(&str, &str)>, cap: usize) -> Vec<String> {
    if all_days.is_empty() {
        return Vec::new();
    }

    if let Some((start, end)) = pinned {
        let targeted: Vec<String> = all_days
            .iter()
            .filter(|day| day.as_str() >= start && day.as_str() <= end)
            .cloned()
            .collect();
        if !targeted.is_empty() {
            return targeted;
        }
    }

    if all_days.len() <= cap {
        return all_days.to_vec();
    }
    all_days[all_days.len() - cap..].to_vec()
}

/// Resolve the day to display: the requested day verbatim when it has data,
/// otherwise the most recent day with data. Checked against the full day
/// set, not the navigation window, so an explicitly requested day outside
/// the window still wins.
pub fn resolve_day(requested: Option<&str>, all_days: &[String]) -> Option<String> {
    if let Some(day) = requested {
        if all_days.iter().any(|candidate| candidate == day) {
            return Some(day.to_string());
        }
    }
    all_days.last().cloned()
}
