use chrono::{DateTime, Locale, Utc};
use log::debug;

/// Formats clock-face labels (`HH:MM`) for chart ticks and tooltips.
///
/// Presentation only: labels honor the viewer's locale, while day keys and
/// minute-of-day values are always derived from UTC components elsewhere.
/// An unrecognized locale tag falls back to plain `%H:%M`.
#[derive(Debug, Clone, Copy)]
pub struct TimeLabeler {
    locale: Option<Locale>,
}

impl TimeLabeler {
    pub fn new(tag: &str) -> Self {
        // BCP 47 tags arrive hyphenated ("en-US"); chrono locales use
        // underscores ("en_US").
        let normalized = tag.trim().replace('-', "_");
        let locale = Locale::try_from(normalized.as_str()).ok();
        if locale.is_none() {
            debug!("unrecognized locale tag {tag:?}; using plain HH:MM labels");
        }
        Self { locale }
    }

    pub fn label(&self, timestamp: DateTime<Utc>) -> String {
        match self.locale {
            Some(locale) => timestamp.format_localized("%H:%M", locale).to_string(),
            None => timestamp.format("%H:%M").to_string(),
        }
    }
}

impl Default for TimeLabeler {
    fn default() -> Self {
        Self::new("en-US")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 12, 14, 5, 0).unwrap()
    }

    #[test]
    fn labels_known_locale() {
        let labeler = TimeLabeler::new("en-US");
        assert_eq!(labeler.label(afternoon()), "14:05");
    }

    #[test]
    fn accepts_underscore_tags() {
        let labeler = TimeLabeler::new("en_US");
        assert_eq!(labeler.label(afternoon()), "14:05");
    }

    #[test]
    fn unknown_locale_falls_back_to_plain_format() {
        let labeler = TimeLabeler::new("zz-ZZ");
        assert_eq!(labeler.label(afternoon()), "14:05");
    }

    #[test]
    fn pads_single_digit_components() {
        let labeler = TimeLabeler::default();
        let early = Utc.with_ymd_and_hms(2025, 11, 12, 3, 7, 0).unwrap();
        assert_eq!(labeler.label(early), "03:07");
    }
}
