//! Settings shared by every projection

use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use quake_common::{QuakeError, Result};
use quake_config::ChartConfig;

/// Zone in which event times are turned into calendar days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayZone {
    /// The host's local time zone
    #[default]
    Local,
    /// A fixed IANA zone
    Named(Tz),
}

impl DayZone {
    /// `None` selects local time
    pub fn parse(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|e| QuakeError::validation_field(e.to_string(), "timezone")),
        }
    }

    /// Calendar day of `time` in this zone
    pub fn date_of(&self, time: &DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => time.with_timezone(&Local).date_naive(),
            Self::Named(tz) => time.with_timezone(tz).date_naive(),
        }
    }

    /// Long timestamp for hover text, e.g. `Tue Mar 05 2024 13:00:00 GMT+0100 (CET)`.
    ///
    /// Named zones end with their abbreviation in parentheses. The host zone
    /// has no portable name, so local times stop at the offset.
    pub fn format_time(&self, time: &DateTime<Utc>) -> String {
        const FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";
        const NAMED_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z (%Z)";
        match self {
            Self::Local => time.with_timezone(&Local).format(FORMAT).to_string(),
            Self::Named(tz) => time.with_timezone(tz).format(NAMED_FORMAT).to_string(),
        }
    }
}

/// Styling and date handling applied while building plot specifications
#[derive(Debug, Clone, PartialEq)]
pub struct ChartContext {
    pub font_color: String,
    pub zone: DayZone,
}

impl Default for ChartContext {
    fn default() -> Self {
        Self {
            font_color: "white".to_string(),
            zone: DayZone::Local,
        }
    }
}

impl ChartContext {
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        Ok(Self {
            font_color: config.font_color.clone(),
            zone: DayZone::parse(config.timezone.as_deref())?,
        })
    }

    /// Same context with a fixed zone, handy for reproducible output
    pub fn with_zone(mut self, zone: DayZone) -> Self {
        self.zone = zone;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_zone() {
        assert_eq!(DayZone::parse(None).unwrap(), DayZone::Local);
        assert_eq!(
            DayZone::parse(Some("Asia/Tokyo")).unwrap(),
            DayZone::Named(chrono_tz::Asia::Tokyo)
        );
        assert!(DayZone::parse(Some("Nowhere/Special")).is_err());
    }

    #[test]
    fn test_date_depends_on_zone() {
        // 2024-03-05 23:30 UTC is already March 6th in Tokyo
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap();

        let utc = DayZone::Named(chrono_tz::UTC).date_of(&time);
        let tokyo = DayZone::Named(chrono_tz::Asia::Tokyo).date_of(&time);

        assert_eq!(utc, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(tokyo, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let text = DayZone::Named(chrono_tz::Europe::Paris).format_time(&time);
        assert_eq!(text, "Tue Mar 05 2024 13:00:00 GMT+0100 (CET)");

        let summer = Utc.with_ymd_and_hms(2024, 7, 5, 12, 0, 0).unwrap();
        let text = DayZone::Named(chrono_tz::Europe::Paris).format_time(&summer);
        assert_eq!(text, "Fri Jul 05 2024 14:00:00 GMT+0200 (CEST)");

        let local = DayZone::Local.format_time(&time);
        assert!(local.contains(" 2024 ") && local.contains("GMT"), "{local}");
        assert!(!local.contains('('), "{local}");
    }

    #[test]
    fn test_context_from_config() {
        let mut config = ChartConfig::default();
        config.timezone = Some("UTC".to_string());

        let context = ChartContext::from_config(&config).unwrap();
        assert_eq!(context.font_color, "#FFFFFF");
        assert_eq!(context.zone, DayZone::Named(chrono_tz::UTC));
    }
}
