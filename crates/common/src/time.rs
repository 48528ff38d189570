//! Timezone conversion for presentation.
//!
//! Everything stored or compared internally is UTC. Conversion to a local
//! zone happens only when a value is rendered for a client.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{AppError, AppResult};

/// Parse an IANA zone name such as `Asia/Kolkata`.
pub fn parse_zone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|e| AppError::Config(format!("Invalid timezone {name}: {e}")))
}

/// Convert a UTC instant into the given zone.
#[must_use]
pub fn to_zone(at: DateTime<Utc>, zone: Tz) -> DateTime<Tz> {
    at.with_timezone(&zone)
}

/// Renders UTC instants in one configured zone and format.
#[derive(Debug, Clone)]
pub struct LocalTimeFormatter {
    zone: Tz,
    format: String,
}

impl LocalTimeFormatter {
    /// Create a formatter from a zone name and `strftime` pattern.
    pub fn new(zone: &str, format: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            zone: parse_zone(zone)?,
            format: format.into(),
        })
    }

    /// Render `at` as local wall-clock text.
    #[must_use]
    pub fn format(&self, at: DateTime<Utc>) -> String {
        to_zone(at, self.zone).format(&self.format).to_string()
    }

    /// Zone used for rendering.
    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }
}

impl Default for LocalTimeFormatter {
    fn default() -> Self {
        Self {
            zone: chrono_tz::Asia::Kolkata,
            format: "%d %b %Y, %I:%M %p".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_zone_shifts_wall_clock() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap();
        let local = to_zone(at, chrono_tz::Asia::Kolkata);

        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2025-01-16 01:30");
        assert_eq!(local.with_timezone(&Utc), at);
    }

    #[test]
    fn test_default_formatter() {
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 6, 15, 0).unwrap();
        let fmt = LocalTimeFormatter::default();

        assert_eq!(fmt.format(at), "02 Mar 2025, 11:45 AM");
    }

    #[test]
    fn test_unknown_zone_is_config_error() {
        assert!(matches!(parse_zone("Mars/Olympus"), Err(AppError::Config(_))));
        assert!(LocalTimeFormatter::new("UTC", "%H:%M").is_ok());
    }
}
