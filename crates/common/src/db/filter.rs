//! Listing filters
//!
//! Translates query-string input into typed filters. Filter parsing never
//! fails: unrecognized or malformed values are treated as absent, so a
//! search form submission always renders a listing.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sea_orm::{ColumnTrait, Condition};

use super::models::newspaper;

/// Recognized publication period filters
///
/// Matching is exact and case-sensitive; any other value (including
/// `"Today"` or `"year"`) selects no period at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationPeriod {
    /// The current calendar day
    Today,
    /// The last 7 days
    Week,
    /// The last 30 days
    Month,
}

impl PublicationPeriod {
    /// Parse a raw query parameter into a period
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some("today") => Some(Self::Today),
            Some("week") => Some(Self::Week),
            Some("month") => Some(Self::Month),
            _ => None,
        }
    }

    /// Resolve the period into a concrete time window anchored at `now`
    pub fn window(self, now: DateTime<Utc>) -> PublicationWindow {
        match self {
            Self::Today => {
                let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
                PublicationWindow {
                    since: start,
                    until: Some(start + Duration::days(1)),
                }
            }
            Self::Week => PublicationWindow {
                since: now - Duration::days(7),
                until: None,
            },
            Self::Month => PublicationWindow {
                since: now - Duration::days(30),
                until: None,
            },
        }
    }
}

/// A concrete publication time window
///
/// `today` is a calendar-day slice with both bounds; `week` and `month`
/// are rolling windows open towards the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl PublicationWindow {
    /// Build the `published_date` predicate for this window
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all().add(newspaper::Column::PublishedDate.gte(self.since));
        if let Some(until) = self.until {
            cond = cond.add(newspaper::Column::PublishedDate.lt(until));
        }
        cond
    }
}

/// Newspaper listing filter
#[derive(Debug, Clone, Default)]
pub struct NewspaperFilter {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Publication period
    pub period: Option<PublicationPeriod>,
}

/// Redactor listing filter
#[derive(Debug, Clone, Default)]
pub struct RedactorFilter {
    /// Case-insensitive username substring
    pub username: Option<String>,
}

/// Build an ILIKE substring pattern from raw search input
///
/// Blank input yields no pattern. LIKE metacharacters in the input are
/// escaped so they match literally.
pub fn like_pattern(input: Option<&str>) -> Option<String> {
    let term = input?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Parse a 1-based page parameter, degrading to page 1 on any bad input
pub fn page_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 13, 45, 0).unwrap()
    }

    #[test]
    fn test_period_parse_is_exact_and_case_sensitive() {
        assert_eq!(
            PublicationPeriod::from_param(Some("today")),
            Some(PublicationPeriod::Today)
        );
        assert_eq!(
            PublicationPeriod::from_param(Some("week")),
            Some(PublicationPeriod::Week)
        );
        assert_eq!(
            PublicationPeriod::from_param(Some("month")),
            Some(PublicationPeriod::Month)
        );

        assert_eq!(PublicationPeriod::from_param(Some("Today")), None);
        assert_eq!(PublicationPeriod::from_param(Some("TODAY")), None);
        assert_eq!(PublicationPeriod::from_param(Some(" today")), None);
        assert_eq!(PublicationPeriod::from_param(Some("year")), None);
        assert_eq!(PublicationPeriod::from_param(Some("")), None);
        assert_eq!(PublicationPeriod::from_param(None), None);
    }

    #[test]
    fn test_today_window_covers_calendar_day() {
        let window = PublicationPeriod::Today.window(fixed_now());

        assert_eq!(window.since, Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap());
        assert_eq!(
            window.until,
            Some(Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rolling_windows_are_open_ended() {
        let now = fixed_now();

        let week = PublicationPeriod::Week.window(now);
        assert_eq!(week.since, now - Duration::days(7));
        assert_eq!(week.until, None);

        let month = PublicationPeriod::Month.window(now);
        assert_eq!(month.since, now - Duration::days(30));
        assert_eq!(month.until, None);
    }

    #[test]
    fn test_month_window_includes_recent_and_excludes_old() {
        let now = fixed_now();
        let window = PublicationPeriod::Month.window(now);

        let published_today = now - Duration::hours(2);
        let published_long_ago = now - Duration::days(40);

        assert!(published_today >= window.since);
        assert!(published_long_ago < window.since);
    }

    #[test]
    fn test_like_pattern_wraps_and_trims() {
        assert_eq!(like_pattern(Some("wall")), Some("%wall%".to_string()));
        assert_eq!(like_pattern(Some("  derby  ")), Some("%derby%".to_string()));
        assert_eq!(like_pattern(Some("")), None);
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern(Some("100%")), Some("%100\\%%".to_string()));
        assert_eq!(like_pattern(Some("a_b")), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern(Some("c\\d")), Some("%c\\\\d%".to_string()));
    }

    #[test]
    fn test_page_number_degrades_to_one() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some(" 2 ")), 2);
        assert_eq!(page_number(Some("0")), 1);
        assert_eq!(page_number(Some("-4")), 1);
        assert_eq!(page_number(Some("abc")), 1);
        assert_eq!(page_number(Some("")), 1);
    }
}
