use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

use crate::backend::UserProfile;

pub const ANONYMOUS: &str = "Anonymous";

/// Convert a backend timestamp (nanoseconds since epoch) into `tz`.
pub fn timestamp_in<Tz: TimeZone>(nanos: u64, tz: &Tz) -> DateTime<Tz> {
    let millis = i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX);
    let utc: DateTime<Utc> = Utc
        .timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default();
    utc.with_timezone(tz)
}

/// `Jan 5, 2025`
pub fn card_date_in<Tz: TimeZone>(nanos: u64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp_in(nanos, tz).format("%b %-d, %Y").to_string()
}

/// `January 5, 2025 at 03:04 PM`
pub fn detail_date_in<Tz: TimeZone>(nanos: u64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp_in(nanos, tz)
        .format("%B %-d, %Y at %I:%M %p")
        .to_string()
}

/// `Jan 5, 03:04 PM`
pub fn comment_date_in<Tz: TimeZone>(nanos: u64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp_in(nanos, tz).format("%b %-d, %I:%M %p").to_string()
}

/// A rendered `<time>` element. `text` is the server-side fallback;
/// `assets/js/local-time.js` rewrites it in the viewer's zone using `style`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTime {
    pub iso: String,
    pub style: &'static str,
    pub text: String,
}

impl DisplayTime {
    fn new(nanos: u64, style: &'static str, text: String) -> Self {
        Self {
            iso: timestamp_in(nanos, &Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
            style,
            text,
        }
    }
}

pub fn card_date(nanos: u64) -> DisplayTime {
    DisplayTime::new(nanos, "card", card_date_in(nanos, &Local))
}

pub fn detail_date(nanos: u64) -> DisplayTime {
    DisplayTime::new(nanos, "detail", detail_date_in(nanos, &Local))
}

pub fn comment_date(nanos: u64) -> DisplayTime {
    DisplayTime::new(nanos, "comment", comment_date_in(nanos, &Local))
}

/// Display name for an author; a missing profile or blank name is "Anonymous".
pub fn author_name(profile: Option<&UserProfile>) -> String {
    profile
        .map(|p| p.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// First letter of each space-separated word, uppercased, at most two letters.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    // 2025-01-05T15:04:00Z
    const SAMPLE: u64 = 1_736_089_440_000_000_000;

    #[test]
    fn card_date_is_short_month() {
        assert_eq!(card_date_in(SAMPLE, &Utc), "Jan 5, 2025");
    }

    #[test]
    fn detail_date_has_long_month_and_time() {
        assert_eq!(detail_date_in(SAMPLE, &Utc), "January 5, 2025 at 03:04 PM");
    }

    #[test]
    fn comment_date_omits_year() {
        assert_eq!(comment_date_in(SAMPLE, &Utc), "Jan 5, 03:04 PM");
    }

    #[test]
    fn timestamps_follow_the_given_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(comment_date_in(SAMPLE, &tokyo), "Jan 6, 12:04 AM");
    }

    #[test]
    fn display_time_carries_the_utc_instant() {
        let card = card_date(SAMPLE);
        assert_eq!(card.iso, "2025-01-05T15:04:00.000Z");
        assert_eq!(card.style, "card");
        assert_eq!(card.text, card_date_in(SAMPLE, &Local));
        assert_eq!(detail_date(SAMPLE).style, "detail");
        assert_eq!(comment_date(SAMPLE + 999_999).iso, "2025-01-05T15:04:00.000Z");
    }

    #[test]
    fn sub_millisecond_precision_is_dropped() {
        assert_eq!(
            timestamp_in(SAMPLE + 999_999, &Utc),
            timestamp_in(SAMPLE, &Utc)
        );
    }

    #[test]
    fn missing_or_blank_profile_is_anonymous() {
        assert_eq!(author_name(None), "Anonymous");
        let blank = UserProfile {
            name: String::new(),
            email: "x@example.com".into(),
        };
        assert_eq!(author_name(Some(&blank)), "Anonymous");
        let named = UserProfile {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
        };
        assert_eq!(author_name(Some(&named)), "Ada Lovelace");
    }

    #[test]
    fn initials_take_two_words() {
        assert_eq!(initials("Anonymous"), "A");
        assert_eq!(initials("ada lovelace"), "AL");
        assert_eq!(initials("Grace Brewster Murray Hopper"), "GB");
        assert_eq!(initials("double  space"), "DS");
        assert_eq!(initials(""), "");
    }
}
