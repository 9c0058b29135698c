//! Date recognition and `[[date:...]]` rewriting.
//!
//! Recognized forms:
//!
//! | Input                          | Output value              |
//! |--------------------------------|---------------------------|
//! | `2023-05-15`                   | `2023-05-15`              |
//! | `2023-05-15 14:30`             | `2023-05-15 14:30`        |
//! | `2023-05-15/2023-05-20`        | `2023-05-15/2023-05-20`   |
//! | `Week 26, 2023`                | `2023-W26`                |
//! | `Weeks 27-28, 2023`            | `2023-W27/W28`            |
//! | `May 15th, 2023`               | `2023-05-15`              |
//! | `May 15, 2023, 2:30 PM`        | `2023-05-15 14:30`        |
//! | `May 15 - June 20, 2023`       | `2023-05-15/2023-06-20`   |
//! | `May 2023`                     | `2023-05`                 |
//! | `2023` (opt-in)                | `2023`                    |
//!
//! Calendar values that do not exist are left as literal text.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, Weekday};
use regex::{Captures, Regex};

use crate::stash::Stash;

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

const ORDINAL: &str = r"(?:st|nd|rd|th)?";

/// Spans that must not be rewritten: references, URLs, markdown links.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[.*?\]\]|https?://[^\s)]+|\[[^\]]+\]\([^)]+\)").expect("protected span regex")
});

/// Every candidate date form, most specific alternatives first where two
/// could start at the same position.
static DATE_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    let iso = r"\d{4}(?:-\d{2}(?:-\d{2})?)?(?:\s+\d{2}:\d{2})?";
    let pattern = [
        format!(r"\b{iso}(?:/{iso})?\b"),
        r"Week \d{1,2},\s*\d{4}".to_string(),
        r"Weeks \d{1,2}-\d{1,2},\s*\d{4}".to_string(),
        format!(r"\b{MONTH}\s+(?:⌘\s+)?\d{{4}}"),
        format!(r"\b{MONTH} \d{{1,2}}{ORDINAL},\s*\d{{4}}(?:,\s*\d{{1,2}}:\d{{2}}\s*(?:AM|PM))?"),
        format!(r"\b{MONTH} \d{{1,2}}{ORDINAL}\s*-\s*{MONTH} \d{{1,2}}{ORDINAL},\s*\d{{4}}"),
    ]
    .join("|");
    Regex::new(&pattern).expect("date scan regex")
});

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4,}").expect("numeric run regex"));

static ISO_DATE_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("iso date regex"));

static WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Week (\d{1,2}),\s*(\d{4})$").expect("week regex"));

static WEEK_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Weeks (\d{1,2})-(\d{1,2}),\s*(\d{4})$").expect("week range regex")
});

static ISO_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\s+(\d{2}):(\d{2})$").expect("iso time regex")
});

static LONG_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun),\s+)?([A-Z][a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?,\s*(\d{4})(?:,\s*(\d{1,2}):(\d{2})\s*(AM|PM))?$",
    )
    .expect("long form date regex")
});

static LONG_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Z][a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?\s*-\s*([A-Z][a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?,\s*(\d{4})$",
    )
    .expect("long range regex")
});

static ISO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})/(\d{4})-(\d{2})-(\d{2})$").expect("iso range regex")
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("iso date regex"));

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun),\s+)?([A-Z][a-z]+)\s*(?:⌘\s+)?(\d{4})$")
        .expect("month year regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:⌘\s+)?(\d{4})$").expect("year regex"));

/// Kind of calendar expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Simple,
    Time,
    Week,
    Duration,
}

/// A recognized calendar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub kind: DateKind,
    pub value: String,
    /// Input was already a `[[date:...]]` reference.
    pub is_processed: bool,
}

impl ParsedDate {
    fn new(kind: DateKind, value: String) -> Self {
        Self {
            kind,
            value,
            is_processed: false,
        }
    }

    /// Render as a Tana date reference.
    pub fn to_tana(&self) -> String {
        if self.is_processed {
            self.value.clone()
        } else {
            format!("[[date:{}]]", self.value)
        }
    }
}

/// Two-digit month number for an English month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let n = match name {
        "January" | "Jan" => 1,
        "February" | "Feb" => 2,
        "March" | "Mar" => 3,
        "April" | "Apr" => 4,
        "May" => 5,
        "June" | "Jun" => 6,
        "July" | "Jul" => 7,
        "August" | "Aug" => 8,
        "September" | "Sep" => 9,
        "October" | "Oct" => 10,
        "November" | "Nov" => 11,
        "December" | "Dec" => 12,
        _ => return None,
    };
    Some(n)
}

fn num(caps: &Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i)?.as_str().parse().ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}

fn hm(hour: u32, minute: u32) -> Option<String> {
    NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(format!("{:02}:{:02}", hour, minute))
}

fn iso_week(year: u32, week: u32) -> Option<String> {
    NaiveDate::from_isoywd_opt(i32::try_from(year).ok()?, week, Weekday::Mon)?;
    Some(format!("{}-W{:02}", year, week))
}

/// Parse one whole candidate string into a date.
pub fn parse_date(text: &str) -> Option<ParsedDate> {
    if text.starts_with("[[date:") && text.ends_with("]]") {
        return Some(ParsedDate {
            kind: DateKind::Simple,
            value: text.to_string(),
            is_processed: true,
        });
    }

    if let Some(caps) = WEEK.captures(text) {
        let value = iso_week(num(&caps, 2)?, num(&caps, 1)?)?;
        return Some(ParsedDate::new(DateKind::Week, value));
    }

    if let Some(caps) = WEEK_RANGE.captures(text) {
        let year = num(&caps, 3)?;
        let start = iso_week(year, num(&caps, 1)?)?;
        iso_week(year, num(&caps, 2)?)?;
        let value = format!("{}/W{:02}", start, num(&caps, 2)?);
        return Some(ParsedDate::new(DateKind::Duration, value));
    }

    if let Some(caps) = ISO_TIME.captures(text) {
        let date = ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
        let time = hm(num(&caps, 4)?, num(&caps, 5)?)?;
        return Some(ParsedDate::new(DateKind::Time, format!("{} {}", date, time)));
    }

    if let Some(caps) = LONG_FORM.captures(text) {
        let month = month_number(&caps[1])?;
        let date = ymd(num(&caps, 3)?, month, num(&caps, 2)?)?;
        if let (Some(hour), Some(minute), Some(meridiem)) =
            (num(&caps, 4), num(&caps, 5), caps.get(6))
        {
            let hour = match (meridiem.as_str(), hour) {
                ("PM", h) if h < 12 => h + 12,
                ("AM", 12) => 0,
                (_, h) => h,
            };
            let time = hm(hour, minute)?;
            return Some(ParsedDate::new(DateKind::Time, format!("{} {}", date, time)));
        }
        return Some(ParsedDate::new(DateKind::Simple, date));
    }

    if let Some(caps) = LONG_RANGE.captures(text) {
        let year = num(&caps, 5)?;
        let start = ymd(year, month_number(&caps[1])?, num(&caps, 2)?)?;
        let end = ymd(year, month_number(&caps[3])?, num(&caps, 4)?)?;
        return Some(ParsedDate::new(DateKind::Duration, format!("{}/{}", start, end)));
    }

    if let Some(caps) = ISO_RANGE.captures(text) {
        let start = ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
        let end = ymd(num(&caps, 4)?, num(&caps, 5)?, num(&caps, 6)?)?;
        return Some(ParsedDate::new(DateKind::Duration, format!("{}/{}", start, end)));
    }

    if let Some(caps) = ISO_DATE.captures(text) {
        let date = ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
        return Some(ParsedDate::new(DateKind::Simple, date));
    }

    if let Some(caps) = MONTH_YEAR.captures(text) {
        let month = month_number(&caps[1])?;
        let value = format!("{}-{:02}", &caps[2], month);
        return Some(ParsedDate::new(DateKind::Simple, value));
    }

    if let Some(caps) = YEAR.captures(text) {
        return Some(ParsedDate::new(DateKind::Simple, caps[1].to_string()));
    }

    None
}

/// Text that mentions an id next to a long number is an identifier, not a
/// date.
fn looks_like_numeric_id(text: &str) -> bool {
    text.to_lowercase().contains("id")
        && NUMERIC_RUN.is_match(text)
        && !ISO_DATE_ANYWHERE.is_match(text)
}

/// Rewrite every recognized date in `text` as a `[[date:...]]` reference.
pub fn convert_dates(text: &str, convert_bare_years: bool) -> String {
    if looks_like_numeric_id(text) {
        return text.to_string();
    }

    let mut stash = Stash::new('d');
    let shielded = stash.protect(&PROTECTED, text);

    let converted = DATE_SCAN.replace_all(&shielded, |caps: &Captures<'_>| {
        let found = &caps[0];
        if !convert_bare_years && found.len() < 5 && found.bytes().all(|b| b.is_ascii_digit()) {
            return found.to_string();
        }
        if let Some(date) = parse_date(found) {
            return date.to_tana();
        }
        // A valid day followed by an impossible time still converts the day.
        let (day, rest) = found.split_at(found.find(char::is_whitespace).unwrap_or(found.len()));
        match parse_date(day) {
            Some(date) if !rest.is_empty() && ISO_DATE.is_match(day) => {
                format!("{}{}", date.to_tana(), rest)
            }
            _ => found.to_string(),
        }
    });

    stash.restore(&converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str) -> String {
        convert_dates(text, false)
    }

    #[test]
    fn test_iso_forms() {
        assert_eq!(convert("2023-05-15"), "[[date:2023-05-15]]");
        assert_eq!(convert("at 2023-05-15 14:30"), "at [[date:2023-05-15 14:30]]");
        assert_eq!(
            convert("2023-05-15/2023-05-20"),
            "[[date:2023-05-15/2023-05-20]]"
        );
    }

    #[test]
    fn test_weeks() {
        assert_eq!(convert("Week 26, 2023"), "[[date:2023-W26]]");
        assert_eq!(convert("Week 3, 2024"), "[[date:2024-W03]]");
        assert_eq!(convert("Weeks 27-28, 2023"), "[[date:2023-W27/W28]]");
    }

    #[test]
    fn test_long_forms() {
        assert_eq!(convert("May 15th, 2023"), "[[date:2023-05-15]]");
        assert_eq!(convert("Jan 5, 2024, 2:30 PM"), "[[date:2024-01-05 14:30]]");
        assert_eq!(convert("Jan 5, 2024, 12:05 AM"), "[[date:2024-01-05 00:05]]");
        assert_eq!(
            convert("May 15 - June 20, 2023"),
            "[[date:2023-05-15/2023-06-20]]"
        );
        assert_eq!(convert("Released March 2023"), "Released [[date:2023-03]]");
    }

    #[test]
    fn test_bare_years() {
        assert_eq!(convert("In 2023 we shipped"), "In 2023 we shipped");
        assert_eq!(convert_dates("In 2023 we shipped", true), "In [[date:2023]] we shipped");
        assert_eq!(convert_dates("12345 items", true), "12345 items");
    }

    #[test]
    fn test_invalid_calendar_values_stay_literal() {
        assert_eq!(convert("2023-13-45"), "2023-13-45");
        assert_eq!(convert("Week 60, 2023"), "Week 60, 2023");
        assert_eq!(convert("Feb 30, 2024"), "Feb 30, 2024");
    }

    #[test]
    fn test_invalid_time_keeps_date() {
        assert_eq!(
            convert("due 2023-05-15 25:00"),
            "due [[date:2023-05-15]] 25:00"
        );
        assert_eq!(convert("2023-02-30 10:00"), "2023-02-30 10:00");
    }

    #[test]
    fn test_numeric_id_untouched() {
        assert_eq!(convert("Video ID 20231105"), "Video ID 20231105");
        assert_eq!(convert("id 1234 on 2023-05-15"), "id 1234 on [[date:2023-05-15]]");
    }

    #[test]
    fn test_protected_spans() {
        assert_eq!(
            convert("see https://x.io/2023-05-15/post"),
            "see https://x.io/2023-05-15/post"
        );
        assert_eq!(convert("[[date:2023-05-15]]"), "[[date:2023-05-15]]");
        assert_eq!(
            convert("[notes](https://x.io) from 2023-05-15"),
            "[notes](https://x.io) from [[date:2023-05-15]]"
        );
    }

    #[test]
    fn test_parse_date_kinds() {
        assert_eq!(parse_date("Week 1, 2024").map(|d| d.kind), Some(DateKind::Week));
        assert_eq!(parse_date("2024-01-01 09:00").map(|d| d.kind), Some(DateKind::Time));
        assert_eq!(parse_date("Weeks 1-2, 2024").map(|d| d.kind), Some(DateKind::Duration));
        let processed = parse_date("[[date:2024-01-01]]").unwrap();
        assert!(processed.is_processed);
        assert_eq!(processed.to_tana(), "[[date:2024-01-01]]");
        assert_eq!(parse_date("Someday 2024"), None);
    }
}
