// Template processor - substitutes date/time placeholders in replacement text
//
// Placeholders are resolved in one left-to-right pass. Substituted output is
// never re-scanned, so a replacement can't smuggle in another placeholder.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// `{date}` → `M/D/YYYY`
pub const DATE_PLACEHOLDER: &str = "{date}";
/// `{time}` → `h:mm AM|PM`
pub const TIME_PLACEHOLDER: &str = "{time}";
/// `{datetime}` → `M/D/YYYY h:mm AM|PM`
pub const DATETIME_PLACEHOLDER: &str = "{datetime}";
/// Legacy spelling of `{datetime}`, still honoured for stored shortcuts
pub const DATETIME_ALIAS_PLACEHOLDER: &str = "{data-time}";

fn placeholder_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Longer alternatives first so `{datetime}` never matches as `{date}`
    PATTERN.get_or_init(|| {
        Regex::new(r"\{(datetime|data-time|date|time)\}").expect("placeholder pattern is valid")
    })
}

/// Format `now` as `M/D/YYYY` (no zero padding).
pub fn format_date(now: &NaiveDateTime) -> String {
    format!("{}/{}/{}", now.month(), now.day(), now.year())
}

/// Format `now` as 12-hour `h:mm AM|PM` (hour unpadded, minutes zero-padded).
pub fn format_time(now: &NaiveDateTime) -> String {
    let (is_pm, hour) = now.hour12();
    let meridiem = if is_pm { "PM" } else { "AM" };
    format!("{}:{:02} {}", hour, now.minute(), meridiem)
}

/// Resolve every placeholder in `text` against a single `now` snapshot.
pub fn resolve(text: &str, now: NaiveDateTime) -> String {
    if !text.contains('{') {
        return text.to_string();
    }

    let date = format_date(&now);
    let time = format_time(&now);

    placeholder_regex()
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "date" => date.clone(),
            "time" => time.clone(),
            _ => format!("{} {}", date, time),
        })
        .into_owned()
}

/// Resolve placeholders against the local wall clock.
pub fn resolve_now(text: &str) -> String {
    resolve(text, Local::now().naive_local())
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
