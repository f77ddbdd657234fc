//! Command argument grammar
//!
//! Arguments are tokenized on whitespace and each token is classified
//! against a fixed set of literal patterns (date, time, plain word),
//! independent of position. The any-order permissiveness of `/when
//! 19:30 2025-10-30` is deliberate: the first token matching each pattern
//! wins.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

fn date_pattern() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

fn time_pattern() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| {
        Regex::new(r"^(?i)(\d{1,2}):(\d{2})(am|pm)?$").expect("valid time pattern")
    })
}

/// Classification of a single argument token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Date(NaiveDate),
    Time(NaiveTime),
    Word,
}

/// Classify one whitespace-delimited token
pub fn classify(token: &str) -> Token {
    if let Some(date) = parse_date(token) {
        return Token::Date(date);
    }
    if let Some(time) = parse_time(token) {
        return Token::Time(time);
    }
    Token::Word
}

/// Parse a `YYYY-MM-DD` token, rejecting calendar-invalid dates
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    if !date_pattern().is_match(token) {
        return None;
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

/// Parse an `H:MM` token with an optional `am`/`pm` suffix
pub fn parse_time(token: &str) -> Option<NaiveTime> {
    let captures = time_pattern().captures(token)?;

    let hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minute: u32 = captures.get(2)?.as_str().parse().ok()?;
    let meridiem = captures.get(3).map(|m| m.as_str().to_lowercase());

    let hour = match meridiem.as_deref() {
        Some("am") | Some("pm") if !(1..=12).contains(&hour) => return None,
        Some("am") => hour % 12,
        Some("pm") => hour % 12 + 12,
        _ => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Date and time extracted from a `/when` argument list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleArgs {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl ScheduleArgs {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

/// Scan tokens in order, keeping the first date and the first time found
pub fn parse_schedule(args: &[&str]) -> ScheduleArgs {
    let mut schedule = ScheduleArgs::default();

    for token in args {
        match classify(token) {
            Token::Date(date) if schedule.date.is_none() => schedule.date = Some(date),
            Token::Time(time) if schedule.time.is_none() => schedule.time = Some(time),
            _ => {}
        }
    }

    schedule
}
