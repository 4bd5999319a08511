//! Date and time rendering for the view payloads ("Dec. 1, 2100",
//! "1 a.m.") and lenient parsing of what the forms submit ("12/1/2100",
//! "1:00").

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

const MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "March", "April", "May", "June", "July", "Aug.", "Sept.", "Oct.", "Nov.",
    "Dec.",
];

pub fn date_display(d: NaiveDate) -> String {
    format!("{} {}, {}", MONTHS[d.month0() as usize], d.day(), d.year())
}

/// 12-hour clock, minutes dropped when zero, with the noon/midnight
/// special cases.
pub fn time_display(t: NaiveTime) -> String {
    let (hour, minute) = (t.hour(), t.minute());
    if minute == 0 {
        if hour == 0 {
            return "midnight".to_string();
        }
        if hour == 12 {
            return "noon".to_string();
        }
    }
    let meridiem = if hour < 12 { "a.m." } else { "p.m." };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    if minute == 0 {
        format!("{} {}", hour12, meridiem)
    } else {
        format!("{}:{:02} {}", hour12, minute, meridiem)
    }
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"]
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(input, f).ok())
}

pub fn parse_time(input: &str) -> Option<NaiveTime> {
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(input, f).ok())
}
