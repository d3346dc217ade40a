//! Run-date helpers
//!
//! Turns the `--date` argument into the window a nag query looks at.

use chrono::{Days, NaiveDate};

use crate::error::{NagError, NagResult};

/// Resolve `today` / `yesterday` / `tomorrow` / `YYYY-MM-DD` against `today`
pub fn get_date_ymd(input: &str, today: NaiveDate) -> NagResult<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today.pred_opt().ok_or_else(|| NagError::Date(input.to_string())),
        "tomorrow" => today.succ_opt().ok_or_else(|| NagError::Date(input.to_string())),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| NagError::Date(input.to_string())),
    }
}

/// Window `(start, end)` for a run on `input`: start is `days_lookup` days
/// before the run date, end is the day after.
///
/// A negative `days_lookup`, or a window reaching past the calendar chrono
/// can represent, is a `Config` error.
pub fn get_dates(input: &str, days_lookup: i64, today: NaiveDate) -> NagResult<(NaiveDate, NaiveDate)> {
    let date = get_date_ymd(input, today)?;
    let out_of_range = || {
        NagError::Config(format!(
            "days_lookup {} puts the window start out of range for {}",
            days_lookup,
            format_ymd(date)
        ))
    };

    let start = u64::try_from(days_lookup)
        .ok()
        .and_then(|days| date.checked_sub_days(Days::new(days)))
        .ok_or_else(out_of_range)?;
    let end = date
        .succ_opt()
        .ok_or_else(|| NagError::Config(format!("no day after {}", format_ymd(date))))?;

    Ok((start, end))
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Bugzilla date format
pub fn format_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
