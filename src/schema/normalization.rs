use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crate::utils::format_wire_datetime;

/// Trim a form value; blank or missing becomes `None`
pub fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Wire timestamp for UTC midnight of `date`
///
/// Example: 1990-05-12 becomes "1990-05-12T00:00:00.000Z"
pub fn midnight_timestamp(date: NaiveDate) -> String {
    let midnight = date.and_time(NaiveTime::MIN);
    format_wire_datetime(Utc.from_utc_datetime(&midnight))
}
