//! Time-zone parsing and wall-clock conversion.

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono::offset::LocalResult;
use chrono_tz::Tz;

use crate::error::{CalBookError, CalBookResult};

/// Parse an IANA zone name such as `America/New_York`.
pub fn parse_time_zone(name: &str) -> CalBookResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CalBookError::InvalidArgument(format!("Invalid time zone '{}'", name)))
}

/// Pin a wall-clock time in `zone` to an instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times inside
/// a DST gap are read with the offset in force before the gap, which moves them
/// forward by the gap length.
pub fn instant_in(local: NaiveDateTime, zone: Tz) -> DateTime<Tz> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before_gap = zone
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            let utc = local - Duration::seconds(i64::from(before_gap.local_minus_utc()));
            zone.from_utc_datetime(&utc)
        }
    }
}

/// Wall-clock time in `to` for the instant that reads `local` in `from`.
pub fn convert(local: NaiveDateTime, from: Tz, to: Tz) -> NaiveDateTime {
    if from == to {
        return local;
    }
    instant_in(local, from).with_timezone(&to).naive_local()
}

/// The UTC instant for a wall-clock time in `zone`.
pub fn to_utc(local: NaiveDateTime, zone: Tz) -> DateTime<Utc> {
    instant_in(local, zone).with_timezone(&Utc)
}
