//! Study-day arithmetic for daily goals.

use crate::config::QueueSettings;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Study day a timestamp belongs to.
///
/// Shifted into the learner's timezone, then back by the daily reset hour:
/// with a 4 o'clock reset, a review at 02:00 local still counts towards the
/// previous day.
pub fn study_day(at: DateTime<Utc>, settings: &QueueSettings) -> NaiveDate {
    let local = at + Duration::minutes(i64::from(settings.utc_offset_minutes));
    (local - Duration::hours(i64::from(settings.daily_reset_hour))).date_naive()
}

/// First instant (UTC) of the study day after `day`.
pub fn study_day_end(day: NaiveDate, settings: &QueueSettings) -> DateTime<Utc> {
    let midnight = (day + Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc();
    midnight + Duration::hours(i64::from(settings.daily_reset_hour))
        - Duration::minutes(i64::from(settings.utc_offset_minutes))
}

/// Whether two timestamps fall on the same study day.
pub fn same_study_day(a: DateTime<Utc>, b: DateTime<Utc>, settings: &QueueSettings) -> bool {
    study_day(a, settings) == study_day(b, settings)
}
