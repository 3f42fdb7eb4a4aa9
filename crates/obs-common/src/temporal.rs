//! Temporal intervals over date or date-time granularity.
//!
//! An interval is an immutable `(begin, end, step)` triple producing a lazy,
//! restartable sequence of discrete time points, inclusive of `begin` and of
//! `end` when `end` falls on the step grid. Interpolation math never sees
//! chrono types directly: every time point maps to a scalar offset in seconds
//! since the Unix epoch, and that mapping is exactly invertible for the
//! discretized samples an interval produces.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, Result};

/// A discrete time point at one of the two supported granularities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TimeStamp {
    /// Whole-day granularity.
    Date(NaiveDate),
    /// Sub-day granularity, always UTC.
    DateTime(DateTime<Utc>),
}

impl TimeStamp {
    /// Convert to the interpolation scalar: seconds since the Unix epoch.
    ///
    /// Dates map to midnight UTC. The mapping is monotonic and exact at
    /// 1-second resolution, so converting back via
    /// [`TemporalInterval::timestamp_at_scalar`] recovers the same point.
    pub fn as_scalar(&self) -> f64 {
        match self {
            TimeStamp::Date(d) => d.and_time(NaiveTime::MIN).and_utc().timestamp() as f64,
            TimeStamp::DateTime(dt) => dt.timestamp() as f64,
        }
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TimeStamp::DateTime(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl std::str::FromStr for TimeStamp {
    type Err = CommonError;

    fn from_str(text: &str) -> Result<Self> {
        if text.contains('T') {
            Ok(TimeStamp::DateTime(parse_date_time(text)?))
        } else {
            Ok(TimeStamp::Date(parse_date(text)?))
        }
    }
}

/// The temporal granularity of an interval or grid time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// Whole days.
    Date,
    /// Seconds, UTC.
    DateTime,
}

impl Granularity {
    /// Convert an epoch-seconds scalar to a time point at this granularity.
    ///
    /// Returns `None` for scalars outside chrono's representable range.
    pub fn timestamp_at(&self, scalar: f64) -> Option<TimeStamp> {
        let secs = scalar.round() as i64;
        let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(match self {
            Granularity::Date => TimeStamp::Date(dt.date_naive()),
            Granularity::DateTime => TimeStamp::DateTime(dt),
        })
    }
}

/// An immutable begin/end/step time range.
///
/// The two variants cover the two temporal granularities the engine accepts;
/// every operation is granularity-preserving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalInterval {
    /// Whole-day steps over a date range.
    Dates {
        begin: NaiveDate,
        end: NaiveDate,
        step_days: i64,
    },
    /// Second-resolution steps over a date-time range.
    DateTimes {
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        step_seconds: i64,
    },
}

impl TemporalInterval {
    /// Create a date-granularity interval.
    pub fn dates(begin: NaiveDate, end: NaiveDate, step_days: i64) -> Result<Self> {
        if begin > end {
            return Err(CommonError::InvalidInterval(format!(
                "begin {begin} is after end {end}"
            )));
        }
        if step_days <= 0 {
            return Err(CommonError::InvalidInterval(format!(
                "step must be positive, got {step_days} days"
            )));
        }
        Ok(Self::Dates {
            begin,
            end,
            step_days,
        })
    }

    /// Create a date-time-granularity interval.
    ///
    /// Steps below one second are rejected: the engine's time scalar has
    /// 1-second resolution.
    pub fn date_times(
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        step_seconds: i64,
    ) -> Result<Self> {
        if begin > end {
            return Err(CommonError::InvalidInterval(format!(
                "begin {begin} is after end {end}"
            )));
        }
        if step_seconds <= 0 {
            return Err(CommonError::InvalidInterval(format!(
                "step must be positive, got {step_seconds} seconds"
            )));
        }
        Ok(Self::DateTimes {
            begin,
            end,
            step_seconds,
        })
    }

    /// Parse the lexical form `begin/end/step` with an ISO 8601 duration step.
    ///
    /// Granularity is detected from the bounds: `2024-03-01/2024-03-10/P1D`
    /// is a date interval, `2024-03-01T00:00:00Z/2024-03-02T00:00:00Z/PT6H`
    /// a date-time interval. Date intervals require a whole-day step.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(CommonError::InvalidInterval(format!(
                "expected begin/end/step, got {} parts",
                parts.len()
            )));
        }
        let step_seconds = parse_iso_duration(parts[2])?;

        if parts[0].contains('T') {
            let begin = parse_date_time(parts[0])?;
            let end = parse_date_time(parts[1])?;
            Self::date_times(begin, end, step_seconds)
        } else {
            let begin = parse_date(parts[0])?;
            let end = parse_date(parts[1])?;
            if step_seconds % 86_400 != 0 {
                return Err(CommonError::InvalidInterval(format!(
                    "date interval requires a whole-day step, got {step_seconds}s"
                )));
            }
            Self::dates(begin, end, step_seconds / 86_400)
        }
    }

    /// The number of discrete samples in `[begin, end]` at the given step.
    ///
    /// Always at least 1; equals the number of items [`Self::iter`] yields.
    pub fn steps(&self) -> usize {
        match self {
            Self::Dates {
                begin,
                end,
                step_days,
            } => ((*end - *begin).num_days() / step_days + 1) as usize,
            Self::DateTimes {
                begin,
                end,
                step_seconds,
            } => ((*end - *begin).num_seconds() / step_seconds + 1) as usize,
        }
    }

    /// The time point at a given step ordinal (`0..steps()`).
    pub fn timestamp_at_step(&self, step: usize) -> TimeStamp {
        match self {
            Self::Dates {
                begin, step_days, ..
            } => TimeStamp::Date(*begin + chrono::Duration::days(step_days * step as i64)),
            Self::DateTimes {
                begin,
                step_seconds,
                ..
            } => TimeStamp::DateTime(
                *begin + chrono::Duration::seconds(step_seconds * step as i64),
            ),
        }
    }

    /// A lazy, restartable iterator over the interval's time points.
    pub fn iter(&self) -> TimeSteps<'_> {
        TimeSteps {
            interval: self,
            index: 0,
            total: self.steps(),
        }
    }

    /// Parse a timestamp literal at this interval's granularity.
    pub fn parse_timestamp(&self, text: &str) -> Result<TimeStamp> {
        match self {
            Self::Dates { .. } => Ok(TimeStamp::Date(parse_date(text)?)),
            Self::DateTimes { .. } => Ok(TimeStamp::DateTime(parse_date_time(text)?)),
        }
    }

    /// The granularity of this interval.
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Dates { .. } => Granularity::Date,
            Self::DateTimes { .. } => Granularity::DateTime,
        }
    }

    /// Convert an epoch-seconds scalar back to a time point at this
    /// interval's granularity.
    ///
    /// Returns `None` for scalars outside chrono's representable range.
    /// For any scalar produced by [`TimeStamp::as_scalar`] on a point this
    /// interval yields, the result is that same point.
    pub fn timestamp_at_scalar(&self, scalar: f64) -> Option<TimeStamp> {
        self.granularity().timestamp_at(scalar)
    }

    /// Scalar of the first time point.
    pub fn begin_scalar(&self) -> f64 {
        self.timestamp_at_step(0).as_scalar()
    }

    /// Scalar of the last time point on the step grid.
    pub fn end_scalar(&self) -> f64 {
        self.timestamp_at_step(self.steps() - 1).as_scalar()
    }

    /// Scalar width of one step, in seconds.
    pub fn step_scalar(&self) -> f64 {
        match self {
            Self::Dates { step_days, .. } => (step_days * 86_400) as f64,
            Self::DateTimes { step_seconds, .. } => *step_seconds as f64,
        }
    }
}

/// Iterator over an interval's discrete time points.
#[derive(Debug, Clone)]
pub struct TimeSteps<'a> {
    interval: &'a TemporalInterval,
    index: usize,
    total: usize,
}

impl Iterator for TimeSteps<'_> {
    type Item = TimeStamp;

    fn next(&mut self) -> Option<TimeStamp> {
        if self.index >= self.total {
            return None;
        }
        let ts = self.interval.timestamp_at_step(self.index);
        self.index += 1;
        Some(ts)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TimeSteps<'_> {}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| CommonError::TimeParse {
        value: text.trim().to_string(),
        expected: "YYYY-MM-DD",
    })
}

fn parse_date_time(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Zone-less literals are common in query strings; treat them as UTC.
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(CommonError::TimeParse {
        value: text.to_string(),
        expected: "RFC 3339 date-time",
    })
}

/// Parse a restricted ISO 8601 duration (`P2D`, `PT6H`, `P1DT12H30M`, ...)
/// into whole seconds. Year and month designators are not supported.
fn parse_iso_duration(text: &str) -> Result<i64> {
    let text = text.trim();
    let body = text
        .strip_prefix('P')
        .or_else(|| text.strip_prefix('p'))
        .ok_or_else(|| CommonError::DurationParse(text.to_string()))?;

    let mut total: i64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for ch in body.chars() {
        match ch {
            'T' | 't' => {
                if in_time || !number.is_empty() {
                    return Err(CommonError::DurationParse(text.to_string()));
                }
                in_time = true;
            }
            '0'..='9' => number.push(ch),
            'D' | 'd' | 'H' | 'h' | 'M' | 'm' | 'S' | 's' => {
                let value: i64 = number
                    .parse()
                    .map_err(|_| CommonError::DurationParse(text.to_string()))?;
                number.clear();
                saw_component = true;
                let factor = match (ch.to_ascii_uppercase(), in_time) {
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return Err(CommonError::DurationParse(text.to_string())),
                };
                total += value * factor;
            }
            _ => return Err(CommonError::DurationParse(text.to_string())),
        }
    }

    if !saw_component || !number.is_empty() || total <= 0 {
        return Err(CommonError::DurationParse(text.to_string()));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_steps_matches_iteration() {
        let interval = TemporalInterval::dates(date(2024, 3, 1), date(2024, 3, 10), 2).unwrap();
        let points: Vec<TimeStamp> = interval.iter().collect();
        assert_eq!(points.len(), interval.steps());
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], TimeStamp::Date(date(2024, 3, 1)));
        assert_eq!(points[4], TimeStamp::Date(date(2024, 3, 9)));
    }

    #[test]
    fn test_steps_inclusive_end_on_grid() {
        let interval = TemporalInterval::date_times(
            utc("2024-03-01T00:00:00Z"),
            utc("2024-03-01T12:00:00Z"),
            3 * 3600,
        )
        .unwrap();
        let points: Vec<TimeStamp> = interval.iter().collect();
        assert_eq!(interval.steps(), 5);
        assert_eq!(points.last().copied().unwrap().as_scalar(), interval.end_scalar());
    }

    #[test]
    fn test_iterator_is_restartable() {
        let interval = TemporalInterval::dates(date(2024, 1, 1), date(2024, 1, 3), 1).unwrap();
        let first: Vec<TimeStamp> = interval.iter().collect();
        let second: Vec<TimeStamp> = interval.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scalar_round_trip() {
        let interval = TemporalInterval::date_times(
            utc("2024-03-01T06:30:00Z"),
            utc("2024-03-02T06:30:00Z"),
            3600,
        )
        .unwrap();
        for ts in interval.iter() {
            let back = interval.timestamp_at_scalar(ts.as_scalar()).unwrap();
            assert_eq!(back, ts);
        }

        let interval = TemporalInterval::dates(date(2024, 3, 1), date(2024, 3, 20), 3).unwrap();
        for ts in interval.iter() {
            let back = interval.timestamp_at_scalar(ts.as_scalar()).unwrap();
            assert_eq!(back, ts);
        }
    }

    #[test]
    fn test_invalid_intervals() {
        assert!(TemporalInterval::dates(date(2024, 3, 10), date(2024, 3, 1), 1).is_err());
        assert!(TemporalInterval::dates(date(2024, 3, 1), date(2024, 3, 10), 0).is_err());
        assert!(TemporalInterval::date_times(
            utc("2024-03-01T00:00:00Z"),
            utc("2024-03-02T00:00:00Z"),
            -60,
        )
        .is_err());
    }

    #[test]
    fn test_parse_timestamp_granularity() {
        let dates = TemporalInterval::dates(date(2024, 1, 1), date(2024, 1, 5), 1).unwrap();
        assert_eq!(
            dates.parse_timestamp("2024-01-03").unwrap(),
            TimeStamp::Date(date(2024, 1, 3))
        );
        assert!(dates.parse_timestamp("03.01.2024").is_err());

        let times = TemporalInterval::date_times(
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-02T00:00:00Z"),
            3600,
        )
        .unwrap();
        assert_eq!(
            times.parse_timestamp("2024-01-01T06:00:00Z").unwrap(),
            TimeStamp::DateTime(utc("2024-01-01T06:00:00Z"))
        );
        assert_eq!(
            times.parse_timestamp("2024-01-01T06:00:00").unwrap(),
            TimeStamp::DateTime(utc("2024-01-01T06:00:00Z"))
        );
        assert!(times.parse_timestamp("not-a-time").is_err());
    }

    #[test]
    fn test_parse_interval_lexical_forms() {
        let dates = TemporalInterval::parse("2024-03-01/2024-03-10/P1D").unwrap();
        assert_eq!(dates.steps(), 10);

        let times =
            TemporalInterval::parse("2024-03-01T00:00:00Z/2024-03-02T00:00:00Z/PT6H").unwrap();
        assert_eq!(times.steps(), 5);

        // Sub-day step on a date interval is rejected.
        assert!(TemporalInterval::parse("2024-03-01/2024-03-10/PT6H").is_err());
        assert!(TemporalInterval::parse("2024-03-01/2024-03-10").is_err());
    }

    #[test]
    fn test_timestamp_from_str() {
        assert_eq!(
            "2024-03-05".parse::<TimeStamp>().unwrap(),
            TimeStamp::Date(date(2024, 3, 5))
        );
        assert_eq!(
            "2024-03-05T06:00:00Z".parse::<TimeStamp>().unwrap(),
            TimeStamp::DateTime(utc("2024-03-05T06:00:00Z"))
        );
        assert!("05.03.2024".parse::<TimeStamp>().is_err());
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_iso_duration("P1D").unwrap(), 86_400);
        assert_eq!(parse_iso_duration("PT6H").unwrap(), 21_600);
        assert_eq!(parse_iso_duration("P1DT12H30M").unwrap(), 131_400);
        assert_eq!(parse_iso_duration("PT90S").unwrap(), 90);
        assert!(parse_iso_duration("P").is_err());
        assert!(parse_iso_duration("PT").is_err());
        assert!(parse_iso_duration("1D").is_err());
        assert!(parse_iso_duration("P6H").is_err());
    }
}
