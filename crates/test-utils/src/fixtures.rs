//! Common fixtures shared across the test suites.

use chrono::{DateTime, NaiveDate, Utc};

use obs_common::{BoundingBox, Point, TemporalInterval, TimeStamp};

/// A station fixture: `(code, name, lon, lat)`.
pub type StationFixture = (&'static str, &'static str, f64, f64);

/// Four well-separated stations inside [`test_bbox`].
pub const STATIONS: [StationFixture; 4] = [
    ("10637", "Frankfurt", 8.6, 50.05),
    ("10384", "Berlin", 13.4, 52.47),
    ("10865", "Munich", 11.55, 48.13),
    ("10147", "Hamburg", 10.0, 53.63),
];

/// Bounding box covering all station fixtures with margin.
pub fn test_bbox() -> BoundingBox {
    BoundingBox::new(5.0, 47.0, 15.0, 55.0)
}

/// The point of a station fixture.
pub fn station_point(fixture: &StationFixture) -> Point {
    Point::new(fixture.2, fixture.3)
}

/// A date at the start of the canonical test window.
pub fn test_date(day_offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1 + day_offset).expect("valid fixture date")
}

/// A date timestamp inside the canonical test window.
pub fn date_stamp(day_offset: u32) -> TimeStamp {
    TimeStamp::Date(test_date(day_offset))
}

/// A UTC date-time at an hour offset into the canonical test day.
pub fn hour_stamp(hour_offset: u32) -> TimeStamp {
    let base: DateTime<Utc> = test_date(0)
        .and_hms_opt(0, 0, 0)
        .expect("valid fixture time")
        .and_utc();
    TimeStamp::DateTime(base + chrono::Duration::hours(hour_offset as i64))
}

/// A daily interval over the first `days` of the test window.
pub fn daily_interval(days: u32) -> TemporalInterval {
    TemporalInterval::dates(test_date(0), test_date(days - 1), 1).expect("valid fixture interval")
}

/// An hourly interval over the first `hours` of the test day.
pub fn hourly_interval(hours: u32) -> TemporalInterval {
    let TimeStamp::DateTime(begin) = hour_stamp(0) else {
        unreachable!()
    };
    let TimeStamp::DateTime(end) = hour_stamp(hours - 1) else {
        unreachable!()
    };
    TemporalInterval::date_times(begin, end, 3600).expect("valid fixture interval")
}
