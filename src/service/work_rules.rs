use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::model::summary::HourBreakdown;

/// Days on which every worked hour counts as holiday work.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    pub weekends: bool,
    pub dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(weekends: bool, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            weekends,
            dates: dates.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        use chrono::{Datelike, Weekday};

        if self.dates.contains(&date) {
            return true;
        }
        self.weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Organization-wide rules for turning punches into hours.
#[derive(Debug, Clone)]
pub struct WorkRules {
    pub timezone: Tz,
    pub standard_daily_hours: Decimal,
    pub late_night_start: NaiveTime,
    pub late_night_end: NaiveTime,
    pub duplicate_window: Duration,
    pub holidays: HolidayCalendar,
}

impl Default for WorkRules {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Tokyo,
            standard_daily_hours: dec!(8),
            late_night_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            late_night_end: NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
            duplicate_window: Duration::minutes(5),
            holidays: HolidayCalendar::new(true, []),
        }
    }
}

/// Rounds to two fraction digits, halves away from zero. The result always
/// carries a scale of two so `9` serializes as `"9.00"`.
pub fn round_hours(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn hours_from_seconds(seconds: i64) -> Decimal {
    round_hours(Decimal::from(seconds.max(0)) / dec!(3600))
}

fn overlap_seconds(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> i64 {
    let from = start.max(window_start);
    let to = end.min(window_end);
    (to - from).num_seconds().max(0)
}

impl WorkRules {
    /// Calendar date of an instant in the organization's time zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    /// Converts a local wall-clock time to UTC. Ambiguous times resolve to the
    /// earlier instant; times inside a DST gap move forward by an hour.
    pub fn local_to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.local_to_utc(date.and_time(NaiveTime::MIN))
    }

    /// Splits the span between a clock-in and a clock-out into the summary
    /// buckets. A clock-out at or before the clock-in yields zero hours.
    pub fn split_hours(&self, clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> HourBreakdown {
        if clock_out <= clock_in {
            return HourBreakdown::zero();
        }

        let total_hours = hours_from_seconds((clock_out - clock_in).num_seconds());
        let overtime_hours = round_hours((total_hours - self.standard_daily_hours).max(Decimal::ZERO));

        let first_day = self.local_date(clock_in);
        let last_day = self.local_date(clock_out);

        // The band that started the evening before the clock-in may still be running.
        let band_from = first_day.pred_opt().unwrap_or(first_day);
        let late_night_seconds: i64 = band_from
            .iter_days()
            .take_while(|day| *day <= last_day)
            .map(|day| {
                let (start, end) = self.late_night_band(day);
                overlap_seconds(clock_in, clock_out, start, end)
            })
            .sum();

        let holiday_seconds: i64 = first_day
            .iter_days()
            .take_while(|day| *day <= last_day)
            .filter(|day| self.holidays.is_holiday(*day))
            .map(|day| {
                let next = day.succ_opt().unwrap_or(day);
                overlap_seconds(
                    clock_in,
                    clock_out,
                    self.start_of_day(day),
                    self.start_of_day(next),
                )
            })
            .sum();

        HourBreakdown {
            total_hours,
            overtime_hours,
            late_night_hours: hours_from_seconds(late_night_seconds).min(total_hours),
            holiday_hours: hours_from_seconds(holiday_seconds).min(total_hours),
        }
    }

    /// Late-night band that starts on `day`. When the end time is not after
    /// the start time the band runs into the next day.
    fn late_night_band(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.local_to_utc(day.and_time(self.late_night_start));
        let end_day = if self.late_night_end <= self.late_night_start {
            day.succ_opt().unwrap_or(day)
        } else {
            day
        };
        let end = self.local_to_utc(end_day.and_time(self.late_night_end));
        (start, end)
    }
}
