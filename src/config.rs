use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use dotenvy::dotenv;
use rust_decimal::Decimal;

use crate::service::work_rules::{HolidayCalendar, WorkRules};

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_punch_per_min: u32,
    pub rate_protected_per_min: u32,

    // Work rules
    pub timezone: Tz,
    pub standard_work_hours: Decimal,
    pub late_night_start: NaiveTime,
    pub late_night_end: NaiveTime,
    pub duplicate_punch_window_minutes: i64,
    pub weekends_are_holidays: bool,
    pub holidays: Vec<NaiveDate>,

    pub location_cache_ttl: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(name, default)
        .trim()
        .parse()
        .with_context(|| format!("{name} is not valid"))
}

fn parse_time(name: &str, default: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(var_or(name, default).trim(), "%H:%M")
        .with_context(|| format!("{name} must be HH:MM"))
}

fn parse_holidays(raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("HOLIDAYS contains an invalid date: {s}"))
        })
        .collect()
}

const MAX_DUPLICATE_WINDOW_MINUTES: i64 = 24 * 60;

fn check_duplicate_window(minutes: i64) -> Result<i64> {
    anyhow::ensure!(
        (1..=MAX_DUPLICATE_WINDOW_MINUTES).contains(&minutes),
        "DUPLICATE_PUNCH_WINDOW_MINUTES must be between 1 and {MAX_DUPLICATE_WINDOW_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let timezone_name = var_or("APP_TIMEZONE", "Asia/Tokyo");
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|e| anyhow::anyhow!("APP_TIMEZONE {timezone_name:?} is not valid: {e}"))?;

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            api_prefix: var_or("API_PREFIX", "/api/v1"),
            log_dir: var_or("LOG_DIR", "logs"),

            rate_punch_per_min: parse_var("RATE_PUNCH_PER_MIN", "30")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            timezone,
            standard_work_hours: parse_var("STANDARD_WORK_HOURS", "8")?,
            late_night_start: parse_time("LATE_NIGHT_START", "22:00")?,
            late_night_end: parse_time("LATE_NIGHT_END", "05:00")?,
            duplicate_punch_window_minutes: check_duplicate_window(parse_var(
                "DUPLICATE_PUNCH_WINDOW_MINUTES",
                "5",
            )?)?,
            weekends_are_holidays: parse_var("WEEKENDS_ARE_HOLIDAYS", "true")?,
            holidays: parse_holidays(&var_or("HOLIDAYS", ""))?,

            location_cache_ttl: Duration::from_secs(parse_var("LOCATION_CACHE_TTL_SECS", "300")?),
        })
    }

    pub fn work_rules(&self) -> WorkRules {
        WorkRules {
            timezone: self.timezone,
            standard_daily_hours: self.standard_work_hours,
            late_night_start: self.late_night_start,
            late_night_end: self.late_night_end,
            duplicate_window: chrono::Duration::minutes(self.duplicate_punch_window_minutes),
            holidays: HolidayCalendar::new(self.weekends_are_holidays, self.holidays.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holidays_parse_from_comma_separated_list() {
        let dates = parse_holidays("2026-01-01, 2026-01-12,,").unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            ]
        );
        assert!(parse_holidays("").unwrap().is_empty());
        assert!(parse_holidays("2026-13-01").is_err());
    }

    #[test]
    fn duplicate_window_must_be_positive_and_at_most_a_day() {
        assert_eq!(check_duplicate_window(5).unwrap(), 5);
        assert_eq!(check_duplicate_window(1440).unwrap(), 1440);
        let err = check_duplicate_window(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DUPLICATE_PUNCH_WINDOW_MINUTES must be between 1 and 1440, got 0"
        );
        assert!(check_duplicate_window(-5).is_err());
        assert!(check_duplicate_window(1441).is_err());
    }
}
