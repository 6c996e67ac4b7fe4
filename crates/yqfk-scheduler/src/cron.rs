//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Wildcards: *, */N, N, comma lists for minute and hour.
//! Day, month and weekday must be `*`.
//! Example: "10 6 * * *" = every day at 06:10

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use yqfk_core::error::{Result, YqfkError};

/// A parsed daily cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(YqfkError::Config(format!(
                "Invalid cron expression: '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
            )));
        }
        if parts[2..].iter().any(|p| *p != "*") {
            return Err(YqfkError::Config(format!(
                "Invalid cron expression: '{expression}' (day, month and weekday must be '*')"
            )));
        }

        let minutes = parse_field(parts[0], 0, 59).ok_or_else(|| {
            YqfkError::Config(format!("Invalid minute field in cron expression: '{expression}'"))
        })?;
        let hours = parse_field(parts[1], 0, 23).ok_or_else(|| {
            YqfkError::Config(format!("Invalid hour field in cron expression: '{expression}'"))
        })?;

        Ok(Self {
            expression: expression.to_string(),
            minutes,
            hours,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First matching minute strictly after `after`, read off the wall clock
    /// of `tz`.
    pub fn next_after(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        let mut candidate = after.with_timezone(&tz) + Duration::minutes(1);
        candidate = candidate
            .with_second(0)
            .and_then(|c| c.with_nanosecond(0))
            .unwrap_or(candidate);

        // Try up to 48 hours ahead
        for _ in 0..(48 * 60) {
            if self.minutes.contains(&candidate.minute()) && self.hours.contains(&candidate.hour())
            {
                return Some(candidate.with_timezone(&Utc));
            }
            candidate += Duration::minutes(1);
        }

        None
    }
}

/// Parse a cron expression and compute the next run time.
pub fn next_run_from_cron(expression: &str, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    match CronSchedule::parse(expression) {
        Ok(schedule) => schedule.next_after(after, tz),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}

/// Parse a cron field into a list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N — every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated: "0,15,30,45"
    if field.contains(',') {
        let vals = field
            .split(',')
            .map(|s| s.trim().parse().ok())
            .collect::<Option<Vec<u32>>>()?;
        if vals.iter().any(|v| *v < min || *v > max) {
            return None;
        }
        return Some(vals);
    }

    // Single number
    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Shanghai;

    #[test]
    fn test_daily_in_shanghai() {
        // 05:00 in Shanghai
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 21, 0, 0).unwrap();
        let next = next_run_from_cron("10 6 * * *", after, Shanghai).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 21, 22, 10, 0).unwrap());
    }

    #[test]
    fn test_rolls_over_to_next_day() {
        // 06:10:30 in Shanghai, just past today's slot
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 22, 10, 30).unwrap();
        let next = next_run_from_cron("10 6 * * *", after, Shanghai).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 22, 10, 0).unwrap());
    }

    #[test]
    fn test_exact_slot_is_not_repeated() {
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 22, 10, 0).unwrap();
        let next = next_run_from_cron("10 6 * * *", after, Shanghai).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 22, 10, 0).unwrap());
    }

    #[test]
    fn test_every_15_minutes() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();
        let next = next_run_from_cron("*/15 * * * *", after, Shanghai).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn test_comma_list() {
        let schedule = CronSchedule::parse("0,30 8 * * *").unwrap();
        assert_eq!(schedule.expression(), "0,30 8 * * *");
        // 08:05 in Shanghai
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 0, 5, 0).unwrap();
        let next = schedule.next_after(after, Shanghai).unwrap();
        assert_eq!(next.with_timezone(&Shanghai).minute(), 30);
    }

    #[test]
    fn test_invalid_expressions() {
        let after = Utc::now();
        assert!(next_run_from_cron("bad", after, Shanghai).is_none());
        assert!(next_run_from_cron("10 25 * * *", after, Shanghai).is_none());
        assert!(next_run_from_cron("10 6 1 * *", after, Shanghai).is_none());
        assert!(matches!(
            CronSchedule::parse("*/0 6 * * *"),
            Err(YqfkError::Config(_))
        ));
    }
}
