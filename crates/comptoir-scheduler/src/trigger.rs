//! Job triggers and their cron-expression rendering.
//!
//! Every trigger compiles down to a 6-field cron expression (seconds
//! first) with the seconds field pinned to zero, so a trigger matches at
//! most once within any given minute.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use cron::Schedule;

use crate::error::{SchedulerError, SchedulerResult};

/// When a job is due to run, expressed in the job's own timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Every day at the given wall-clock time.
    DailyAt(NaiveTime),
    /// Every week on the given weekday at the given wall-clock time.
    WeeklyOn(Weekday, NaiveTime),
    /// At every minute boundary.
    EveryMinute,
    /// Raw 6-field cron expression for schedules the other variants
    /// cannot express.
    Cron(String),
}

impl Trigger {
    /// Daily trigger from an `HH:MM` string.
    pub fn daily_at(at: &str) -> SchedulerResult<Self> {
        Ok(Trigger::DailyAt(parse_time(at)?))
    }

    /// Weekly trigger from a weekday name (`"mon"`, `"monday"`, ...) and
    /// an `HH:MM` string.
    pub fn weekly_on(day: &str, at: &str) -> SchedulerResult<Self> {
        let weekday = day
            .parse::<Weekday>()
            .map_err(|_| SchedulerError::InvalidWeekday(day.to_string()))?;
        Ok(Trigger::WeeklyOn(weekday, parse_time(at)?))
    }

    /// Raw cron trigger. The expression is compiled eagerly so a typo
    /// surfaces here rather than at the first evaluation.
    pub fn cron(expr: &str) -> SchedulerResult<Self> {
        let trigger = Trigger::Cron(expr.to_string());
        trigger.compile()?;
        Ok(trigger)
    }

    /// Canonical 6-field cron expression for this trigger.
    pub fn cron_expression(&self) -> String {
        match self {
            Trigger::DailyAt(at) => format!("0 {} {} * * *", at.minute(), at.hour()),
            Trigger::WeeklyOn(day, at) => {
                format!("0 {} {} * * {}", at.minute(), at.hour(), weekday_token(*day))
            }
            Trigger::EveryMinute => "0 * * * * *".to_string(),
            Trigger::Cron(expr) => expr.clone(),
        }
    }

    /// Compile the trigger into a matchable schedule.
    pub(crate) fn compile(&self) -> SchedulerResult<Schedule> {
        let expr = self.cron_expression();
        Schedule::from_str(&expr).map_err(|e| SchedulerError::InvalidCron {
            expr,
            message: e.to_string(),
        })
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::DailyAt(at) => write!(f, "daily at {}", at.format("%H:%M")),
            Trigger::WeeklyOn(day, at) => {
                write!(f, "weekly on {} at {}", weekday_token(*day), at.format("%H:%M"))
            }
            Trigger::EveryMinute => write!(f, "every minute"),
            Trigger::Cron(expr) => write!(f, "cron {}", expr),
        }
    }
}

fn weekday_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

fn parse_time(at: &str) -> SchedulerResult<NaiveTime> {
    NaiveTime::parse_from_str(at, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(at, "%H:%M:%S"))
        .map_err(|_| SchedulerError::InvalidTime(at.to_string()))
        // Seconds are ignored at minute resolution.
        .map(|t| t.with_second(0).unwrap_or(t))
}
