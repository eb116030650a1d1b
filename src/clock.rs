//! Source of "current local time"

use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::UavcastError;

/// Supplies the current local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the host, optionally viewed in a fixed time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    /// Host local time
    #[must_use]
    pub fn local() -> Self {
        Self { timezone: None }
    }

    #[must_use]
    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone: Some(timezone),
        }
    }

    /// Clock for an optional IANA zone name, host local time when `None`
    pub fn from_name(name: Option<&str>) -> crate::Result<Self> {
        match name {
            None => Ok(Self::local()),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::in_timezone)
                .map_err(|_| UavcastError::config(format!("unknown time zone '{name}'"))),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
