//! Arrival-time display. Nothing here touches storage.

use chrono::{DateTime, Local, TimeZone, Timelike};

/// Formats the instant an employee checks in, es-MX 12-hour style.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrivalClock;

impl ArrivalClock {
    /// Time at the moment of the call, e.g. `08:05 a.m.`.
    pub fn now(&self) -> String {
        self.format(&Local::now())
    }

    pub fn format<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> String {
        let (is_pm, hour) = instant.hour12();
        let meridiem = if is_pm { "p.m." } else { "a.m." };
        format!("{hour:02}:{:02} {meridiem}", instant.minute())
    }
}
