//! Trading-session windows.
//!
//! Sessions are defined in exchange-local time (`America/New_York`) and
//! converted to UTC per trading date, so the window follows daylight saving.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tickbar_types::{SessionError, TradeRecord};

/// A trading session on a trading date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    /// Every record of the date, unfiltered.
    #[default]
    All,
    /// Previous day 18:00 to 16:15.
    Electronic,
    /// 09:30 to 16:15.
    Regular,
    /// Previous day 18:00 to 17:00.
    Extended,
}

impl Session {
    /// Returns the half-open UTC window `[start, end)` of this session on
    /// `date`, or `None` for [`Session::All`].
    ///
    /// # Errors
    ///
    /// Returns an error if a local boundary falls in a daylight-saving gap.
    pub fn window(
        &self,
        date: NaiveDate,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, SessionError> {
        let (start_day, start, end) = match self {
            Self::All => return Ok(None),
            Self::Electronic => (date - TimeDelta::days(1), hm(18, 0), hm(16, 15)),
            Self::Regular => (date, hm(9, 30), hm(16, 15)),
            Self::Extended => (date - TimeDelta::days(1), hm(18, 0), hm(17, 0)),
        };
        Ok(Some((to_utc(start_day, start)?, to_utc(date, end)?)))
    }

    /// Keeps only the records inside this session's window on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be computed.
    pub fn filter(
        &self,
        date: NaiveDate,
        mut records: Vec<TradeRecord>,
    ) -> Result<Vec<TradeRecord>, SessionError> {
        if let Some((start, end)) = self.window(date)? {
            records.retain(|r| r.event_time >= start && r.event_time < end);
        }
        Ok(records)
    }

    /// Returns the session as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Electronic => "electronic",
            Self::Regular => "regular",
            Self::Extended => "extended",
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "electronic" | "eth" => Ok(Self::Electronic),
            "regular" | "rth" => Ok(Self::Regular),
            "extended" => Ok(Self::Extended),
            _ => Err(format!(
                "invalid session '{s}', expected one of: all, electronic, regular, extended"
            )),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn to_utc(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, SessionError> {
    let local = date.and_time(time);
    New_York
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(SessionError::NonexistentLocalTime(local, "America/New_York"))
}
