//! Resolution of user-facing period selections into the canonical
//! `(days, start_date)` pair every aggregate query consumes.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::warn;

/// System default trailing window, also the fallback for malformed input.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// A user-facing period selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    TrailingDays(u32),
    CurrentMonth,
    CurrentYear,
    CustomRange { start: NaiveDate, end: NaiveDate },
}

/// The resolved time window. All aggregates answering one request receive
/// the identical window so cross-referenced figures stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Always >= 1.
    pub days: u32,
    /// When present, downstream queries anchor at this date instead of a
    /// trailing cutoff.
    pub start_date: Option<NaiveDate>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
            start_date: None,
        }
    }
}

impl PeriodSelector {
    /// Resolve against an explicit instant. Windows anchored at a start
    /// date count whole days elapsed up to `now`, rounded up, minimum 1.
    pub fn resolve_at(self, now: NaiveDateTime) -> TimeWindow {
        let today = now.date();
        match self {
            PeriodSelector::TrailingDays(n) => TimeWindow {
                days: n.max(1),
                start_date: None,
            },
            PeriodSelector::CurrentMonth => {
                let start = today.with_day(1).unwrap_or(today);
                anchored(start, now)
            }
            PeriodSelector::CurrentYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                anchored(start, now)
            }
            PeriodSelector::CustomRange { start, end } => {
                // Same-day ranges resolve to 0 days; fall back to the
                // default width instead of issuing a zero-width query.
                let days = (end - start).num_days().max(0) as u32;
                TimeWindow {
                    days: if days == 0 { DEFAULT_WINDOW_DAYS } else { days },
                    start_date: Some(start),
                }
            }
        }
    }

    /// Resolve against the current instant, on the store's clock (UTC).
    pub fn resolve(self) -> TimeWindow {
        self.resolve_at(Utc::now().naive_utc())
    }
}

fn anchored(start: NaiveDate, now: NaiveDateTime) -> TimeWindow {
    let secs = (now - start.and_time(NaiveTime::MIN)).num_seconds().max(0);
    let days = secs.div_ceil(86_400).max(1) as u32;
    TimeWindow {
        days,
        start_date: Some(start),
    }
}

impl TimeWindow {
    /// Map raw query parameters onto a window, at an explicit instant.
    ///
    /// `period=month|year` wins over explicit dates; a parseable
    /// `startDate` selects a custom range ending at `endDate` (or today);
    /// otherwise `days` selects a trailing window. Malformed dates fall
    /// back to the system default window rather than failing the request.
    pub fn from_params_at(
        days: Option<u32>,
        period: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        now: NaiveDateTime,
    ) -> Self {
        match period {
            Some("month") => return PeriodSelector::CurrentMonth.resolve_at(now),
            Some("year") => return PeriodSelector::CurrentYear.resolve_at(now),
            Some(other) if !other.is_empty() => {
                warn!(period = other, "unknown period selector, ignoring");
            }
            _ => {}
        }

        if let Some(raw) = start_date {
            let Ok(start) = raw.parse::<NaiveDate>() else {
                warn!(start_date = raw, "malformed start date, using default window");
                return Self::default();
            };
            let end = match end_date {
                Some(raw_end) => match raw_end.parse::<NaiveDate>() {
                    Ok(end) => end,
                    Err(_) => {
                        warn!(end_date = raw_end, "malformed end date, using default window");
                        return Self::default();
                    }
                },
                None => now.date(),
            };
            return PeriodSelector::CustomRange { start, end }.resolve_at(now);
        }

        match days {
            Some(n) => PeriodSelector::TrailingDays(n).resolve_at(now),
            None => Self::default(),
        }
    }

    /// Map raw query parameters onto a window at the current instant.
    /// Anchors resolve on the store's clock (UTC) so a window's `days`
    /// and its `since` bound always agree.
    pub fn from_params(
        days: Option<u32>,
        period: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Self {
        Self::from_params_at(days, period, start_date, end_date, Utc::now().naive_utc())
    }

    /// Inclusive lower bound of the window as a UTC-naive instant.
    pub fn since(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self.start_date {
            Some(date) => date.and_time(NaiveTime::MIN),
            None => now - Duration::days(self.days as i64),
        }
    }
}
