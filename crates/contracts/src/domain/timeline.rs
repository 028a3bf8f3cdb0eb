//! Pure timeline evaluation: elapsed stage occupancy classified against the
//! expected duration bands. No I/O, no clock access beyond the `now` passed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::Stage;
use crate::reference::expected_duration;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Warning kicks in past `max`; overdue past `max * 1.5`.
const WARNING_FACTOR_NUM: i64 = 3;
const WARNING_FACTOR_DEN: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimelineStatus {
    OnTrack,
    Warning,
    Overdue,
}

/// The subset of a stage-history entry the evaluator needs.
#[derive(Debug, Clone, Copy)]
pub struct HistoryInterval {
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

/// Classify elapsed occupancy of a stage. Monotonic in `elapsed_days`:
/// increasing elapsed time never moves the result back toward `OnTrack`.
pub fn classify(stage: Stage, elapsed_days: i64) -> TimelineStatus {
    let band = expected_duration(stage);
    if stage.is_terminal() || band.max_days == 0 {
        return TimelineStatus::OnTrack;
    }
    if elapsed_days <= band.max_days {
        TimelineStatus::OnTrack
    } else if elapsed_days * WARNING_FACTOR_DEN <= band.max_days * WARNING_FACTOR_NUM {
        TimelineStatus::Warning
    } else {
        TimelineStatus::Overdue
    }
}

/// Whole days a client has occupied (or did occupy) a stage.
///
/// Closed entries prefer the `duration_seconds` recorded at close time over
/// re-deriving from the timestamps, so a later reformat of the stored dates
/// cannot silently drift the figure.
pub fn elapsed_days(interval: &HistoryInterval, now: DateTime<Utc>) -> i64 {
    let days = match (interval.exited_at, interval.duration_seconds) {
        (Some(_), Some(secs)) if secs > 0 => secs / SECONDS_PER_DAY,
        (Some(exited), _) => (exited - interval.entered_at).num_days(),
        (None, _) => (now - interval.entered_at).num_days(),
    };
    days.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open(entered_days_ago: i64, now: DateTime<Utc>) -> HistoryInterval {
        HistoryInterval {
            entered_at: now - Duration::days(entered_days_ago),
            exited_at: None,
            duration_seconds: None,
        }
    }

    #[test]
    fn terminal_stages_are_always_on_track() {
        assert_eq!(classify(Stage::Won, 0), TimelineStatus::OnTrack);
        assert_eq!(classify(Stage::Won, 10_000), TimelineStatus::OnTrack);
        assert_eq!(classify(Stage::Lost, 500), TimelineStatus::OnTrack);
    }

    #[test]
    fn classification_boundaries() {
        // Lead band is (1, 7): on-track through day 7, warning through 10
        // (7 * 1.5 = 10.5, whole days), overdue after.
        assert_eq!(classify(Stage::Lead, 0), TimelineStatus::OnTrack);
        assert_eq!(classify(Stage::Lead, 7), TimelineStatus::OnTrack);
        assert_eq!(classify(Stage::Lead, 8), TimelineStatus::Warning);
        assert_eq!(classify(Stage::Lead, 10), TimelineStatus::Warning);
        assert_eq!(classify(Stage::Lead, 11), TimelineStatus::Overdue);
    }

    #[test]
    fn classification_is_monotonic() {
        for stage in Stage::ALL {
            let mut worst = TimelineStatus::OnTrack;
            for elapsed in 0..120 {
                let status = classify(stage, elapsed);
                let rank = |s: TimelineStatus| match s {
                    TimelineStatus::OnTrack => 0,
                    TimelineStatus::Warning => 1,
                    TimelineStatus::Overdue => 2,
                };
                assert!(rank(status) >= rank(worst), "{stage} regressed at {elapsed}");
                worst = status;
            }
        }
    }

    #[test]
    fn open_interval_uses_now() {
        let now = Utc::now();
        assert_eq!(elapsed_days(&open(5, now), now), 5);
    }

    #[test]
    fn closed_interval_prefers_recorded_duration() {
        let now = Utc::now();
        let interval = HistoryInterval {
            entered_at: now - Duration::days(30),
            exited_at: Some(now - Duration::days(10)),
            // Recorded at close time as 3 days, which wins over the 20-day
            // gap between the (hypothetically reformatted) timestamps.
            duration_seconds: Some(3 * SECONDS_PER_DAY),
        };
        assert_eq!(elapsed_days(&interval, now), 3);
    }

    #[test]
    fn closed_interval_falls_back_to_date_arithmetic() {
        let now = Utc::now();
        let interval = HistoryInterval {
            entered_at: now - Duration::days(9),
            exited_at: Some(now - Duration::days(2)),
            duration_seconds: None,
        };
        assert_eq!(elapsed_days(&interval, now), 7);
    }

    #[test]
    fn elapsed_never_negative() {
        let now = Utc::now();
        let interval = HistoryInterval {
            entered_at: now + Duration::days(1),
            exited_at: None,
            duration_seconds: None,
        };
        assert_eq!(elapsed_days(&interval, now), 0);
    }
}
