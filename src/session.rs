//! # Session Finder
//!
//! Turns a [`ForecastBundle`] into the list of surf sessions worth booking.
//!
//! ## Algorithm
//!
//! ### Stage 1: tide-transition scan
//! The tide series is folded left to right carrying the last LOW and last
//! HIGH timestamps seen. Every LOW or HIGH that arrives while an event of the
//! opposite type is already recorded completes a transition, and the
//! transition's midpoint `last_low + (last_high - last_low) / 2` becomes a
//! candidate when it is not in the past (`mid >= now`).
//!
//! The scan starts at the latest extremum at or before `now`, so transitions
//! that ended long ago are never considered. When every extremum lies in the
//! future the whole series is scanned.
//!
//! ### Stage 2: metric attachment
//! The wave and wind samples closest to each midpoint are located by binary
//! search. An exact tie between two neighbours resolves to the earlier one.
//!
//! ### Stage 3: filters
//! A candidate survives only if the start date has a sunlight window with
//! `dawn < start` and `dusk > end`, `wave_height_min <= surf_max <=
//! wave_height_max`, and `wind_speed <= wind_speed_max`.
//!
//! Only the date of `start` is consulted for daylight, and `wave_height_min`
//! is checked against `surf_max` rather than `surf_min`. Both are deliberate
//! and covered by tests.
//!
//! Nothing here returns an error: empty series, missing transitions and
//! missing sunlight all simply yield fewer (or no) sessions.

use crate::{
    CompassPoint, ForecastBundle, OptimizationParams, SunlightWindow, SurfSession, TideEvent,
    TideType, Timestamp, Timestamped,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Find every acceptable surf session in `bundle`, in chronological order.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use midtide_lib::{find_sessions, ForecastBundle, OptimizationParams};
///
/// let now = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap().and_hms_opt(7, 0, 0).unwrap();
/// let sessions = find_sessions(&ForecastBundle::default(), &OptimizationParams::default(), now);
/// assert!(sessions.is_empty());
/// ```
pub fn find_sessions(
    bundle: &ForecastBundle,
    params: &OptimizationParams,
    now: Timestamp,
) -> Vec<SurfSession> {
    let candidates = candidate_sessions(bundle, params, now);
    let daylight = sunlight_by_date(&bundle.sunlight);

    let sessions: Vec<SurfSession> = candidates
        .into_iter()
        .filter(|session| {
            let keep = in_daylight(session, &daylight)
                && size_ok(session, params)
                && wind_ok(session, params);
            if !keep {
                debug!(start = %session.start, surf_max = session.surf_max,
                    wind_speed = session.wind_speed, "rejected candidate session");
            }
            keep
        })
        .collect();

    debug!(count = sessions.len(), "surf sessions found");
    sessions
}

/// Stages 1 and 2 only: every upcoming mid-tide window with its metrics
/// attached, before any filtering.
///
/// [`find_sessions`] always returns a subsequence of this list.
pub fn candidate_sessions(
    bundle: &ForecastBundle,
    params: &OptimizationParams,
    now: Timestamp,
) -> Vec<SurfSession> {
    if bundle.tides.is_empty()
        || bundle.wave.is_empty()
        || bundle.wind.is_empty()
        || bundle.sunlight.is_empty()
    {
        debug!(
            tides = bundle.tides.len(),
            wave = bundle.wave.len(),
            wind = bundle.wind.len(),
            sunlight = bundle.sunlight.len(),
            "forecast has an empty series, no sessions"
        );
        return Vec::new();
    }

    let half = half_length(params.length_default);

    tide_midpoints(&bundle.tides, now)
        .into_iter()
        .filter_map(|mid| {
            let wave = nearest_sample(&bundle.wave, mid)?;
            let wind = nearest_sample(&bundle.wind, mid)?;
            Some(SurfSession {
                start: mid - half,
                end: mid + half,
                surf_min: wave.surf_min.round(),
                surf_max: wave.surf_max.round(),
                wind_speed: wind.speed,
                wind_direction: CompassPoint::from_degrees(wind.direction),
            })
        })
        .collect()
}

/// Mid-tide points of every LOW/HIGH transition that are at or after `now`.
pub fn tide_midpoints(tides: &[TideEvent], now: Timestamp) -> Vec<Timestamp> {
    let anchor = tides
        .iter()
        .filter(|event| event.is_extremum() && event.timestamp <= now)
        .map(|event| event.timestamp)
        .max();

    let scan = tides
        .iter()
        .filter(|event| anchor.map_or(true, |a| event.timestamp >= a))
        .fold(TideScan::default(), |scan, event| scan.step(event, now));

    if scan.midpoints.is_empty() {
        debug!(events = tides.len(), "no upcoming low/high transition");
    }
    scan.midpoints
}

/// Fold state for the tide scan.
#[derive(Default)]
struct TideScan {
    last_low: Option<Timestamp>,
    last_high: Option<Timestamp>,
    midpoints: Vec<Timestamp>,
}

impl TideScan {
    fn step(mut self, event: &TideEvent, now: Timestamp) -> Self {
        let completed = match event.kind {
            TideType::Low => {
                self.last_low = Some(event.timestamp);
                self.last_high.is_some()
            }
            TideType::High => {
                self.last_high = Some(event.timestamp);
                self.last_low.is_some()
            }
            TideType::Normal => false,
        };

        if completed {
            if let (Some(low), Some(high)) = (self.last_low, self.last_high) {
                let mid = midpoint(low, high);
                if mid >= now {
                    self.midpoints.push(mid);
                }
            }
        }
        self
    }
}

/// Arithmetic mean of two instants; argument order does not matter.
pub fn midpoint(a: Timestamp, b: Timestamp) -> Timestamp {
    a + (b - a) / 2
}

/// Sample of a sorted `series` closest to `at`, the earlier one on a tie.
///
/// Returns `None` only for an empty series.
pub fn nearest_sample<T: Timestamped>(series: &[T], at: Timestamp) -> Option<&T> {
    // First index whose timestamp is not before `at`
    let idx = series.partition_point(|s| s.timestamp() < at);

    match (idx.checked_sub(1).map(|i| &series[i]), series.get(idx)) {
        (Some(before), Some(after)) => {
            if at - before.timestamp() <= after.timestamp() - at {
                Some(before)
            } else {
                Some(after)
            }
        }
        (Some(before), None) => Some(before),
        (None, after) => after,
    }
}

fn half_length(length_minutes: u32) -> Duration {
    Duration::seconds(i64::from(length_minutes) * 30)
}

/// One sunlight window per dawn date; the first entry wins on duplicates.
fn sunlight_by_date(sunlight: &[SunlightWindow]) -> BTreeMap<NaiveDate, SunlightWindow> {
    let mut by_date = BTreeMap::new();
    for window in sunlight {
        by_date.entry(window.date()).or_insert(*window);
    }
    by_date
}

fn in_daylight(session: &SurfSession, daylight: &BTreeMap<NaiveDate, SunlightWindow>) -> bool {
    match daylight.get(&session.start.date()) {
        Some(window) => window.dawn < session.start && window.dusk > session.end,
        None => false,
    }
}

fn size_ok(session: &SurfSession, params: &OptimizationParams) -> bool {
    params.wave_height_min <= session.surf_max && session.surf_max <= params.wave_height_max
}

fn wind_ok(session: &SurfSession, params: &OptimizationParams) -> bool {
    session.wind_speed <= params.wind_speed_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WaveSample;

    fn at(hour: u32, min: u32, sec: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2022, 3, 15)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn wave(hour: u32, min: u32, max: f64) -> WaveSample {
        WaveSample {
            timestamp: at(hour, min, 0),
            surf_min: max - 1.0,
            surf_max: max,
        }
    }

    #[test]
    fn test_midpoint_is_order_independent() {
        assert_eq!(midpoint(at(8, 0, 0), at(14, 10, 0)), at(11, 5, 0));
        assert_eq!(midpoint(at(14, 10, 0), at(8, 0, 0)), at(11, 5, 0));
        assert_eq!(midpoint(at(14, 10, 0), at(20, 5, 0)), at(17, 7, 30));
    }

    #[test]
    fn test_nearest_sample_picks_closest() {
        let series = vec![wave(6, 0, 1.0), wave(9, 0, 2.0), wave(12, 0, 3.0)];
        assert_eq!(nearest_sample(&series, at(8, 0, 0)).unwrap().surf_max, 2.0);
        assert_eq!(nearest_sample(&series, at(10, 31, 0)).unwrap().surf_max, 3.0);
        assert_eq!(nearest_sample(&series, at(9, 0, 0)).unwrap().surf_max, 2.0);
    }

    #[test]
    fn test_nearest_sample_tie_goes_to_earlier() {
        let series = vec![wave(9, 0, 2.0), wave(11, 0, 3.0)];
        assert_eq!(nearest_sample(&series, at(10, 0, 0)).unwrap().surf_max, 2.0);
        // One second later the later sample is strictly closer
        assert_eq!(nearest_sample(&series, at(10, 0, 1)).unwrap().surf_max, 3.0);
    }

    #[test]
    fn test_nearest_sample_clamps_at_edges() {
        let series = vec![wave(9, 0, 2.0), wave(11, 0, 3.0)];
        assert_eq!(nearest_sample(&series, at(0, 0, 0)).unwrap().surf_max, 2.0);
        assert_eq!(nearest_sample(&series, at(23, 0, 0)).unwrap().surf_max, 3.0);
        assert!(nearest_sample::<WaveSample>(&[], at(9, 0, 0)).is_none());
    }

    #[test]
    fn test_half_length_handles_odd_minutes() {
        assert_eq!(half_length(60), Duration::minutes(30));
        assert_eq!(half_length(45), Duration::seconds(1350));
    }
}
