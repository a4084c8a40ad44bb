//! # Midtide Core Library
//!
//! This library finds surf sessions in a multi-day forecast. A session is a
//! fixed-length window centred on the midpoint between a low and a high tide,
//! kept only when it falls inside daylight and the surf and wind at its
//! midpoint are within the configured bounds.
//!
//! ## Data Flow
//! 1. **Fetch**: the [`forecast`] client pulls tides, wave, wind and sunlight
//!    series for one spot (or restores a saved snapshot)
//! 2. **Find**: [`session::find_sessions`] scans the tide extrema, attaches the
//!    nearest wave and wind readings and applies the daylight/size/wind filters
//! 3. **Publish**: [`renderer`] prints a table, [`calendar`] books the sessions
//!
//! Only step 2 carries real logic, and it is pure: no I/O, no clock access,
//! no shared state. The caller passes `now` explicitly.
//!
//! ## Core Types
//! - [`ForecastBundle`]: the four forecast series, each sorted by timestamp
//! - [`OptimizationParams`]: window length and acceptance thresholds
//! - [`SurfSession`]: one accepted window with its surf and wind metrics

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub mod calendar;
pub mod compass;
pub mod config;
pub mod forecast;
pub mod renderer;
pub mod session;


pub use compass::CompassPoint;
pub use session::find_sessions;

/// Timestamps are naive: every series, and `now`, must already share one
/// reference frame (the forecast client localizes to the spot's UTC offset).
pub type Timestamp = NaiveDateTime;

/// Anything positioned on the forecast timeline.
pub trait Timestamped {
    fn timestamp(&self) -> Timestamp;
}

/// Kind of point in the tide series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TideType {
    Low,
    High,
    /// Intermediate height sample between extrema
    Normal,
}

/// A single point of the tide series.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use midtide_lib::{TideEvent, TideType};
///
/// let at = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// let low = TideEvent { timestamp: at, kind: TideType::Low, height: 0.4 };
/// assert!(low.is_extremum());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub kind: TideType,
    /// Height in feet
    pub height: f64,
}

impl TideEvent {
    /// True for LOW and HIGH events, the only ones that form transitions
    pub fn is_extremum(&self) -> bool {
        matches!(self.kind, TideType::Low | TideType::High)
    }
}

/// Surf height range forecast at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSample {
    pub timestamp: Timestamp,
    /// Lower bound of the surf range in feet
    pub surf_min: f64,
    /// Upper bound of the surf range in feet
    pub surf_max: f64,
}

/// Wind reading at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub timestamp: Timestamp,
    /// Speed in the provider's unit (knots for Surfline)
    pub speed: f64,
    /// Direction the wind blows from, in degrees
    pub direction: f64,
}

/// Dawn and dusk for one calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunlightWindow {
    pub dawn: Timestamp,
    pub dusk: Timestamp,
}

impl SunlightWindow {
    /// Date this window is keyed by: the date portion of dawn
    pub fn date(&self) -> NaiveDate {
        self.dawn.date()
    }
}

impl Timestamped for TideEvent {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for WaveSample {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for WindSample {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for SunlightWindow {
    fn timestamp(&self) -> Timestamp {
        self.dawn
    }
}

/// The four forecast series for one spot.
///
/// Each series is sorted ascending by timestamp. The series are independent:
/// they need not share timestamps or cadence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub tides: Vec<TideEvent>,
    pub wave: Vec<WaveSample>,
    pub wind: Vec<WindSample>,
    pub sunlight: Vec<SunlightWindow>,
}

/// Session search parameters.
///
/// Only `length_default`, the wave height band and `wind_speed_max` are
/// enforced. The remaining fields describe filters that are not applied yet;
/// they are accepted and carried so config files can already set them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationParams {
    /// Shortest acceptable session in minutes (not enforced)
    pub length_min: u32,
    /// Session length in minutes, split evenly around the mid-tide point
    pub length_default: u32,
    /// Longest acceptable session in minutes (not enforced)
    pub length_max: u32,
    /// Smallest acceptable surf_max in feet
    pub wave_height_min: f64,
    /// Largest acceptable surf_max in feet
    pub wave_height_max: f64,
    /// Not enforced
    pub swell_period_min: f64,
    /// Not enforced
    pub swell_period_max: f64,
    /// Not enforced
    pub swell_directions: Vec<CompassPoint>,
    pub wind_speed_max: f64,
    /// Fahrenheit, not enforced
    pub water_temp_min: f64,
    /// Hours since last rain, not enforced
    pub time_since_rain: u32,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        OptimizationParams {
            length_min: 30,
            length_default: 60,
            length_max: 120,
            wave_height_min: 2.0,
            wave_height_max: 12.0,
            swell_period_min: 6.0,
            swell_period_max: 15.0,
            swell_directions: Vec::new(),
            wind_speed_max: 8.0,
            water_temp_min: 57.0,
            time_since_rain: 72,
        }
    }
}

/// An accepted surf window.
///
/// Only [`session::find_sessions`] builds these; the fields are public for
/// reading but the value is never mutated after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfSession {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Rounded surf range at the window midpoint
    pub surf_min: f64,
    pub surf_max: f64,
    pub wind_speed: f64,
    pub wind_direction: CompassPoint,
}

impl SurfSession {
    /// Centre of the window, i.e. the mid-tide point it was built from
    pub fn midpoint(&self) -> Timestamp {
        self.start + (self.end - self.start) / 2
    }
}
