//! # Forecast Fetching and Snapshots
//!
//! This module pulls the four forecast series for one spot from the Surfline
//! "kbyg" API and keeps the last result on disk so repeated runs do not hit
//! the network.
//!
//! ## Data Source
//! Four GET requests, one per series:
//! - `/kbyg/spots/forecasts/tides`: LOW / HIGH / NORMAL tide points
//! - `/kbyg/spots/forecasts/wave`: surf height range
//! - `/kbyg/spots/forecasts/wind`: speed and direction
//! - `/kbyg/spots/forecasts/weather`: `sunlightTimes` (dawn and dusk per day)
//!
//! Every sample carries a unix timestamp plus the spot's UTC offset in hours.
//! Timestamps are shifted by their own offset into spot-local naive time, which
//! is the frame the session finder works in. Each series is sorted after
//! decoding since the finder relies on ascending order.
//!
//! ## Snapshots
//! A [`ForecastSnapshot`] wraps the bundle with the spot id, fetch time and
//! UTC offset. It is stored as JSON; freshness is judged by the file's
//! modification time, like any other cache file.

use crate::config::{ForecastConfig, SpotConfig};
use crate::{ForecastBundle, SunlightWindow, TideEvent, TideType, Timestamp, WaveSample, WindSample};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fs, io, time::SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from fetching, decoding or persisting a forecast.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Snapshot JSON could not be encoded or decoded
    #[error("snapshot decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// Snapshot file operations failed
    #[error("snapshot IO: {0}")]
    Snapshot(#[from] io::Error),

    /// Snapshot exists but is older than the allowed age
    #[error("snapshot is stale ({age_secs}s old)")]
    Stale { age_secs: u64 },

    /// Provider sent a timestamp chrono cannot represent
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(i64),

    /// UTC offset that is not finite or pushes a timestamp out of range
    #[error("invalid UTC offset {0} hours")]
    InvalidOffset(f64),
}

/// A fetched forecast plus the metadata needed to reuse it later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub spot_id: String,
    pub fetched_at: DateTime<Utc>,
    /// Offset used to localize the bundle, taken from the first tide sample
    pub utc_offset_hours: f64,
    pub bundle: ForecastBundle,
}

impl ForecastSnapshot {
    /// Express a UTC instant in the bundle's local frame
    pub fn local_now(&self, utc_now: DateTime<Utc>) -> Result<Timestamp, ForecastError> {
        shift(utc_now.naive_utc(), self.utc_offset_hours)
    }
}

/// Client for the Surfline spot forecast endpoints.
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ForecastClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch all four series for `spot_id` and build a localized snapshot.
    pub async fn fetch(
        &self,
        spot_id: &str,
        days: u32,
        interval_hours: u32,
    ) -> Result<ForecastSnapshot, ForecastError> {
        info!(spot_id, days, interval_hours, "fetching forecast");

        let tides: Envelope<TidesData> = self.get("tides", spot_id, days, interval_hours).await?;
        let wave: Envelope<WaveData> = self.get("wave", spot_id, days, interval_hours).await?;
        let wind: Envelope<WindData> = self.get("wind", spot_id, days, interval_hours).await?;
        let weather: Envelope<WeatherData> =
            self.get("weather", spot_id, days, interval_hours).await?;

        let utc_offset_hours = tides.data.tides.first().map_or(0.0, |t| t.utc_offset);
        let bundle = ForecastBundle {
            tides: tides.data.into_events()?,
            wave: wave.data.into_samples()?,
            wind: wind.data.into_samples()?,
            sunlight: weather.data.into_windows()?,
        };
        debug!(
            tides = bundle.tides.len(),
            wave = bundle.wave.len(),
            wind = bundle.wind.len(),
            sunlight = bundle.sunlight.len(),
            "forecast decoded"
        );

        Ok(ForecastSnapshot {
            spot_id: spot_id.to_string(),
            fetched_at: Utc::now(),
            utc_offset_hours,
            bundle,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        kind: &str,
        spot_id: &str,
        days: u32,
        interval_hours: u32,
    ) -> Result<T, ForecastError> {
        let url = format!("{}/kbyg/spots/forecasts/{}", self.base_url, kind);
        let body = self
            .http
            .get(&url)
            .query(&[
                ("spotId", spot_id.to_string()),
                ("days", days.to_string()),
                ("intervalHours", interval_hours.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(body)
    }
}

/// Cache-first retrieval: reuse a fresh snapshot, otherwise fetch and save.
///
/// A failed save is logged and ignored; the fetched data is still returned.
pub async fn fetch_or_load(
    client: &ForecastClient,
    spot: &SpotConfig,
    settings: &ForecastConfig,
) -> Result<ForecastSnapshot, ForecastError> {
    let max_age = std::time::Duration::from_secs(settings.cache_ttl_minutes * 60);
    match load_snapshot(&settings.snapshot_path, Some(max_age)) {
        Ok(snapshot) if snapshot.spot_id == spot.id => {
            info!(path = %settings.snapshot_path, "using cached forecast snapshot");
            return Ok(snapshot);
        }
        Ok(_) => debug!("cached snapshot is for another spot"),
        Err(e) => debug!(error = %e, "no usable snapshot"),
    }

    let snapshot = client.fetch(&spot.id, spot.days, spot.interval_hours).await?;
    if let Err(e) = save_snapshot(&settings.snapshot_path, &snapshot) {
        warn!(error = %e, "could not save forecast snapshot");
    }
    Ok(snapshot)
}

/// Write a snapshot as JSON, creating parent directories as needed.
pub fn save_snapshot<P: AsRef<Path>>(
    path: P,
    snapshot: &ForecastSnapshot,
) -> Result<(), ForecastError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(snapshot)?)?;
    debug!(path = %path.display(), "forecast snapshot saved");
    Ok(())
}

/// Read a snapshot, rejecting it when older than `max_age` (if given).
pub fn load_snapshot<P: AsRef<Path>>(
    path: P,
    max_age: Option<std::time::Duration>,
) -> Result<ForecastSnapshot, ForecastError> {
    let path = path.as_ref();

    if let Some(max_age) = max_age {
        let modified = fs::metadata(path)?.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .map_err(|_| io::Error::other("snapshot modified in the future"))?;
        if age > max_age {
            return Err(ForecastError::Stale {
                age_secs: age.as_secs(),
            });
        }
    }

    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

// -- Provider payloads --

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct TidesData {
    tides: Vec<RawTide>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTide {
    timestamp: i64,
    utc_offset: f64,
    #[serde(rename = "type")]
    kind: TideType,
    height: f64,
}

#[derive(Deserialize)]
struct WaveData {
    wave: Vec<RawWave>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWave {
    timestamp: i64,
    utc_offset: f64,
    surf: RawSurf,
}

#[derive(Deserialize)]
struct RawSurf {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct WindData {
    wind: Vec<RawWind>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWind {
    timestamp: i64,
    utc_offset: f64,
    speed: f64,
    direction: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherData {
    sunlight_times: Vec<RawSunlight>,
}

#[derive(Deserialize)]
struct RawSunlight {
    dawn: i64,
    #[serde(rename = "dawnUTCOffset")]
    dawn_utc_offset: f64,
    dusk: i64,
    #[serde(rename = "duskUTCOffset")]
    dusk_utc_offset: f64,
}

impl TidesData {
    fn into_events(self) -> Result<Vec<TideEvent>, ForecastError> {
        let mut events = self
            .tides
            .into_iter()
            .map(|t| {
                Ok(TideEvent {
                    timestamp: localize(t.timestamp, t.utc_offset)?,
                    kind: t.kind,
                    height: t.height,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

impl WaveData {
    fn into_samples(self) -> Result<Vec<WaveSample>, ForecastError> {
        let mut samples = self
            .wave
            .into_iter()
            .map(|w| {
                Ok(WaveSample {
                    timestamp: localize(w.timestamp, w.utc_offset)?,
                    surf_min: w.surf.min,
                    surf_max: w.surf.max,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

impl WindData {
    fn into_samples(self) -> Result<Vec<WindSample>, ForecastError> {
        let mut samples = self
            .wind
            .into_iter()
            .map(|w| {
                Ok(WindSample {
                    timestamp: localize(w.timestamp, w.utc_offset)?,
                    speed: w.speed,
                    direction: w.direction,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

impl WeatherData {
    fn into_windows(self) -> Result<Vec<SunlightWindow>, ForecastError> {
        let mut windows = self
            .sunlight_times
            .into_iter()
            .map(|s| {
                Ok(SunlightWindow {
                    dawn: localize(s.dawn, s.dawn_utc_offset)?,
                    dusk: localize(s.dusk, s.dusk_utc_offset)?,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        windows.sort_by_key(|w| w.dawn);
        Ok(windows)
    }
}

/// Unix seconds shifted by a UTC offset in hours into naive local time
fn localize(unix_secs: i64, utc_offset_hours: f64) -> Result<Timestamp, ForecastError> {
    let utc = DateTime::from_timestamp(unix_secs, 0)
        .ok_or(ForecastError::InvalidTimestamp(unix_secs))?;
    shift(utc.naive_utc(), utc_offset_hours)
}

/// Move a naive instant by a UTC offset in hours
fn shift(at: Timestamp, hours: f64) -> Result<Timestamp, ForecastError> {
    let secs = (hours * 3600.0).round();
    // Out-of-range floats would saturate in the `as` cast
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 / 2.0 {
        return Err(ForecastError::InvalidOffset(hours));
    }
    Duration::try_seconds(secs as i64)
        .and_then(|offset| at.checked_add_signed(offset))
        .ok_or(ForecastError::InvalidOffset(hours))
}
