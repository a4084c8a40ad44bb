//! 16-point compass rose for wind and swell directions.
//!
//! Each point owns a 22.5° bucket centred on its bearing, so N covers
//! `[348.75, 360) ∪ [0, 11.25)` and NNE starts exactly at 11.25°.
//! Input degrees are normalized with `rem_euclid`, which makes the
//! conversion total over every finite angle (negative and > 360 included).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one compass bucket in degrees
const BUCKET_DEG: f64 = 360.0 / 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassPoint {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

/// Clockwise from north; index `i` is centred on `i * 22.5°`
const ROSE: [CompassPoint; 16] = [
    CompassPoint::N,
    CompassPoint::Nne,
    CompassPoint::Ne,
    CompassPoint::Ene,
    CompassPoint::E,
    CompassPoint::Ese,
    CompassPoint::Se,
    CompassPoint::Sse,
    CompassPoint::S,
    CompassPoint::Ssw,
    CompassPoint::Sw,
    CompassPoint::Wsw,
    CompassPoint::W,
    CompassPoint::Wnw,
    CompassPoint::Nw,
    CompassPoint::Nnw,
];

impl CompassPoint {
    /// Quantize a bearing in degrees to the nearest of the 16 points.
    ///
    /// Non-finite input maps to N.
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return CompassPoint::N;
        }
        let normalized = degrees.rem_euclid(360.0);
        let index = ((normalized + BUCKET_DEG / 2.0) / BUCKET_DEG).floor() as usize % ROSE.len();
        ROSE[index]
    }

    /// Centre bearing of this point in degrees
    pub fn degrees(self) -> f64 {
        ROSE.iter().position(|p| *p == self).unwrap_or(0) as f64 * BUCKET_DEG
    }

    pub fn label(self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::Nne => "NNE",
            CompassPoint::Ne => "NE",
            CompassPoint::Ene => "ENE",
            CompassPoint::E => "E",
            CompassPoint::Ese => "ESE",
            CompassPoint::Se => "SE",
            CompassPoint::Sse => "SSE",
            CompassPoint::S => "S",
            CompassPoint::Ssw => "SSW",
            CompassPoint::Sw => "SW",
            CompassPoint::Wsw => "WSW",
            CompassPoint::W => "W",
            CompassPoint::Wnw => "WNW",
            CompassPoint::Nw => "NW",
            CompassPoint::Nnw => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_points() {
        assert_eq!(CompassPoint::from_degrees(0.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(90.0), CompassPoint::E);
        assert_eq!(CompassPoint::from_degrees(180.0), CompassPoint::S);
        assert_eq!(CompassPoint::from_degrees(270.0), CompassPoint::W);
    }

    #[test]
    fn test_wraps_around_north() {
        assert_eq!(CompassPoint::from_degrees(359.9), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(348.75), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(348.7), CompassPoint::Nnw);
        assert_eq!(CompassPoint::from_degrees(360.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(720.0), CompassPoint::N);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(CompassPoint::from_degrees(11.24), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(11.25), CompassPoint::Nne);
        assert_eq!(CompassPoint::from_degrees(33.75), CompassPoint::Ne);
        assert_eq!(CompassPoint::from_degrees(258.75), CompassPoint::W);
        assert_eq!(CompassPoint::from_degrees(258.7), CompassPoint::Wsw);
    }

    #[test]
    fn test_negative_and_non_finite() {
        assert_eq!(CompassPoint::from_degrees(-90.0), CompassPoint::W);
        assert_eq!(CompassPoint::from_degrees(-0.1), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(f64::NAN), CompassPoint::N);
    }

    #[test]
    fn test_every_point_maps_back_to_itself() {
        for point in ROSE {
            assert_eq!(CompassPoint::from_degrees(point.degrees()), point);
            assert_eq!(point.to_string(), point.label());
        }
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&CompassPoint::Wnw).unwrap();
        assert_eq!(json, "\"WNW\"");
    }
}
