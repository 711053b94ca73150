//! Shape labels and scan-mode tags.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// Best-effort footprint classification of a point cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ShapeKind {
    /// Round footprint (low radial variation, near-square extent).
    Circle,
    /// Anything else that passed the size gates.
    Rectangle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Rectangle => write!(f, "rectangle"),
        }
    }
}

/// A classified cluster.
///
/// The classifier is a heuristic; treat the label as a hint for the UI,
/// not a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeDetection {
    /// The label.
    pub kind: ShapeKind,

    /// 3D bounds of the originating cluster.
    pub bounds: Aabb,

    /// Number of points in the cluster.
    pub point_count: usize,

    /// Coefficient of variation of the radial profile (lower is rounder).
    pub circularity: f64,

    /// Long side over short side of the horizontal footprint (>= 1).
    pub aspect_ratio: f64,
}

/// Which capture mode produced a result.
///
/// Only [`ScanType::FeaturePoints`] is produced by this workspace; the other
/// modes share the output shape so the UI can treat results uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ScanType {
    /// Feature points / raycast samples reconstructed on device.
    #[default]
    FeaturePoints,
    /// Depth-sensor meshing done by the platform.
    Lidar,
    /// Photo set for external photogrammetry.
    Photogrammetry,
}

impl ScanType {
    /// The wire tag used in JSON summaries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FeaturePoints => "featurePoints",
            Self::Lidar => "lidar",
            Self::Photogrammetry => "photogrammetry",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_type_tags() {
        assert_eq!(ScanType::FeaturePoints.as_str(), "featurePoints");
        assert_eq!(ScanType::Lidar.to_string(), "lidar");
        assert_eq!(ScanType::default(), ScanType::FeaturePoints);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_scan_type_serde_matches_tag() {
        for kind in [ScanType::FeaturePoints, ScanType::Lidar, ScanType::Photogrammetry] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_shape_kind_display() {
        assert_eq!(ShapeKind::Circle.to_string(), "circle");
        assert_eq!(ShapeKind::Rectangle.to_string(), "rectangle");
    }
}
