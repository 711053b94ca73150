//! Pipeline parameters and named presets.
//!
//! Every threshold the pipeline uses lives here with its default. The
//! defaults were tuned empirically against phone captures and have not been
//! recalibrated since; expect to adjust them per device class.
//!
//! Parameters deserialize with `#[serde(default)]`, so a JSON document only
//! needs the fields it wants to override.

use serde::{Deserialize, Serialize};

use crate::neighbors::NeighborStrategy;

/// Sliding-window point store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorParams {
    /// Maximum retained points; the oldest are evicted first. Default: 5000.
    pub max_points: usize,

    /// Keep a running bounding box of accepted points. Default: true.
    pub track_bounds: bool,
}

impl Default for AccumulatorParams {
    fn default() -> Self {
        Self {
            max_points: 5000,
            track_bounds: true,
        }
    }
}

impl AccumulatorParams {
    /// Sets the point cap.
    #[must_use]
    pub const fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Sets whether bounds are tracked while accepting.
    #[must_use]
    pub const fn with_track_bounds(mut self, track: bool) -> Self {
        self.track_bounds = track;
        self
    }
}

/// Density-based outlier filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierParams {
    /// Neighbour search radius. Default: 0.05.
    pub radius: f64,

    /// Fraction of the median neighbour count a point needs to survive.
    /// Default: 0.3.
    pub min_relative_density: f64,

    /// Filtering is skipped for clouds of this size or smaller. Default: 10.
    pub min_points: usize,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            radius: 0.05,
            min_relative_density: 0.3,
            min_points: 10,
        }
    }
}

impl OutlierParams {
    /// Sets the neighbour radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the relative density threshold.
    #[must_use]
    pub const fn with_min_relative_density(mut self, density: f64) -> Self {
        self.min_relative_density = density;
        self
    }
}

/// Normal estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalParams {
    /// Neighbour search radius. Default: 0.05.
    pub radius: f64,

    /// Nearest neighbours considered per point. Default: 6.
    pub max_neighbors: usize,

    /// Use normals supplied with the samples instead of recomputing.
    /// Default: true.
    pub prefer_supplied: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            radius: 0.05,
            max_neighbors: 6,
            prefer_supplied: true,
        }
    }
}

impl NormalParams {
    /// Sets the neighbour radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets whether supplied normals win over estimated ones.
    #[must_use]
    pub const fn with_prefer_supplied(mut self, prefer: bool) -> Self {
        self.prefer_supplied = prefer;
        self
    }
}

/// Settings for the camera-aware 2.5D triangulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseAwareParams {
    /// Maximum edge length in the projection plane. Default: 0.12.
    pub max_edge_length_2d: f64,

    /// Maximum depth difference between a point and its candidates.
    /// Default: 0.15.
    pub max_depth_diff: f64,

    /// Maximum 3D edge length of an accepted triangle. Default: 0.15.
    pub max_edge_length_3d: f64,

    /// Minimum 3D area of an accepted triangle. Default: 0.0002.
    pub min_area: f64,

    /// Nearest candidates kept per point. Default: 10.
    pub max_candidates: usize,

    /// How many of the nearest candidates anchor a pair. Default: 6.
    pub pair_anchor_count: usize,

    /// Output face cap as a multiple of the point count. Default: 4.
    pub max_faces_per_point: usize,
}

impl Default for PoseAwareParams {
    fn default() -> Self {
        Self {
            max_edge_length_2d: 0.12,
            max_depth_diff: 0.15,
            max_edge_length_3d: 0.15,
            min_area: 0.0002,
            max_candidates: 10,
            pair_anchor_count: 6,
            max_faces_per_point: 4,
        }
    }
}

/// Settings for the pose-less proximity triangulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackParams {
    /// Neighbour radius; also the limit for the third edge. Default: 0.1.
    pub radius: f64,

    /// Only this many leading points seed triangles. Default: 200.
    pub max_points: usize,

    /// Nearest neighbours considered per seed. Default: 6.
    pub max_neighbors: usize,

    /// Minimum triangle area. Default: 0.0001.
    pub min_area: f64,
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            radius: 0.1,
            max_points: 200,
            max_neighbors: 6,
            min_area: 0.0001,
        }
    }
}

/// Triangulation settings for both modes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulationParams {
    /// Used when every sample carries a valid camera pose.
    pub pose_aware: PoseAwareParams,

    /// Used otherwise.
    pub fallback: FallbackParams,
}

/// Shape classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Run shape detection on stop. Default: true.
    pub enabled: bool,

    /// Flood-fill link distance. Default: 0.3.
    pub proximity: f64,

    /// Cluster size cap. Default: 500.
    pub max_cluster_points: usize,

    /// Cluster count cap. Default: 5.
    pub max_clusters: usize,

    /// Smallest cluster that gets classified. Default: 30.
    pub min_cluster_points: usize,

    /// Smallest accepted footprint side. Default: 0.2.
    pub min_extent: f64,

    /// Largest accepted footprint side. Default: 3.0.
    pub max_extent: f64,

    /// Circularity must be below this for a circle. Default: 0.25.
    pub max_circularity: f64,

    /// Aspect ratio must be below this for a circle. Default: 1.3.
    pub max_aspect_ratio: f64,

    /// Angular sectors of the radial profile. Default: 16.
    pub angular_sectors: usize,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            enabled: true,
            proximity: 0.3,
            max_cluster_points: 500,
            max_clusters: 5,
            min_cluster_points: 30,
            min_extent: 0.2,
            max_extent: 3.0,
            max_circularity: 0.25,
            max_aspect_ratio: 1.3,
            angular_sectors: 16,
        }
    }
}

impl ShapeParams {
    /// Disables shape detection.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Everything the pipeline needs, in one place.
///
/// # Example
///
/// ```
/// use scan_recon::{NeighborStrategy, PipelineParams};
///
/// let params = PipelineParams::raycast().with_neighbor_strategy(NeighborStrategy::KdTree);
/// assert_eq!(params.accumulator.max_points, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Point store.
    pub accumulator: AccumulatorParams,

    /// Outlier filter.
    pub outlier: OutlierParams,

    /// Normal estimation.
    pub normals: NormalParams,

    /// Triangulation.
    pub triangulation: TriangulationParams,

    /// Shape classifier.
    pub shapes: ShapeParams,

    /// Neighbour search backend for every stage.
    pub neighbor_strategy: NeighborStrategy,

    /// Rigidity tolerance for camera poses. Default: 1e-3.
    pub pose_tolerance: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self::feature_points()
    }
}

impl PipelineParams {
    /// Tuned for `ARKit`/`ARCore` feature points (the default).
    #[must_use]
    pub fn feature_points() -> Self {
        Self {
            accumulator: AccumulatorParams::default(),
            outlier: OutlierParams::default(),
            normals: NormalParams::default(),
            triangulation: TriangulationParams::default(),
            shapes: ShapeParams::default(),
            neighbor_strategy: NeighborStrategy::BruteForce,
            pose_tolerance: 1e-3,
        }
    }

    /// Tuned for sparse hit-test samples that carry surface normals.
    #[must_use]
    pub fn raycast() -> Self {
        let mut params = Self::feature_points();
        params.accumulator.max_points = 2000;
        params.outlier.radius = 0.08;
        params.normals.radius = 0.08;
        params.triangulation.fallback.radius = 0.15;
        params
    }

    /// Larger clouds with tighter edges and a kd-tree backend.
    #[must_use]
    pub fn dense() -> Self {
        let mut params = Self::feature_points();
        params.accumulator.max_points = 8000;
        params.outlier.radius = 0.04;
        params.normals.radius = 0.04;
        params.triangulation.pose_aware.max_edge_length_2d = 0.08;
        params.triangulation.pose_aware.max_edge_length_3d = 0.1;
        params.triangulation.pose_aware.min_area = 0.0001;
        params.triangulation.fallback.max_points = 800;
        params.neighbor_strategy = NeighborStrategy::KdTree;
        params
    }

    /// Sets the accumulator cap.
    #[must_use]
    pub const fn with_max_points(mut self, max_points: usize) -> Self {
        self.accumulator.max_points = max_points;
        self
    }

    /// Sets the neighbour search backend.
    #[must_use]
    pub const fn with_neighbor_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.neighbor_strategy = strategy;
        self
    }

    /// Replaces the outlier settings.
    #[must_use]
    pub fn with_outlier(mut self, outlier: OutlierParams) -> Self {
        self.outlier = outlier;
        self
    }

    /// Replaces the shape settings.
    #[must_use]
    pub fn with_shapes(mut self, shapes: ShapeParams) -> Self {
        self.shapes = shapes;
        self
    }
}
