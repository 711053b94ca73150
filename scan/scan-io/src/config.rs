//! Loading pipeline parameters from JSON.
//!
//! Every parameter struct deserializes with defaults for missing fields, so a
//! config file only lists what it changes:
//!
//! ```json
//! { "accumulator": { "max_points": 3000 }, "neighbor_strategy": "kdTree" }
//! ```
//!
//! Field names are the snake_case Rust names; enum values are camelCase.

use std::fs;
use std::path::Path;

use scan_recon::PipelineParams;
use tracing::debug;

use crate::error::IoResult;

/// Parses pipeline parameters from a JSON string.
///
/// # Errors
///
/// Returns a JSON error for malformed input or mistyped fields.
///
/// # Example
///
/// ```
/// use scan_io::params_from_json;
///
/// let params = params_from_json(r#"{ "accumulator": { "max_points": 3000 } }"#).unwrap();
/// assert_eq!(params.accumulator.max_points, 3000);
/// assert!((params.outlier.radius - 0.05).abs() < 1e-12);
/// ```
pub fn params_from_json(json: &str) -> IoResult<PipelineParams> {
    Ok(serde_json::from_str(json)?)
}

/// Loads pipeline parameters from a JSON file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse.
pub fn load_params<P: AsRef<Path>>(path: P) -> IoResult<PipelineParams> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let params = params_from_json(&text)?;
    debug!(path = %path.display(), "Loaded pipeline parameters");
    Ok(params)
}

/// Writes pipeline parameters as pretty JSON.
///
/// # Errors
///
/// Fails if serialization or the write fails.
pub fn save_params<P: AsRef<Path>>(params: &PipelineParams, path: P) -> IoResult<()> {
    let json = serde_json::to_string_pretty(params)?;
    fs::write(path, json)?;
    Ok(())
}
