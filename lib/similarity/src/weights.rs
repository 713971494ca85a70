//! Fixed blend of the three similarity dimensions
//!
//! The weights are part of the recommendation contract: identical artifacts
//! must rank identically across deployments, so they are constants rather
//! than runtime configuration.

/// Number of similarity matrices combined into the composite score
pub const MATRIX_COUNT: usize = 3;

/// Weight of each similarity matrix in the composite score
pub const SIMILARITY_WEIGHTS: [f64; MATRIX_COUNT] = [0.5, 0.8, 1.0];

/// Number of recommendations returned when the caller does not ask for a count
pub const DEFAULT_TOP_N: usize = 5;

/// Labels used when the artifact bundle does not name its matrices
pub const DEFAULT_LABELS: [&str; MATRIX_COUNT] = ["sim1", "sim2", "sim3"];

/// Weighted sum of one cell across the three matrices.
///
/// Evaluated left to right as `(w1*a + w2*b) + w3*c` so scores match the
/// reference pipeline bit for bit.
#[inline]
pub fn composite(values: [f64; MATRIX_COUNT]) -> f64 {
    SIMILARITY_WEIGHTS[0] * values[0] + SIMILARITY_WEIGHTS[1] * values[1] + SIMILARITY_WEIGHTS[2] * values[2]
}

/// Per-matrix weighted contributions of one cell
#[inline]
pub fn contributions(values: [f64; MATRIX_COUNT]) -> [f64; MATRIX_COUNT] {
    [
        SIMILARITY_WEIGHTS[0] * values[0],
        SIMILARITY_WEIGHTS[1] * values[1],
        SIMILARITY_WEIGHTS[2] * values[2],
    ]
}
