use thiserror::Error;

/// Top-level error type for the lot wall builder.
#[derive(Debug, Error)]
pub enum LotWallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors caused by inconsistent build inputs or parameters.
///
/// These abort a build before any geometry is emitted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("wall graph has {graph} floors but elevation data has {elevation}")]
    FloorCountMismatch { graph: usize, elevation: usize },

    #[error("elevation floor {floor} holds {actual} samples, expected {expected}")]
    ElevationSize {
        floor: usize,
        expected: usize,
        actual: usize,
    },

    #[error("elevation grid must be at least 1x1, got {width}x{height}")]
    EmptyElevation { width: usize, height: usize },
}

/// Errors that indicate a malformed wall graph.
///
/// These are construction bugs upstream of the builder and are never
/// swallowed.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("segment {segment} references unknown node {node}")]
    UnknownNode { segment: usize, node: u32 },

    #[error("segment {segment} is missing from the intersection at node {node}")]
    MissingMember { segment: usize, node: u32 },

    #[error("level {level} is outside floors {base}..{end}")]
    FloorOutOfRange { level: i32, base: i32, end: i32 },
}

/// Convenience type alias for results using [`LotWallError`].
pub type Result<T> = std::result::Result<T, LotWallError>;
