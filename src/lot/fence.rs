/// Models making up one fence style in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceCatalogEntry {
    /// Straight rail model name.
    pub rail: String,
    /// Rail model for 45 degree spans, if the style has one.
    pub diagonal_rail: Option<String>,
    /// Post model name.
    pub post: String,
}

/// A free-standing fence post placed on the lot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FencePost {
    /// Fence catalog GUID.
    pub guid: u32,
    pub x: f64,
    pub y: f64,
    /// Absolute floor level.
    pub level: i32,
}
