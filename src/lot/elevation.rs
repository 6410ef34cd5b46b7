use crate::error::{ConfigError, Result};
use crate::math::lerp;

/// How heights are read from an elevation floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Value of the cell at the truncated coordinates.
    Exact,
    /// Bilinear blend of the four surrounding cells.
    Interpolated,
}

/// Per-floor height fields of a lot.
///
/// Samples are stored x-major: the height at `(x, y)` lives at
/// `x * height + y`.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    width: usize,
    height: usize,
    floors: Vec<Vec<f64>>,
}

/// A borrowed view of a single elevation floor.
#[derive(Debug, Clone, Copy)]
pub struct FloorView<'a> {
    data: &'a [f64],
    width: usize,
    height: usize,
}

impl ElevationGrid {
    /// Creates a grid from one sample vector per floor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyElevation` for a zero-sized grid and
    /// `ConfigError::ElevationSize` if any floor does not hold exactly
    /// `width * height` samples.
    pub fn new(width: usize, height: usize, floors: Vec<Vec<f64>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyElevation { width, height }.into());
        }
        let expected = width * height;
        for (floor, data) in floors.iter().enumerate() {
            if data.len() != expected {
                return Err(ConfigError::ElevationSize {
                    floor,
                    expected,
                    actual: data.len(),
                }
                .into());
            }
        }
        Ok(Self {
            width,
            height,
            floors,
        })
    }

    /// Creates a grid where every floor is flat at the given heights.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyElevation` for a zero-sized grid.
    pub fn flat(width: usize, height: usize, floor_heights: &[f64]) -> Result<Self> {
        let floors = floor_heights
            .iter()
            .map(|&h| vec![h; width * height])
            .collect();
        Self::new(width, height, floors)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of floors in the grid.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Returns a view of `floor`, or `None` past the top floor.
    #[must_use]
    pub fn floor(&self, floor: usize) -> Option<FloorView<'_>> {
        self.floors.get(floor).map(|data| FloorView {
            data,
            width: self.width,
            height: self.height,
        })
    }

    /// Exact height on `floor`, without interpolation.
    #[must_use]
    pub fn sample_floor(&self, floor: usize, x: f64, y: f64) -> Option<f64> {
        self.floor(floor).map(|f| f.sample_exact(x, y))
    }

    /// Bilinear height on `floor`.
    #[must_use]
    pub fn sample_interpolated(&self, floor: usize, x: f64, y: f64) -> Option<f64> {
        self.floor(floor).map(|f| f.sample_interpolated(x, y))
    }

    /// Height of the surface above a wall: the floor above if it exists,
    /// otherwise `fallback_base + wall_height`.
    #[must_use]
    pub fn sample_upper(
        &self,
        floor_above: usize,
        x: f64,
        y: f64,
        fallback_base: f64,
        wall_height: f64,
        sampling: Sampling,
    ) -> f64 {
        FloorView::sample_upper(self.floor(floor_above), x, y, fallback_base, wall_height, sampling)
    }
}

impl FloorView<'_> {
    /// Height at the cell containing `(x, y)`.
    #[must_use]
    pub fn sample_exact(&self, x: f64, y: f64) -> f64 {
        self.at(self.column(x), self.row(y))
    }

    /// Bilinear height at `(x, y)`. Neighbours past the high edge are
    /// clamped to the last row or column.
    #[must_use]
    pub fn sample_interpolated(&self, x: f64, y: f64) -> f64 {
        let x0 = self.column(x);
        let y0 = self.row(y);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let xi = x.max(0.0).fract();
        let yi = y.max(0.0).fract();

        let near = lerp(self.at(x0, y0), self.at(x1, y0), xi);
        let far = lerp(self.at(x0, y1), self.at(x1, y1), xi);
        lerp(near, far, yi)
    }

    /// Samples `above` when present, else returns `fallback_base + wall_height`.
    #[must_use]
    pub fn sample_upper(
        above: Option<Self>,
        x: f64,
        y: f64,
        fallback_base: f64,
        wall_height: f64,
        sampling: Sampling,
    ) -> f64 {
        match (above, sampling) {
            (None, _) => fallback_base + wall_height,
            (Some(floor), Sampling::Exact) => floor.sample_exact(x, y),
            (Some(floor), Sampling::Interpolated) => floor.sample_interpolated(x, y),
        }
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.data[x * self.height + y]
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn column(&self, x: f64) -> usize {
        (x.max(0.0) as usize).min(self.width - 1)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn row(&self, y: f64) -> usize {
        (y.max(0.0) as usize).min(self.height - 1)
    }
}
