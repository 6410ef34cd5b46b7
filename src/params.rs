use crate::error::{ConfigError, Result};

/// Parameters controlling wall and fence generation.
#[derive(Debug, Clone, PartialEq)]
pub struct WallParams {
    /// Nominal height of one storey of wall.
    pub wall_height: f64,
    /// Distance from the centerline to each wall face.
    pub thickness: f64,
    /// How far below the roof surface roof walls stop.
    pub roof_offset: f64,
    /// Planar rail length above which a diagonal rail prototype is used.
    pub diagonal_threshold: f64,
    /// Material used for the top strip of thick walls.
    pub thickness_material: String,
    /// Material used when a pattern cannot be resolved.
    pub fallback_material: String,
}

impl Default for WallParams {
    fn default() -> Self {
        let thickness = 0.075;
        Self {
            wall_height: 3.0,
            thickness,
            roof_offset: thickness * 2.5,
            diagonal_threshold: 1.1,
            thickness_material: "wall_top".to_owned(),
            fallback_material: "wall_wallboard".to_owned(),
        }
    }
}

impl WallParams {
    /// Checks that all dimensions are finite and usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidParameter` if a height or the thickness
    /// is not strictly positive, or if any dimension is not finite.
    pub fn validate(&self) -> Result<()> {
        positive("wall_height", self.wall_height)?;
        positive("thickness", self.thickness)?;
        finite("roof_offset", self.roof_offset)?;
        finite("diagonal_threshold", self.diagonal_threshold)?;
        Ok(())
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<()> {
    finite(parameter, value)?;
    if value <= 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter,
            value,
            reason: "must be positive",
        }
        .into());
    }
    Ok(())
}

fn finite(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter {
            parameter,
            value,
            reason: "must be finite",
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = WallParams::default();
        params.validate().unwrap();
        assert!((params.roof_offset - 0.1875).abs() < 1e-12);
    }

    #[test]
    fn zero_thickness_fails() {
        let params = WallParams {
            thickness: 0.0,
            ..WallParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn nan_height_fails() {
        let params = WallParams {
            wall_height: f64::NAN,
            ..WallParams::default()
        };
        assert!(params.validate().is_err());
    }
}
