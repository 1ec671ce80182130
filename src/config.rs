//! Renderer configuration.
//!
//! Defaults match block-style authoring tools: 16 pixels per block, `lod0`
//! and `lod1` as the near/far detail bones, and at most 17 decal layers.
//! A configuration can be built in code or read from TOML:
//!
//! ```
//! use hangar::RenderConfig;
//!
//! let config = RenderConfig::from_toml_str(
//!     r#"
//!     max_decal_layers = 6
//!
//!     [sail]
//!     distance_scale = 0.05
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.max_decal_layers, 6);
//! assert_eq!(config.sail.distance_scale, 0.05);
//! assert_eq!(config.lod_near_bone, "lod0");
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::effects::SailParams;

/// Upper bound for [`RenderConfig::max_decal_layers`].
pub const MAX_DECAL_LAYERS: usize = 17;

/// Errors raised while reading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid render configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Tunables for [`ModelRenderer`](crate::ModelRenderer) and the effects.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Factor applied to animated positions (pixels to blocks).
    pub position_scale: f32,
    /// Bone shown only while the actor is within near range.
    pub lod_near_bone: String,
    /// Bone shown only while the actor is outside near range.
    pub lod_far_bone: String,
    /// Decal layers past this count are ignored. At most [`MAX_DECAL_LAYERS`].
    pub max_decal_layers: usize,
    /// Default sail ripple parameters.
    pub sail: SailParams,
    /// Distance used by the ECS integration for the near-range predicate.
    pub near_range: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            position_scale: 1.0 / 16.0,
            lod_near_bone: "lod0".to_owned(),
            lod_far_bone: "lod1".to_owned(),
            max_decal_layers: MAX_DECAL_LAYERS,
            sail: SailParams::default(),
            near_range: 64.0,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.position_scale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "position_scale",
                reason: format!("{} is not finite", self.position_scale),
            });
        }
        if self.max_decal_layers > MAX_DECAL_LAYERS {
            return Err(ConfigError::InvalidValue {
                field: "max_decal_layers",
                reason: format!("{} exceeds the cap of {MAX_DECAL_LAYERS}", self.max_decal_layers),
            });
        }
        if self.near_range.is_nan() || self.near_range < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "near_range",
                reason: format!("{} is negative or NaN", self.near_range),
            });
        }
        if !self.sail.distance_scale.is_finite() || !self.sail.base_scale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "sail",
                reason: "ripple scales must be finite".to_owned(),
            });
        }
        Ok(())
    }

    pub fn position_scale(mut self, scale: f32) -> Self {
        self.position_scale = scale;
        self
    }

    /// Renames the near/far detail bones.
    pub fn lod_bones(mut self, near: impl Into<String>, far: impl Into<String>) -> Self {
        self.lod_near_bone = near.into();
        self.lod_far_bone = far.into();
        self
    }

    pub fn max_decal_layers(mut self, max: usize) -> Self {
        self.max_decal_layers = max;
        self
    }

    pub fn sail(mut self, sail: SailParams) -> Self {
        self.sail = sail;
        self
    }

    pub fn near_range(mut self, range: f32) -> Self {
        self.near_range = range;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RenderConfig::from_toml_str("lod_bones = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_near_range_is_rejected() {
        let err = RenderConfig::from_toml_str("near_range = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "near_range", .. }));
    }

    #[test]
    fn builder_overrides() {
        let config = RenderConfig::new()
            .lod_bones("near", "far")
            .max_decal_layers(3)
            .position_scale(1.0);
        assert_eq!(config.lod_near_bone, "near");
        assert_eq!(config.lod_far_bone, "far");
        assert_eq!(config.max_decal_layers, 3);
        assert_eq!(config.position_scale, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn decal_layers_past_the_cap_are_rejected() {
        let err = RenderConfig::from_toml_str("max_decal_layers = 40").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "max_decal_layers", .. }));
        assert!(RenderConfig::from_toml_str("max_decal_layers = 17").is_ok());
        assert!(RenderConfig::new().max_decal_layers(18).validate().is_err());
    }
}
