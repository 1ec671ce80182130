//! Procedural effects drawn on top of plain face containers.
//!
//! - Decals layer flat-tinted patterns over a container, painter's style:
//!   later layers draw over earlier ones.
//! - Sails ripple in the wind. The displacement is a pure function of the
//!   vertex position and time, so a given frame always looks the same.

use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::color::Color;
use crate::config::MAX_DECAL_LAYERS;
use crate::handler::Actor;
use crate::model::{Node, TextureId};
use crate::pose::PoseStack;
use crate::renderer::RenderPass;
use crate::sink::{Material, RenderLayer};

/// Strength of the sail ripple.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SailParams {
    /// Amplitude gained per unit of distance from the sail's origin.
    pub distance_scale: f32,
    /// Amplitude everywhere on the sail.
    pub base_scale: f32,
}

impl Default for SailParams {
    fn default() -> Self {
        Self {
            distance_scale: 0.025,
            base_scale: 0.0,
        }
    }
}

impl SailParams {
    pub fn new(distance_scale: f32, base_scale: f32) -> Self {
        Self {
            distance_scale,
            base_scale,
        }
    }

    /// Amplitude of each harmonic at a vertex position.
    pub fn amplitude(&self, position: Vec3) -> f64 {
        let distance = position.abs().max_element();
        self.distance_scale as f64 * distance as f64 + self.base_scale as f64
    }

    /// Upper bound of `|ripple_offset(position, _, self)|`.
    pub fn max_offset(&self, position: Vec3) -> f64 {
        self.amplitude(position).abs() * 2.0 * SQRT_2
    }
}

/// X/Z displacement of a sail vertex at `time`.
///
/// The phase couples position and time so the ripple travels across the
/// surface; two harmonics (1 and 1.7) keep it from looking periodic.
pub fn ripple_offset(position: Vec3, time: f32, params: SailParams) -> Vec2 {
    let angle = (position.x as f64 + position.z as f64 + position.y as f64 * 0.25) * 4.0
        + time as f64 * 4.0;
    let scale = params.amplitude(position);
    let x = (angle.cos() + (angle * 1.7).cos()) * scale;
    let z = (angle.sin() + (angle * 1.7).sin()) * scale;
    Vec2::new(x as f32, z as f32)
}

/// Which material family a decal pattern resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecalStyle {
    Banner,
    Shield,
}

/// Name of a decal pattern, e.g. `"stripe_bottom"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternId(pub String);

impl From<&str> for PatternId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One pattern and the tint it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct DecalLayer {
    pub pattern: PatternId,
    pub color: Color,
}

impl DecalLayer {
    pub fn new(pattern: impl Into<PatternId>, color: impl Into<Color>) -> Self {
        Self {
            pattern: pattern.into(),
            color: color.into(),
        }
    }
}

/// Maps pattern names to their banner and shield textures.
#[derive(Clone, Debug, Default)]
pub struct PatternRegistry {
    patterns: HashMap<PatternId, (TextureId, TextureId)>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pattern's banner and shield textures.
    pub fn register(
        &mut self,
        pattern: impl Into<PatternId>,
        banner: TextureId,
        shield: TextureId,
    ) {
        self.patterns.insert(pattern.into(), (banner, shield));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(
        mut self,
        pattern: impl Into<PatternId>,
        banner: TextureId,
        shield: TextureId,
    ) -> Self {
        self.register(pattern, banner, shield);
        self
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Material for a pattern, or `None` if the pattern is unknown.
    pub fn resolve(&self, pattern: &PatternId, style: DecalStyle) -> Option<Material> {
        let (banner, shield) = self.patterns.get(pattern)?;
        let texture = match style {
            DecalStyle::Banner => *banner,
            DecalStyle::Shield => *shield,
        };
        Some(Material::new(texture, RenderLayer::NoOutline))
    }
}

impl<A: Actor + ?Sized> RenderPass<'_, A> {
    /// Draws decal layers over a face container.
    ///
    /// The container's origin is applied in a scoped frame. At most
    /// `max_decal_layers` layers (never more than [`MAX_DECAL_LAYERS`]) are
    /// considered, in order; each resolved
    /// layer draws every face once, tinted with the layer's opaque color.
    /// Returns the number of layers drawn.
    pub fn render_decals(
        &mut self,
        stack: &mut PoseStack,
        node: &Node,
        patterns: &PatternRegistry,
        style: DecalStyle,
        layers: &[DecalLayer],
    ) -> usize {
        let cap = self.config().max_decal_layers.min(MAX_DECAL_LAYERS);
        if layers.len() > cap {
            tracing::debug!(
                "'{}': ignoring {} decal layers past the cap of {}",
                node.name,
                layers.len() - cap,
                cap
            );
        }

        stack.scoped(|stack| {
            stack.translate(node.origin);

            let mut drawn = 0;
            for layer in layers.iter().take(cap) {
                let Some(material) = patterns.resolve(&layer.pattern, style) else {
                    tracing::trace!("unknown decal pattern '{}'", layer.pattern.0);
                    continue;
                };
                self.emit_faces(
                    stack,
                    node.faces(),
                    layer.color.with_alpha(1.0),
                    |_| material,
                    |position| position,
                );
                drawn += 1;
            }
            drawn
        })
    }

    /// Draws a face container as a rippling sail, double sided.
    pub fn render_sail(&mut self, stack: &PoseStack, node: &Node, params: SailParams) {
        let time = self.time();
        let color = self.params().color;
        self.emit_faces(
            stack,
            node.faces(),
            color,
            |face| Material::new(face.texture, RenderLayer::CutoutNoCull),
            |position| {
                let offset = ripple_offset(position, time, params);
                position + Vec3::new(offset.x, 0.0, offset.y)
            },
        );
    }
}
