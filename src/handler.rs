//! Per-model hooks layered on top of keyframe animation.
//!
//! A [`PartHandler`] is a capability struct with three optional slots:
//!
//! - `animate` runs for every bone after its keyframes and static rotation,
//!   with the live [`PoseStack`], so procedural motion (propellers, rudders,
//!   landing gear) composes with authored animation.
//! - `render` may take over drawing a node. Returning `true` skips the default
//!   drawing; the hook can still call back into the [`RenderPass`].
//! - `materials` replaces the default face-to-material mapping.
//!
//! ```
//! use hangar::{PartHandler, Proximity, Quat};
//!
//! let handler: PartHandler<Proximity> = PartHandler::new()
//!     .on_animate(|bone, _actor, stack, time| {
//!         if bone == "propeller" {
//!             stack.rotate(Quat::from_rotation_z(time * 20.0));
//!         }
//!     })
//!     .on_render(|pass, stack, node| {
//!         if node.name == "sail" {
//!             pass.render_sail(stack, node, pass.config().sail);
//!             return true;
//!         }
//!         false
//!     });
//! assert!(handler.has_render());
//! ```

use crate::model::{Face, Node};
use crate::pose::PoseStack;
use crate::renderer::RenderPass;
use crate::sink::Material;

/// The thing a model is rendered for, usually a game entity.
pub trait Actor {
    /// Whether the actor is close enough to the viewer for near-range detail.
    fn is_within_near_range(&self) -> bool;
}

/// A fixed near/far answer, for previews and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Proximity {
    Near,
    Far,
}

impl Actor for Proximity {
    fn is_within_near_range(&self) -> bool {
        matches!(self, Proximity::Near)
    }
}

impl<T: Actor + ?Sized> Actor for &T {
    fn is_within_near_range(&self) -> bool {
        (**self).is_within_near_range()
    }
}

/// Optional hooks for one kind of model.
pub struct PartHandler<A: ?Sized> {
    /// `animate(bone_name, actor, stack, time)`.
    pub(crate) animate: Option<Box<dyn Fn(&str, &A, &mut PoseStack, f32)>>,
    /// `render(pass, stack, node) -> handled`.
    pub(crate) render: Option<Box<dyn Fn(&mut RenderPass<'_, A>, &mut PoseStack, &Node) -> bool>>,
    /// `materials(container, face) -> material`.
    pub(crate) materials: Option<Box<dyn Fn(&Node, &Face) -> Material>>,
}

impl<A: ?Sized> Default for PartHandler<A> {
    fn default() -> Self {
        Self {
            animate: None,
            render: None,
            materials: None,
        }
    }
}

impl<A: ?Sized> PartHandler<A> {
    /// A handler with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_animate(mut self, f: impl Fn(&str, &A, &mut PoseStack, f32) + 'static) -> Self {
        self.animate = Some(Box::new(f));
        self
    }

    pub fn on_render(
        mut self,
        f: impl Fn(&mut RenderPass<'_, A>, &mut PoseStack, &Node) -> bool + 'static,
    ) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn with_materials(mut self, f: impl Fn(&Node, &Face) -> Material + 'static) -> Self {
        self.materials = Some(Box::new(f));
        self
    }

    pub fn has_animate(&self) -> bool {
        self.animate.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub fn has_materials(&self) -> bool {
        self.materials.is_some()
    }
}

impl<A: ?Sized> std::fmt::Debug for PartHandler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartHandler")
            .field("animate", &self.animate.is_some())
            .field("render", &self.render.is_some())
            .field("materials", &self.materials.is_some())
            .finish()
    }
}
