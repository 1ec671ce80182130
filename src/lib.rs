//! # Hangar
//!
//! **Skeletal model traversal and keyframe animation for block-style vehicles.**
//!
//! Hangar takes a pre-parsed bone/mesh model, samples its animation, runs your
//! per-bone hooks and hands every textured quad, fully transformed, to a
//! [`VertexSink`]. What happens to the quads afterwards (a `wgpu` pass, a
//! software rasterizer, a test assertion) is up to the sink.
//!
//! ## Quick Start
//!
//! ```
//! use hangar::*;
//!
//! let face = Face::new(
//!     [
//!         FaceVertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
//!         FaceVertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 1.0, 0.0]),
//!         FaceVertex::new([1.0, 0.0, 1.0], [1.0, 1.0], [0.0, 1.0, 0.0]),
//!         FaceVertex::new([0.0, 0.0, 1.0], [0.0, 1.0], [0.0, 1.0, 0.0]),
//!     ],
//!     TextureId(0),
//! );
//! let root = Node::bone("body", "body")
//!     .child(Node::bone("prop", "propeller").child(Node::mesh("blade", "blade", vec![face])));
//! let model = Model::new(root, Vec::new()).unwrap();
//!
//! let handler = PartHandler::<Proximity>::new().on_animate(|bone, _actor, stack, time| {
//!     if bone == "propeller" {
//!         stack.rotate(Quat::from_rotation_z(time * 30.0));
//!     }
//! });
//!
//! let renderer = ModelRenderer::default();
//! let mut stack = PoseStack::new();
//! let mut batcher = FaceBatcher::new();
//! renderer.render_model(
//!     &model,
//!     &mut stack,
//!     &mut batcher,
//!     &Proximity::Near,
//!     Some(&handler),
//!     DrawParams::new().time(0.25),
//! );
//! assert_eq!(batcher.len(), 1);
//! ```
//!
//! ## Pieces
//!
//! - [`Model`], [`Node`], [`Face`]: the static tree, validated once.
//! - [`Animation`]: keyframe channels sampled per node. Only the model's
//!   first animation is applied.
//! - [`PoseStack`]: the caller-owned transform stack.
//! - [`PartHandler`]: optional `animate`, `render` and `materials` hooks.
//! - [`RenderPass::render_decals`] and [`RenderPass::render_sail`]: layered
//!   decals and wind-rippled sails.
//! - [`FaceBatcher`]: a sink that groups quads per material and uploads them.
//! - [`render_world`]: renders every `hecs` entity carrying a model.

mod animation;
mod batch;
mod color;
mod config;
mod ecs;
mod effects;
mod handler;
mod model;
mod pose;
mod renderer;
mod sink;
mod vehicle;

pub use animation::{Animation, Animator, Channel, Interpolation, Keyframe, LoopMode};
pub use batch::{Batch, FaceBatcher, GpuBatch, Quad, quad_indices};
pub use color::{Color, DyeColor};
pub use config::{ConfigError, MAX_DECAL_LAYERS, RenderConfig};
pub use ecs::{EntityActor, ModelId, ModelInstance, ModelLibrary, Transform, render_world};
pub use effects::{
    DecalLayer, DecalStyle, PatternId, PatternRegistry, SailParams, ripple_offset,
};
pub use handler::{Actor, PartHandler, Proximity};
pub use model::{
    Bone, Face, FaceVertex, Model, ModelError, Node, NodeId, NodeKind, Nodes, TextureId,
};
pub use pose::{Pose, PoseStack, rotation_xyz};
pub use renderer::{DrawParams, ModelRenderer, RenderPass, default_material};
pub use sink::{DrawVertex, FULL_BRIGHT, Material, RenderLayer, VertexSink, pack_light};
pub use vehicle::Attitude;

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

// ECS types used by `render_world`
pub use hecs::{Entity, World};
