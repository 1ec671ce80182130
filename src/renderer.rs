//! Model traversal: transforms, animation, hooks and default drawing.
//!
//! [`ModelRenderer::render_model`] walks the tree from the root. For every node
//! it pushes a frame, translates to the node's origin, applies the sampled
//! keyframes of the model's first animation (translate, rotate, scale), then
//! the node's static rotation. Bones then run the `animate` hook and translate
//! back by their origin, so children are authored relative to the pivot.
//! Finally the node is drawn, either by the `render` hook or by default
//! drawing, and the frame is popped.
//!
//! ```
//! use hangar::*;
//!
//! let face = Face::new(
//!     [
//!         FaceVertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([1.0, 1.0, 0.0], [1.0, 1.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
//!     ],
//!     TextureId(3),
//! );
//! let root = Node::bone("wing", "wing")
//!     .origin(Vec3::new(0.0, 1.0, 0.0))
//!     .child(Node::mesh("panel", "panel", vec![face]));
//! let model = Model::new(root, Vec::new()).unwrap();
//!
//! let renderer = ModelRenderer::default();
//! let mut stack = PoseStack::new();
//! let mut batcher = FaceBatcher::new();
//! renderer.render_model(
//!     &model,
//!     &mut stack,
//!     &mut batcher,
//!     &Proximity::Near,
//!     None,
//!     DrawParams::default(),
//! );
//!
//! assert_eq!(batcher.len(), 1);
//! assert_eq!(batcher.quads()[0].vertices[2].position, [1.0, 1.0, 0.0]);
//! ```

use glam::Vec3;

use crate::animation::Channel;
use crate::color::Color;
use crate::config::RenderConfig;
use crate::handler::{Actor, PartHandler};
use crate::model::{Face, Model, Node, NodeKind};
use crate::pose::{PoseStack, rotation_xyz};
use crate::sink::{DrawVertex, FULL_BRIGHT, Material, RenderLayer, VertexSink};

/// Per-draw values shared by every vertex of a traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Packed light, see [`pack_light`](crate::pack_light).
    pub light: u32,
    /// Animation time in seconds.
    pub time: f32,
    /// Tint multiplied into every vertex.
    pub color: Color,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            light: FULL_BRIGHT,
            time: 0.0,
            color: Color::WHITE,
        }
    }
}

impl DrawParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn light(mut self, light: u32) -> Self {
        self.light = light;
        self
    }

    pub fn time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// The default face-to-material mapping: culled faces draw on the cutout
/// layer, others on the double-sided cutout layer.
pub fn default_material(_container: &Node, face: &Face) -> Material {
    let layer = if face.cull {
        RenderLayer::Cutout
    } else {
        RenderLayer::CutoutNoCull
    };
    Material::new(face.texture, layer)
}

/// Stateless model renderer holding its configuration.
#[derive(Clone, Debug, Default)]
pub struct ModelRenderer {
    config: RenderConfig,
}

impl ModelRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders the whole model into `sink`.
    ///
    /// The stack is left at the depth it was handed in at.
    pub fn render_model<A: Actor + ?Sized>(
        &self,
        model: &Model,
        stack: &mut PoseStack,
        sink: &mut dyn VertexSink,
        actor: &A,
        handler: Option<&PartHandler<A>>,
        params: DrawParams,
    ) {
        let mut pass = self.pass(model, sink, actor, handler, params);
        pass.render_node(stack, model.root());
    }

    /// Opens a pass for drawing individual nodes or effects directly.
    pub fn pass<'a, A: Actor + ?Sized>(
        &'a self,
        model: &'a Model,
        sink: &'a mut dyn VertexSink,
        actor: &'a A,
        handler: Option<&'a PartHandler<A>>,
        params: DrawParams,
    ) -> RenderPass<'a, A> {
        RenderPass {
            config: &self.config,
            model,
            sink,
            actor,
            handler,
            params,
        }
    }
}

/// State of one traversal, handed to `render` hooks.
pub struct RenderPass<'a, A: ?Sized> {
    config: &'a RenderConfig,
    model: &'a Model,
    pub(crate) sink: &'a mut dyn VertexSink,
    actor: &'a A,
    handler: Option<&'a PartHandler<A>>,
    params: DrawParams,
}

impl<'a, A: Actor + ?Sized> RenderPass<'a, A> {
    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn actor(&self) -> &'a A {
        self.actor
    }

    pub fn params(&self) -> DrawParams {
        self.params
    }

    pub fn time(&self) -> f32 {
        self.params.time
    }

    pub fn light(&self) -> u32 {
        self.params.light
    }

    /// Transforms, animates and draws `node` and its subtree.
    pub fn render_node(&mut self, stack: &mut PoseStack, node: &Node) {
        stack.scoped(|stack| {
            stack.translate(node.origin);
            self.apply_animation(stack, node);
            stack.rotate(rotation_xyz(node.rotation));

            if node.is_bone() {
                if let Some(animate) = self.handler.and_then(|h| h.animate.as_deref()) {
                    animate(node.name.as_str(), self.actor, stack, self.params.time);
                }
                stack.translate(-node.origin);
            }

            let handled = match self.handler.and_then(|h| h.render.as_deref()) {
                Some(render) => render(self, stack, node),
                None => false,
            };
            if !handled {
                self.render_inner(stack, node);
            }
        });
    }

    fn apply_animation(&self, stack: &mut PoseStack, node: &Node) {
        let Some(animation) = self.model.active_animation() else {
            return;
        };
        if !animation.has_animator(&node.id) {
            return;
        }
        let time = self.params.time;

        let position = animation.sample(&node.id, Channel::Position, time);
        stack.translate(position * self.config.position_scale);

        let rotation = animation.sample(&node.id, Channel::Rotation, time);
        stack.rotate(rotation_xyz(rotation * (std::f32::consts::PI / 180.0)));

        let scale = animation.sample(&node.id, Channel::Scale, time);
        stack.scale(scale);
    }

    /// Default drawing of `node` without touching the stack: faces for meshes,
    /// visible children for bones.
    pub fn render_inner(&mut self, stack: &mut PoseStack, node: &Node) {
        match &node.kind {
            NodeKind::Mesh(_) => self.render_faces(stack, node),
            NodeKind::Bone(bone) => {
                if !self.is_visible(node) {
                    tracing::trace!("skipping hidden bone '{}'", node.name);
                    return;
                }
                for child in &bone.children {
                    self.render_node(stack, child);
                }
            }
        }
    }

    /// Visibility of a node for this pass's actor.
    ///
    /// The near and far detail bones follow the actor's range predicate and
    /// ignore their authored flag. Meshes are always visible.
    pub fn is_visible(&self, node: &Node) -> bool {
        match &node.kind {
            NodeKind::Mesh(_) => true,
            NodeKind::Bone(bone) => {
                if node.name == self.config.lod_near_bone {
                    self.actor.is_within_near_range()
                } else if node.name == self.config.lod_far_bone {
                    !self.actor.is_within_near_range()
                } else {
                    bone.visible
                }
            }
        }
    }

    /// Emits every face of a mesh with the handler's or the default materials.
    pub fn render_faces(&mut self, stack: &PoseStack, node: &Node) {
        let materials = self.handler.and_then(|h| h.materials.as_deref());
        let color = self.params.color;
        self.emit_faces(
            stack,
            node.faces(),
            color,
            |face| match materials {
                Some(materials) => materials(node, face),
                None => default_material(node, face),
            },
            |position| position,
        );
    }

    /// Shared face emission: `material` picks the target per face and
    /// `displace` may move local positions before they are transformed.
    pub(crate) fn emit_faces(
        &mut self,
        stack: &PoseStack,
        faces: &[Face],
        color: Color,
        material: impl Fn(&Face) -> Material,
        displace: impl Fn(Vec3) -> Vec3,
    ) {
        let light = self.params.light;
        for face in faces {
            let vertices = face.vertices.map(|v| {
                DrawVertex::new(
                    stack.transform_point(displace(v.position)),
                    color,
                    v.uv,
                    light,
                    stack.transform_normal(v.normal),
                )
            });
            self.sink.quad(material(face), &vertices);
        }
    }
}
