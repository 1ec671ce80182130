//! ECS integration for rendering many model instances with `hecs`.
//!
//! Entities with a [`Transform`] and a [`ModelInstance`] are rendered by
//! [`render_world`]; an optional [`Attitude`] component orients the body
//! before traversal.
//!
//! ```
//! use hangar::*;
//!
//! let mut library = ModelLibrary::new();
//! let plane = library.add(Model::new(Node::bone("root", "root"), Vec::new()).unwrap());
//!
//! let mut world = World::new();
//! world.spawn((
//!     Transform::from_position(Vec3::new(0.0, 70.0, 0.0)),
//!     ModelInstance::new(plane),
//!     Attitude::new(45.0, 0.0, 0.0),
//! ));
//!
//! let renderer = ModelRenderer::default();
//! let mut batcher = FaceBatcher::new();
//! let drawn = render_world(&world, &library, &renderer, Vec3::ZERO, &mut batcher, 0.0, None);
//! assert_eq!(drawn, 1);
//! ```

use glam::{Quat, Vec3};
use hecs::{Entity, World};

use crate::color::Color;
use crate::handler::{Actor, PartHandler};
use crate::model::Model;
use crate::pose::PoseStack;
use crate::renderer::{DrawParams, ModelRenderer};
use crate::sink::{FULL_BRIGHT, VertexSink};
use crate::vehicle::Attitude;

/// Where an entity's model sits in the world.
///
/// Applied to a fresh [`PoseStack`] before the model is walked: translate,
/// then rotate, then scale. Body attitude, when present, comes after.
///
/// # Example
///
/// ```
/// use hangar::{PoseStack, Quat, Transform, Vec3};
///
/// // A hangar door model twice its authored size, turned to face west.
/// let placement = Transform::from_position(Vec3::new(8.0, 64.0, -3.0))
///     .rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
///     .uniform_scale(2.0);
///
/// let mut stack = PoseStack::new();
/// placement.apply(&mut stack);
/// assert_eq!(stack.transform_point(Vec3::ZERO), Vec3::new(8.0, 64.0, -3.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Placement at the world origin, unrotated, at authored size.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Pushes this placement onto the top of `stack`, normals included.
    pub fn apply(&self, stack: &mut PoseStack) {
        stack.translate(self.position);
        stack.rotate(self.rotation);
        stack.scale(self.scale);
    }
}

/// Type-safe handle to a model stored in a [`ModelLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(pub(crate) usize);

/// Storage for the models instances refer to.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: Vec<Model>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a model and returns its handle.
    pub fn add(&mut self, model: Model) -> ModelId {
        let id = self.models.len();
        self.models.push(model);
        ModelId(id)
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Component for rendering a model on an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelInstance {
    pub model: ModelId,
    /// Tint applied to every vertex.
    pub tint: Color,
    /// Packed light, see [`pack_light`](crate::pack_light).
    pub light: u32,
}

impl ModelInstance {
    /// A fully lit, untinted instance.
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            tint: Color::WHITE,
            light: FULL_BRIGHT,
        }
    }

    pub fn tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn light(mut self, light: u32) -> Self {
        self.light = light;
        self
    }
}

/// Snapshot of an entity handed to hooks as the actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityActor {
    pub entity: Entity,
    pub position: Vec3,
    pub within_near_range: bool,
}

impl Actor for EntityActor {
    fn is_within_near_range(&self) -> bool {
        self.within_near_range
    }
}

/// Renders every entity that has a [`Transform`] and a [`ModelInstance`].
///
/// An entity is within near range when its distance to `viewer` is at most
/// the renderer's `near_range`. Instances pointing at unknown models are
/// skipped. Returns the number of instances rendered.
pub fn render_world(
    world: &World,
    library: &ModelLibrary,
    renderer: &ModelRenderer,
    viewer: Vec3,
    sink: &mut dyn VertexSink,
    time: f32,
    handler: Option<&PartHandler<EntityActor>>,
) -> usize {
    let near_range = renderer.config().near_range;
    let mut query = world.query::<(&Transform, &ModelInstance, Option<&Attitude>)>();

    let mut drawn = 0;
    for (entity, (transform, instance, attitude)) in query.iter() {
        let Some(model) = library.get(instance.model) else {
            tracing::warn!("{:?} refers to unknown model {:?}", entity, instance.model);
            continue;
        };

        let actor = EntityActor {
            entity,
            position: transform.position,
            within_near_range: transform.position.distance(viewer) <= near_range,
        };

        let mut stack = PoseStack::new();
        transform.apply(&mut stack);
        if let Some(attitude) = attitude {
            attitude.apply(&mut stack);
        }

        let params = DrawParams::new()
            .light(instance.light)
            .time(time)
            .color(instance.tint);
        renderer.render_model(model, &mut stack, &mut *sink, &actor, handler, params);
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FaceBatcher;
    use crate::model::{Face, FaceVertex, Node, TextureId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn lod_plane() -> Model {
        let quad = |texture| {
            Face::new(
                [
                    FaceVertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
                    FaceVertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 1.0, 0.0]),
                    FaceVertex::new([1.0, 0.0, 1.0], [1.0, 1.0], [0.0, 1.0, 0.0]),
                    FaceVertex::new([0.0, 0.0, 1.0], [0.0, 1.0], [0.0, 1.0, 0.0]),
                ],
                TextureId(texture),
            )
        };
        let root = Node::bone("root", "root")
            .child(Node::bone("near", "lod0").child(Node::mesh("nm", "near_mesh", vec![quad(1)])))
            .child(Node::bone("far", "lod1").child(Node::mesh("fm", "far_mesh", vec![quad(2)])));
        Model::new(root, Vec::new()).unwrap()
    }

    fn draw(
        world: &World,
        library: &ModelLibrary,
        handler: Option<&PartHandler<EntityActor>>,
    ) -> (usize, FaceBatcher) {
        let mut batcher = FaceBatcher::new();
        let renderer = ModelRenderer::default();
        let drawn = render_world(world, library, &renderer, Vec3::ZERO, &mut batcher, 0.0, handler);
        (drawn, batcher)
    }

    #[test]
    fn instances_pick_detail_by_viewer_distance() {
        let mut library = ModelLibrary::new();
        let plane = library.add(lod_plane());

        let mut world = World::new();
        for x in [10.0, 500.0] {
            world.spawn((
                Transform::from_position(Vec3::new(x, 0.0, 0.0)),
                ModelInstance::new(plane),
            ));
        }

        let (drawn, batcher) = draw(&world, &library, None);
        assert_eq!(drawn, 2);

        let mut textures: Vec<u32> = batcher.quads().iter().map(|q| q.material.texture.0).collect();
        textures.sort_unstable();
        assert_eq!(textures, [1, 2]);
    }

    #[test]
    fn transform_and_tint_are_applied() {
        let mut library = ModelLibrary::new();
        let plane = library.add(lod_plane());
        let tint = Color::rgb(0.2, 0.4, 0.6);

        let mut world = World::new();
        world.spawn((
            Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
            ModelInstance::new(plane).tint(tint).light(7),
        ));

        let (_, batcher) = draw(&world, &library, None);
        let v = batcher.quads()[0].vertices[0];
        assert_eq!(v.position, [0.0, 5.0, 0.0]);
        assert_eq!(v.color, tint.to_array());
        assert_eq!(v.light, 7);
    }

    #[test]
    fn placement_scales_then_rotates_then_translates() {
        let placement = Transform::new()
            .position(Vec3::new(1.0, -2.0, 3.0))
            .rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
            .scale(Vec3::new(2.0, 1.0, 1.0));
        let mut stack = PoseStack::new();
        placement.apply(&mut stack);
        // (1, 0, 0) stretches to (2, 0, 0), turns to (0, 2, 0), then moves.
        let p = stack.transform_point(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.0, 3.0), 1e-5), "{p}");
    }

    #[test]
    fn unknown_models_are_skipped() {
        let library = ModelLibrary::new();
        let mut world = World::new();
        world.spawn((Transform::new(), ModelInstance::new(ModelId(3))));

        let (drawn, batcher) = draw(&world, &library, None);
        assert_eq!(drawn, 0);
        assert!(batcher.is_empty());
    }

    #[test]
    fn hooks_receive_the_entity() {
        let mut library = ModelLibrary::new();
        let plane = library.add(lod_plane());
        let mut world = World::new();
        let entity = world.spawn((Transform::new(), ModelInstance::new(plane)));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let handler =
            PartHandler::<EntityActor>::new().on_animate(move |bone, actor, _stack, _time| {
                if bone == "root" {
                    log.borrow_mut().push(actor.entity);
                }
            });

        draw(&world, &library, Some(&handler));
        assert_eq!(*seen.borrow(), [entity]);
    }
}
