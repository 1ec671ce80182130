//! Static model data: the bone/mesh tree and its animations.
//!
//! A [`Model`] is built once from pre-parsed data and is read-only afterwards.
//! Every node carries a local origin and a static rotation; bones own their
//! children, meshes own textured quads.
//!
//! ```
//! use hangar::{Face, FaceVertex, Model, Node, TextureId, Vec3};
//!
//! let quad = Face::new(
//!     [
//!         FaceVertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([1.0, 1.0, 0.0], [1.0, 1.0], [0.0, 0.0, 1.0]),
//!         FaceVertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
//!     ],
//!     TextureId(0),
//! );
//!
//! let root = Node::bone("root", "root").child(
//!     Node::bone("wing", "wing")
//!         .origin(Vec3::new(0.0, 1.0, 0.0))
//!         .child(Node::mesh("wing_panel", "panel", vec![quad])),
//! );
//!
//! let model = Model::new(root, Vec::new()).unwrap();
//! assert!(model.find_by_name("panel").is_some());
//! ```

use std::collections::HashSet;

use glam::Vec3;
use thiserror::Error;

use crate::animation::{Animation, Channel};

/// Stable identity of a node within a model.
///
/// Authoring tools hand these out as UUID strings; any unique string works.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Host-assigned handle to a texture.
///
/// The crate never touches texture data; the handle only travels with draw
/// records so the sink can pick the right material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One corner of a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceVertex {
    /// Position in the owning node's local space.
    pub position: Vec3,
    pub uv: [f32; 2],
    pub normal: Vec3,
}

impl FaceVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position: Vec3::from(position),
            uv,
            normal: Vec3::from(normal),
        }
    }
}

/// A textured quad.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub vertices: [FaceVertex; 4],
    pub texture: TextureId,
    /// Whether back faces are culled when this face is drawn.
    pub cull: bool,
}

impl Face {
    /// Creates a culled face.
    pub fn new(vertices: [FaceVertex; 4], texture: TextureId) -> Self {
        Self {
            vertices,
            texture,
            cull: true,
        }
    }

    /// Sets the culling flag.
    pub fn cull(mut self, cull: bool) -> Self {
        self.cull = cull;
        self
    }
}

/// A bone: a pivot with children.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    /// Authored visibility. Overridden for the level-of-detail bones.
    pub visible: bool,
    pub children: Vec<Node>,
}

/// The two kinds of node a model tree is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Bone(Bone),
    /// A face container.
    Mesh(Vec<Face>),
}

/// A node of the model tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Pivot of the node in its parent's frame.
    pub origin: Vec3,
    /// Static rotation as XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub kind: NodeKind,
}

impl Node {
    /// Creates a visible bone with no children.
    pub fn bone(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin: Vec3::ZERO,
            rotation: Vec3::ZERO,
            kind: NodeKind::Bone(Bone {
                visible: true,
                children: Vec::new(),
            }),
        }
    }

    /// Creates a face container.
    pub fn mesh(id: impl Into<NodeId>, name: impl Into<String>, faces: Vec<Face>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin: Vec3::ZERO,
            rotation: Vec3::ZERO,
            kind: NodeKind::Mesh(faces),
        }
    }

    pub fn origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the authored visibility. Has no effect on meshes.
    pub fn visible(mut self, visible: bool) -> Self {
        if let NodeKind::Bone(bone) = &mut self.kind {
            bone.visible = visible;
        }
        self
    }

    /// Appends a child. Has no effect on meshes.
    pub fn child(mut self, child: Node) -> Self {
        if let NodeKind::Bone(bone) = &mut self.kind {
            bone.children.push(child);
        }
        self
    }

    pub fn is_bone(&self) -> bool {
        matches!(self.kind, NodeKind::Bone(_))
    }

    /// Children of a bone; empty for meshes.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Bone(bone) => &bone.children,
            NodeKind::Mesh(_) => &[],
        }
    }

    /// Faces of a mesh; empty for bones.
    pub fn faces(&self) -> &[Face] {
        match &self.kind {
            NodeKind::Mesh(faces) => faces,
            NodeKind::Bone(_) => &[],
        }
    }
}

/// Errors raised while assembling a [`Model`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A keyframe time is NaN or infinite.
    #[error("non-finite keyframe time on {channel:?} of node {node} in animation '{animation}'")]
    NonFiniteKeyframe {
        /// Animation holding the keyframe.
        animation: String,
        /// Node the channel animates.
        node: NodeId,
        /// Offending channel.
        channel: Channel,
    },
}

/// A validated, read-only model.
#[derive(Clone, Debug)]
pub struct Model {
    root: Node,
    animations: Vec<Animation>,
}

impl Model {
    /// Validates the tree and animations and assembles the model.
    ///
    /// Node ids must be unique and keyframe times finite. Animators that
    /// target nodes missing from the tree are kept and logged.
    pub fn new(root: Node, animations: Vec<Animation>) -> Result<Self, ModelError> {
        let mut seen = HashSet::new();
        let mut stack = vec![&root];
        while let Some(node) = stack.pop() {
            if !seen.insert(&node.id) {
                return Err(ModelError::DuplicateNode(node.id.clone()));
            }
            stack.extend(node.children().iter().rev());
        }

        for animation in &animations {
            for (node, animator) in animation.animators() {
                for channel in Channel::ALL {
                    if animator
                        .keyframes(channel)
                        .iter()
                        .any(|k| !k.time.is_finite())
                    {
                        return Err(ModelError::NonFiniteKeyframe {
                            animation: animation.name().to_owned(),
                            node: node.clone(),
                            channel,
                        });
                    }
                }
                if !seen.contains(node) {
                    tracing::warn!(
                        "animation '{}' targets unknown node {}",
                        animation.name(),
                        node
                    );
                }
            }
        }

        tracing::debug!(
            "model '{}' built: {} nodes, {} animations",
            root.name,
            seen.len(),
            animations.len()
        );

        Ok(Self { root, animations })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// The animation applied during rendering: always the first one.
    pub fn active_animation(&self) -> Option<&Animation> {
        self.animations.first()
    }

    /// Depth-first, pre-order iterator over every node.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![&self.root],
        }
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.nodes().find(|node| &node.id == id)
    }

    /// First node with the given name in depth-first order.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|node| node.name == name)
    }
}

/// Iterator returned by [`Model::nodes`].
pub struct Nodes<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animator, Interpolation, Keyframe};

    fn tree() -> Node {
        Node::bone("root", "root")
            .child(Node::bone("a", "left").child(Node::mesh("a1", "left_mesh", Vec::new())))
            .child(Node::bone("b", "right"))
    }

    #[test]
    fn nodes_iterate_depth_first() {
        let model = Model::new(tree(), Vec::new()).unwrap();
        let names: Vec<&str> = model.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["root", "left", "left_mesh", "right"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let root = Node::bone("root", "root")
            .child(Node::bone("x", "one"))
            .child(Node::bone("x", "two"));
        let err = Model::new(root, Vec::new()).unwrap_err();
        assert_eq!(err, ModelError::DuplicateNode(NodeId::new("x")));
    }

    #[test]
    fn non_finite_keyframes_are_rejected() {
        let animator = Animator::new().channel(
            Channel::Position,
            vec![Keyframe::new(f32::NAN, Vec3::ONE, Interpolation::Linear)],
        );
        let animation = Animation::new("fly", 1.0).animator("root", animator);
        let err = Model::new(tree(), vec![animation]).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteKeyframe { channel: Channel::Position, .. }));
    }

    #[test]
    fn lookups_by_id_and_name() {
        let model = Model::new(tree(), Vec::new()).unwrap();
        assert_eq!(model.find(&NodeId::new("b")).unwrap().name, "right");
        assert_eq!(model.find_by_name("left_mesh").unwrap().id.as_str(), "a1");
        assert!(model.find_by_name("missing").is_none());
    }

    #[test]
    fn builders_ignore_bone_only_settings_on_meshes() {
        let mesh = Node::mesh("m", "m", Vec::new())
            .visible(false)
            .child(Node::bone("c", "c"));
        assert!(mesh.children().is_empty());
        assert!(!mesh.is_bone());
    }

    #[test]
    fn first_animation_is_active() {
        let model = Model::new(
            tree(),
            vec![Animation::new("first", 1.0), Animation::new("second", 2.0)],
        )
        .unwrap();
        assert_eq!(model.active_animation().unwrap().name(), "first");
    }
}
