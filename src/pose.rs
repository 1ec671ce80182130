//! Caller-owned transform stack used during traversal.
//!
//! Each [`Pose`] pairs the position matrix with the matrix used for normals.
//! [`PoseStack::scoped`] pushes a frame, runs a closure and pops on the way
//! out, so no exit path of the closure can leak a frame.
//!
//! ```
//! use hangar::{PoseStack, Vec3};
//!
//! let mut stack = PoseStack::new();
//! stack.scoped(|stack| {
//!     stack.translate(Vec3::new(0.0, 1.0, 0.0));
//!     assert_eq!(stack.transform_point(Vec3::ZERO), Vec3::Y);
//! });
//! assert_eq!(stack.depth(), 1);
//! assert_eq!(stack.transform_point(Vec3::ZERO), Vec3::ZERO);
//! ```

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Quaternion for XYZ Euler angles in radians: X first, then Y, then Z.
pub fn rotation_xyz(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z)
}

/// One frame of the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Local-to-world position matrix.
    pub pose: Mat4,
    /// Matrix applied to normals.
    pub normal: Mat3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        pose: Mat4::IDENTITY,
        normal: Mat3::IDENTITY,
    };
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A stack of [`Pose`]s, never empty.
#[derive(Clone, Debug)]
pub struct PoseStack {
    poses: Vec<Pose>,
}

impl Default for PoseStack {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseStack {
    /// Creates a stack holding a single identity pose.
    pub fn new() -> Self {
        Self::from_pose(Pose::IDENTITY)
    }

    /// Creates a stack whose base frame is `pose`.
    pub fn from_pose(pose: Pose) -> Self {
        let mut poses = Vec::with_capacity(16);
        poses.push(pose);
        Self { poses }
    }

    /// Number of frames, including the base frame.
    pub fn depth(&self) -> usize {
        self.poses.len()
    }

    pub fn last(&self) -> &Pose {
        // The base frame is never popped.
        &self.poses[self.poses.len() - 1]
    }

    fn last_mut(&mut self) -> &mut Pose {
        let top = self.poses.len() - 1;
        &mut self.poses[top]
    }

    /// Duplicates the top frame.
    pub fn push(&mut self) {
        let top = *self.last();
        self.poses.push(top);
    }

    /// Drops the top frame. Returns `false` if only the base frame is left.
    pub fn pop(&mut self) -> bool {
        if self.poses.len() <= 1 {
            tracing::warn!("refusing to pop the base pose");
            return false;
        }
        self.poses.pop();
        true
    }

    /// Runs `f` inside a freshly pushed frame and pops it afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut PoseStack) -> R) -> R {
        let depth = self.depth();
        self.push();
        let result = f(self);
        self.poses.truncate(depth);
        result
    }

    pub fn translate(&mut self, offset: Vec3) {
        let pose = self.last_mut();
        pose.pose *= Mat4::from_translation(offset);
    }

    pub fn rotate(&mut self, rotation: Quat) {
        let pose = self.last_mut();
        pose.pose *= Mat4::from_quat(rotation);
        pose.normal *= Mat3::from_quat(rotation);
    }

    /// Scales the top frame.
    ///
    /// Normals receive the inverse scale, renormalised by the cube root of the
    /// volume change. A uniform scale only flips normals when negative, and a
    /// zero component leaves the normal matrix untouched.
    pub fn scale(&mut self, scale: Vec3) {
        let pose = self.last_mut();
        pose.pose *= Mat4::from_scale(scale);

        if scale.x == scale.y && scale.y == scale.z {
            if scale.x < 0.0 {
                pose.normal *= -1.0;
            }
        } else if scale.x != 0.0 && scale.y != 0.0 && scale.z != 0.0 {
            let inverse = Mat3::from_diagonal(scale.recip());
            let volume = (scale.x * scale.y * scale.z).abs().cbrt();
            pose.normal = pose.normal * inverse * volume;
        }
    }

    /// Applies the top frame to a point.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.last().pose.transform_point3(point)
    }

    /// Applies the top frame's normal matrix to a normal.
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.last().normal * normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn push_and_pop_restore_the_frame() {
        let mut stack = PoseStack::new();
        stack.push();
        stack.translate(Vec3::X);
        assert_eq!(stack.depth(), 2);
        assert!(stack.pop());
        assert_eq!(*stack.last(), Pose::IDENTITY);
    }

    #[test]
    fn base_frame_cannot_be_popped() {
        let mut stack = PoseStack::new();
        assert!(!stack.pop());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn scoped_pops_even_when_closure_returns_early() {
        let mut stack = PoseStack::new();
        let handled = stack.scoped(|stack| {
            stack.push();
            stack.translate(Vec3::ONE);
            if stack.depth() > 2 {
                return true;
            }
            stack.pop();
            false
        });
        assert!(handled);
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.last(), Pose::IDENTITY);
    }

    #[test]
    fn translation_then_inverse_cancels() {
        let mut stack = PoseStack::new();
        let origin = Vec3::new(0.0, 1.0, 0.0);
        stack.translate(origin);
        stack.translate(-origin);
        assert_eq!(stack.transform_point(Vec3::new(2.0, 3.0, 4.0)), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn rotation_applies_to_points_and_normals() {
        let mut stack = PoseStack::new();
        stack.rotate(rotation_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0)));
        let p = stack.transform_point(Vec3::X);
        let n = stack.transform_normal(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
        assert!(n.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn non_uniform_scale_keeps_normals_perpendicular() {
        let mut stack = PoseStack::new();
        stack.scale(Vec3::new(2.0, 1.0, 1.0));
        // Surface spanned by (1, 1, 0) and Z with normal (1, -1, 0).
        let tangent = stack.transform_point(Vec3::new(1.0, 1.0, 0.0));
        let normal = stack.transform_normal(Vec3::new(1.0, -1.0, 0.0));
        assert!(tangent.dot(normal).abs() < 1e-6);
    }

    #[test]
    fn negative_uniform_scale_flips_normals() {
        let mut stack = PoseStack::new();
        stack.scale(Vec3::splat(-1.0));
        assert_eq!(stack.transform_normal(Vec3::Y), -Vec3::Y);
    }

    #[test]
    fn zero_scale_leaves_normals_finite() {
        let mut stack = PoseStack::new();
        stack.scale(Vec3::new(0.0, 1.0, 2.0));
        assert!(stack.transform_normal(Vec3::Y).is_finite());
    }
}
