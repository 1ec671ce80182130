//! Orientation of a vehicle body before its model is traversed.

use glam::{Quat, Vec3};

use crate::pose::PoseStack;

/// Yaw, pitch and roll of a vehicle in degrees, plus wind sway.
///
/// Wind nudges pitch by its `z` and roll by its `x` component while the vehicle
/// is airborne.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attitude {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub wind: Vec3,
    pub grounded: bool,
}

impl Attitude {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            ..Default::default()
        }
    }

    pub fn wind(mut self, wind: Vec3) -> Self {
        self.wind = wind;
        self
    }

    pub fn grounded(mut self, grounded: bool) -> Self {
        self.grounded = grounded;
        self
    }

    /// Wind sway in effect: none on the ground.
    pub fn effective_wind(&self) -> Vec3 {
        if self.grounded { Vec3::ZERO } else { self.wind }
    }

    /// Body rotation: yaw about -Y, then pitch about X, then roll about Z.
    pub fn rotation(&self) -> Quat {
        let wind = self.effective_wind();
        Quat::from_rotation_y((-self.yaw).to_radians())
            * Quat::from_rotation_x((self.pitch + wind.z).to_radians())
            * Quat::from_rotation_z((self.roll + wind.x).to_radians())
    }

    /// Applies the body rotation to the top of the stack.
    pub fn apply(&self, stack: &mut PoseStack) {
        let wind = self.effective_wind();
        stack.rotate(Quat::from_rotation_y((-self.yaw).to_radians()));
        stack.rotate(Quat::from_rotation_x((self.pitch + wind.z).to_radians()));
        stack.rotate(Quat::from_rotation_z((self.roll + wind.x).to_radians()));
    }
}
