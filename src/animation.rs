//! Keyframe animations and the channel sampler.
//!
//! An [`Animation`] maps node ids to [`Animator`]s. Each animator holds three
//! independent channels (position, rotation, scale) of time-sorted
//! [`Keyframe`]s. Sampling a node or channel with no data returns the channel's
//! identity value, so absent animation never needs special casing.
//!
//! Values are in authoring units: position in pixels, rotation in degrees,
//! scale as a factor.
//!
//! ```
//! use hangar::{Animation, Animator, Channel, Interpolation, Keyframe, NodeId, Vec3};
//!
//! let spin = Animator::new().channel(
//!     Channel::Rotation,
//!     vec![
//!         Keyframe::new(0.0, Vec3::ZERO, Interpolation::Linear),
//!         Keyframe::new(1.0, Vec3::new(0.0, 360.0, 0.0), Interpolation::Linear),
//!     ],
//! );
//! let animation = Animation::new("propeller", 1.0).animator("prop", spin);
//!
//! let half = animation.sample(&NodeId::new("prop"), Channel::Rotation, 0.5);
//! assert_eq!(half, Vec3::new(0.0, 180.0, 0.0));
//! ```

use std::collections::HashMap;

use glam::Vec3;

use crate::model::NodeId;

/// One of the three independently sampled components of an animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Rotation,
    Scale,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Position, Channel::Rotation, Channel::Scale];

    /// The value sampled when a channel has no data.
    pub const fn identity(self) -> Vec3 {
        match self {
            Channel::Position | Channel::Rotation => Vec3::ZERO,
            Channel::Scale => Vec3::ONE,
        }
    }

    const fn index(self) -> usize {
        match self {
            Channel::Position => 0,
            Channel::Rotation => 1,
            Channel::Scale => 2,
        }
    }
}

/// How the segment starting (or ending) at a keyframe is interpolated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Uniform Catmull-Rom spline through the neighbouring keyframes.
    CatmullRom,
    /// Hold the value until the next keyframe.
    Step,
}

/// A single authored value at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: Vec3,
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(time: f32, value: Vec3, interpolation: Interpolation) -> Self {
        Self {
            time,
            value,
            interpolation,
        }
    }
}

/// Keyframe channels for one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animator {
    channels: [Vec<Keyframe>; 3],
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a channel's keyframes. They are sorted by time.
    pub fn channel(mut self, channel: Channel, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.channels[channel.index()] = keyframes;
        self
    }

    pub fn keyframes(&self, channel: Channel) -> &[Keyframe] {
        &self.channels[channel.index()]
    }

    /// Samples one channel at `time` (already mapped into the animation's range).
    pub fn sample(&self, channel: Channel, time: f32) -> Vec3 {
        sample_keyframes(self.keyframes(channel), time).unwrap_or(channel.identity())
    }
}

/// What happens when sampling past the end of an animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopMode {
    /// Wrap around to the start.
    #[default]
    Loop,
    /// Play once, then rest on the first frame.
    Once,
    /// Play once and keep the final frame.
    Hold,
}

/// A named set of animators.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    name: String,
    length: f32,
    loop_mode: LoopMode,
    animators: HashMap<NodeId, Animator>,
}

impl Animation {
    /// Creates an empty looping animation of `length` seconds.
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length,
            loop_mode: LoopMode::default(),
            animators: HashMap::new(),
        }
    }

    pub fn loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Adds (or replaces) the animator for a node.
    pub fn animator(mut self, node: impl Into<NodeId>, animator: Animator) -> Self {
        self.animators.insert(node.into(), animator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn animators(&self) -> impl Iterator<Item = (&NodeId, &Animator)> {
        self.animators.iter()
    }

    pub fn has_animator(&self, node: &NodeId) -> bool {
        self.animators.contains_key(node)
    }

    /// Maps a playback time into the animation's range according to its loop mode.
    ///
    /// NaN maps to the start. Infinite times wrap to the start when looping.
    pub fn local_time(&self, time: f32) -> f32 {
        if time.is_nan() {
            return 0.0;
        }
        if !(self.length > 0.0 && self.length.is_finite()) {
            return time;
        }
        match self.loop_mode {
            LoopMode::Loop if time.is_infinite() => 0.0,
            LoopMode::Loop => time.rem_euclid(self.length),
            LoopMode::Once if time > self.length => 0.0,
            LoopMode::Once | LoopMode::Hold => time.clamp(0.0, self.length),
        }
    }

    /// Samples a channel of a node at `time`.
    ///
    /// Returns the channel identity when the node is not animated or the
    /// channel is empty.
    pub fn sample(&self, node: &NodeId, channel: Channel, time: f32) -> Vec3 {
        match self.animators.get(node) {
            Some(animator) => animator.sample(channel, self.local_time(time)),
            None => channel.identity(),
        }
    }
}

fn sample_keyframes(keyframes: &[Keyframe], time: f32) -> Option<Vec3> {
    let first = keyframes.first()?;
    let last = keyframes.last()?;
    if time.is_nan() || time <= first.time {
        return Some(first.value);
    }
    if time >= last.time {
        return Some(last.value);
    }

    // Index of the first keyframe strictly after `time`; bounded by the checks above.
    let next = keyframes.partition_point(|k| k.time <= time);
    let (k0, k1) = (&keyframes[next - 1], &keyframes[next]);

    let span = k1.time - k0.time;
    if span <= 0.0 {
        return Some(k1.value);
    }
    let t = (time - k0.time) / span;

    let value = if k0.interpolation == Interpolation::Step {
        k0.value
    } else if k0.interpolation == Interpolation::CatmullRom
        || k1.interpolation == Interpolation::CatmullRom
    {
        let before = keyframes.get(next.wrapping_sub(2)).unwrap_or(k0);
        let after = keyframes.get(next + 1).unwrap_or(k1);
        catmull_rom(before.value, k0.value, k1.value, after.value, t)
    } else {
        k0.value.lerp(k1.value, t)
    };
    Some(value)
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
