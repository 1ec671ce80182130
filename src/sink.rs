//! Draw records emitted by the traversal and the sink they are handed to.
//!
//! Traversal never rasterizes anything itself. Every face becomes one call to
//! [`VertexSink::quad`] with four fully transformed [`DrawVertex`] records and
//! the [`Material`] the face should be drawn with.
//!
//! # Vertex Layout
//!
//! [`DrawVertex`] is `#[repr(C)]` and [`bytemuck::Pod`] (52 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | color     | Float32x4 | 12     | 1               |
//! | uv        | Float32x2 | 28     | 2               |
//! | light     | Uint32    | 36     | 3               |
//! | normal    | Float32x3 | 40     | 4               |

use crate::color::Color;
use crate::model::TextureId;

/// Packed light value for full block and sky light.
pub const FULL_BRIGHT: u32 = pack_light(15, 15);

/// Packs block and sky light levels (0..=15) the way lightmap coordinates are stored.
pub const fn pack_light(block: u32, sky: u32) -> u32 {
    ((block & 0xF) << 4) | ((sky & 0xF) << 20)
}

/// One transformed vertex ready for rasterization.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    /// Packed lightmap coordinates, see [`pack_light`].
    pub light: u32,
    pub normal: [f32; 3],
}

impl DrawVertex {
    /// The wgpu vertex buffer layout for [`DrawVertex`] data.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<DrawVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 28,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
            // light
            wgpu::VertexAttribute {
                offset: 36,
                shader_location: 3,
                format: wgpu::VertexFormat::Uint32,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 40,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(
        position: glam::Vec3,
        color: Color,
        uv: [f32; 2],
        light: u32,
        normal: glam::Vec3,
    ) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            uv,
            light,
            normal: normal.to_array(),
        }
    }
}

/// Pipeline state a face is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    /// Alpha-tested, back faces culled.
    Cutout,
    /// Alpha-tested, double sided.
    CutoutNoCull,
    /// Decal layers: no outline pass.
    NoOutline,
}

/// Texture plus pipeline state: the unit draws are batched by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Material {
    pub texture: TextureId,
    pub layer: RenderLayer,
}

impl Material {
    pub const fn new(texture: TextureId, layer: RenderLayer) -> Self {
        Self { texture, layer }
    }
}

/// Receives faces in draw order.
pub trait VertexSink {
    /// Consumes one quad. Vertices form a fan: 0-1-2, 2-3-0.
    fn quad(&mut self, material: Material, vertices: &[DrawVertex; 4]);
}

impl<S: VertexSink + ?Sized> VertexSink for &mut S {
    fn quad(&mut self, material: Material, vertices: &[DrawVertex; 4]) {
        (**self).quad(material, vertices);
    }
}
