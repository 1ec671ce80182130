//! In-memory sink that collects quads and uploads them as GPU buffers.
//!
//! [`FaceBatcher`] keeps every quad in emission order, which is what decal
//! layering relies on, and can group them per [`Material`] for upload:
//!
//! ```ignore
//! let mut batcher = FaceBatcher::new();
//! renderer.render_model(
//!     &model,
//!     &mut stack,
//!     &mut batcher,
//!     &actor,
//!     None,
//!     DrawParams::new().time(time),
//! );
//!
//! for batch in batcher.upload(&device) {
//!     render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
//!     render_pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
//!     render_pass.draw_indexed(0..batch.index_count, 0, 0..1);
//! }
//! batcher.clear();
//! ```

use crate::sink::{DrawVertex, Material, VertexSink};

/// A quad as it was handed to the sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub material: Material,
    pub vertices: [DrawVertex; 4],
}

/// Vertices of one material, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub material: Material,
    pub vertices: Vec<DrawVertex>,
}

impl Batch {
    /// Triangle indices for this batch's quads.
    pub fn indices(&self) -> Vec<u32> {
        quad_indices(self.vertices.len() / 4)
    }
}

/// GPU-resident buffers for one [`Batch`].
#[derive(Debug)]
pub struct GpuBatch {
    pub material: Material,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Two counter-clockwise triangles per quad: 0-1-2, 2-3-0.
pub fn quad_indices(quads: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads * 6);
    for quad in 0..quads as u32 {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// A [`VertexSink`] that records quads for inspection or upload.
#[derive(Clone, Debug, Default)]
pub struct FaceBatcher {
    quads: Vec<Quad>,
}

impl FaceBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every quad received so far, in order.
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Forgets all recorded quads, keeping the allocation.
    pub fn clear(&mut self) {
        self.quads.clear();
    }

    /// Groups quads per material, ordered by each material's first appearance.
    pub fn batches(&self) -> Vec<Batch> {
        let mut batches: Vec<Batch> = Vec::new();
        for quad in &self.quads {
            let slot = match batches.iter().position(|b| b.material == quad.material) {
                Some(slot) => slot,
                None => {
                    batches.push(Batch {
                        material: quad.material,
                        vertices: Vec::new(),
                    });
                    batches.len() - 1
                }
            };
            batches[slot].vertices.extend_from_slice(&quad.vertices);
        }
        batches
    }

    /// Uploads every batch into fresh vertex and index buffers.
    pub fn upload(&self, device: &wgpu::Device) -> Vec<GpuBatch> {
        use wgpu::util::DeviceExt;

        self.batches()
            .into_iter()
            .map(|batch| {
                let indices = batch.indices();

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Batch Vertex Buffer"),
                    contents: bytemuck::cast_slice(&batch.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Batch Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                GpuBatch {
                    material: batch.material,
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                }
            })
            .collect()
    }
}

impl VertexSink for FaceBatcher {
    fn quad(&mut self, material: Material, vertices: &[DrawVertex; 4]) {
        self.quads.push(Quad {
            material,
            vertices: *vertices,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::model::TextureId;
    use crate::sink::{FULL_BRIGHT, RenderLayer};
    use glam::Vec3;

    fn quad(x: f32) -> [DrawVertex; 4] {
        [0.0, 1.0, 2.0, 3.0].map(|i| {
            DrawVertex::new(Vec3::new(x, i, 0.0), Color::WHITE, [0.0, 0.0], FULL_BRIGHT, Vec3::Z)
        })
    }

    #[test]
    fn quad_indices_form_two_triangles_each() {
        assert_eq!(quad_indices(2), vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert!(quad_indices(0).is_empty());
    }

    #[test]
    fn batches_group_by_material_in_first_seen_order() {
        let a = Material::new(TextureId(1), RenderLayer::Cutout);
        let b = Material::new(TextureId(2), RenderLayer::CutoutNoCull);

        let mut batcher = FaceBatcher::new();
        batcher.quad(a, &quad(0.0));
        batcher.quad(b, &quad(1.0));
        batcher.quad(a, &quad(2.0));

        let batches = batcher.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].material, a);
        assert_eq!(batches[0].vertices.len(), 8);
        assert_eq!(batches[0].vertices[4].position[0], 2.0);
        assert_eq!(batches[1].material, b);
        assert_eq!(batches[1].indices().len(), 6);
    }

    #[test]
    fn clear_empties_the_batcher() {
        let mut batcher = FaceBatcher::new();
        batcher.quad(Material::new(TextureId(0), RenderLayer::Cutout), &quad(0.0));
        assert_eq!(batcher.len(), 1);
        batcher.clear();
        assert!(batcher.is_empty());
    }
}
