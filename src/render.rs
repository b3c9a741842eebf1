//! Render composition and pipeline batching.
//!
//! A scene's [`crate::scene::Scene::on_render`] returns a [`Render`] tree
//! describing what to draw this frame. The frame composer flattens the tree
//! into per-pipeline batches so each pipeline is bound exactly once: all
//! opaque draws first, then all transparent ones.

use crate::data_structures::model::Model;

/// One instanced draw: a model plus the buffer holding its per-instance
/// transforms.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// How a scene wants its objects drawn.
pub enum Render<'a> {
    None,
    Opaque(Instanced<'a>),
    OpaqueBatch(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    TransparentBatch(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Flatten into the opaque and transparent batch lists.
    pub(crate) fn collect_batches(
        self,
        opaques: &mut Vec<Instanced<'a>>,
        transparents: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Opaque(instanced) => opaques.push(instanced),
            Render::OpaqueBatch(mut vec) => opaques.append(&mut vec),
            Render::Transparent(instanced) => transparents.push(instanced),
            Render::TransparentBatch(mut vec) => transparents.append(&mut vec),
            Render::Composed(renders) => {
                for render in renders {
                    render.collect_batches(opaques, transparents);
                }
            }
            Render::None => (),
        }
    }
}
