use tellus_substance::SubstanceCatalog;

use crate::block::Block;

pub const CHUNK_SIZE: usize = 64;
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// A 64x64 slab of blocks, exactly one z-level tall. The unit of mesh
/// rebuilding and of memory pooling: all blocks live in one contiguous arena
/// allocated at construction and never resized.
#[derive(Clone, Debug)]
pub struct Chunk {
    index: usize,
    base_x: i32,
    base_y: i32,
    z: i32,
    blocks: Vec<Block>,
    mesh_dirty: bool,
}

impl Chunk {
    pub fn new(index: usize, base_x: i32, base_y: i32, z: i32) -> Chunk {
        let mut blocks = Vec::with_capacity(CHUNK_AREA);
        blocks.resize_with(CHUNK_AREA, Block::empty);
        Chunk {
            index,
            base_x,
            base_y,
            z,
            blocks,
            mesh_dirty: false,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn base(&self) -> (i32, i32, i32) {
        (self.base_x, self.base_y, self.z)
    }

    /// Row-major local index within the arena.
    #[inline]
    pub fn idx(lx: usize, ly: usize) -> usize {
        ly * CHUNK_SIZE + lx
    }

    #[inline]
    pub fn block_local(&self, lx: usize, ly: usize) -> &Block {
        &self.blocks[Self::idx(lx, ly)]
    }

    #[inline]
    pub fn block_local_mut(&mut self, lx: usize, ly: usize) -> &mut Block {
        &mut self.blocks[Self::idx(lx, ly)]
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        wz == self.z
            && wx >= self.base_x
            && wx < self.base_x + CHUNK_SIZE as i32
            && wy >= self.base_y
            && wy < self.base_y + CHUNK_SIZE as i32
    }

    /// True once any contained block's visible geometry may have changed and
    /// the renderer has not yet rebuilt this chunk's mesh.
    #[inline]
    pub fn mesh_dirty(&self) -> bool {
        self.mesh_dirty
    }

    /// Set by the stage on mutation; only the renderer clears it.
    #[inline]
    pub(crate) fn mark_mesh_dirty(&mut self) {
        self.mesh_dirty = true;
    }

    #[inline]
    pub fn clear_mesh_dirty(&mut self) {
        self.mesh_dirty = false;
    }

    pub fn all_opaque(&self, catalog: &SubstanceCatalog) -> bool {
        self.blocks.iter().all(|b| b.is_opaque(catalog))
    }

    pub fn all_solid(&self, catalog: &SubstanceCatalog) -> bool {
        self.blocks.iter().all(|b| b.is_solid(catalog))
    }

    pub fn any_visible(&self, catalog: &SubstanceCatalog) -> bool {
        self.blocks.iter().any(|b| b.is_visible(catalog))
    }

    pub fn any_known(&self) -> bool {
        self.blocks.iter().any(|b| b.is_known())
    }
}
