use crate::block::Block;
use crate::chunk::{CHUNK_SIZE, Chunk};

/// All chunks of a stage in one flat array, allocated in a single pass at
/// build time. Resolves world coordinates to the owning chunk in O(1):
/// horizontal coordinates divide by the chunk side, the vertical coordinate
/// is the slab index directly.
#[derive(Clone, Debug)]
pub struct ChunkGrid {
    chunks_x: usize,
    chunks_y: usize,
    levels: usize,
    chunks: Vec<Chunk>,
}

impl ChunkGrid {
    pub fn new(chunks_x: usize, chunks_y: usize, levels: usize) -> ChunkGrid {
        let mut chunks = Vec::with_capacity(chunks_x * chunks_y * levels);
        for z in 0..levels {
            for cy in 0..chunks_y {
                for cx in 0..chunks_x {
                    let index = (z * chunks_y + cy) * chunks_x + cx;
                    chunks.push(Chunk::new(
                        index,
                        (cx * CHUNK_SIZE) as i32,
                        (cy * CHUNK_SIZE) as i32,
                        z as i32,
                    ));
                }
            }
        }
        ChunkGrid {
            chunks_x,
            chunks_y,
            levels,
            chunks,
        }
    }

    #[inline]
    pub fn chunks_x(&self) -> usize {
        self.chunks_x
    }

    #[inline]
    pub fn chunks_y(&self) -> usize {
        self.chunks_y
    }

    #[inline]
    pub fn levels(&self) -> usize {
        self.levels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Flat index of the chunk owning an in-bounds world coordinate.
    #[inline]
    pub fn chunk_index_of(&self, x: i32, y: i32, z: i32) -> usize {
        let cx = x as usize / CHUNK_SIZE;
        let cy = y as usize / CHUNK_SIZE;
        (z as usize * self.chunks_y + cy) * self.chunks_x + cx
    }

    #[inline]
    pub fn chunk(&self, index: usize) -> &Chunk {
        &self.chunks[index]
    }

    #[inline]
    pub fn chunk_mut(&mut self, index: usize) -> &mut Chunk {
        &mut self.chunks[index]
    }

    #[inline]
    pub fn chunk_containing(&self, x: i32, y: i32, z: i32) -> &Chunk {
        &self.chunks[self.chunk_index_of(x, y, z)]
    }

    #[inline]
    pub fn chunk_containing_mut(&mut self, x: i32, y: i32, z: i32) -> &mut Chunk {
        let i = self.chunk_index_of(x, y, z);
        &mut self.chunks[i]
    }

    #[inline]
    pub fn block(&self, x: i32, y: i32, z: i32) -> &Block {
        self.chunk_containing(x, y, z).block_local(
            x as usize % CHUNK_SIZE,
            y as usize % CHUNK_SIZE,
        )
    }

    #[inline]
    pub fn block_mut(&mut self, x: i32, y: i32, z: i32) -> &mut Block {
        self.chunk_containing_mut(x, y, z).block_local_mut(
            x as usize % CHUNK_SIZE,
            y as usize % CHUNK_SIZE,
        )
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.iter_mut()
    }
}
