use std::sync::Arc;

use rayon::prelude::*;
use tellus_substance::{SubstanceCatalog, SubstanceId};

use crate::block::{Block, FluidFlow, Layer, Prop};
use crate::chunk::CHUNK_SIZE;
use crate::column::ColumnStore;
use crate::face::{Face, FaceSet};
use crate::grid::ChunkGrid;

/// Stage volume in blocks. Horizontal extents are rounded up to a whole
/// number of chunks; the vertical extent is the number of one-level slabs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StageDims {
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
}

impl StageDims {
    pub fn clamped(size_x: i32, size_y: i32, size_z: i32) -> StageDims {
        let side = CHUNK_SIZE as i32;
        let round_up = |v: i32| ((v.max(1) + side - 1) / side) * side;
        StageDims {
            size_x: round_up(size_x),
            size_y: round_up(size_y),
            size_z: size_z.max(1),
        }
    }

    #[inline]
    pub fn total_blocks(&self) -> u64 {
        self.size_x as u64 * self.size_y as u64 * self.size_z as u64
    }
}

/// The whole voxel world: chunk storage, column cache, and the validated
/// accessor surface every terrain builder mutates through.
pub struct Stage {
    dims: StageDims,
    seed: i32,
    catalog: Arc<SubstanceCatalog>,
    chunks: ChunkGrid,
    columns: ColumnStore,
    cursor: (i32, i32, i32),
    ready: bool,
    okay_to_render: bool,
    // Chunks whose mesh went stale since the consumer last drained, in
    // first-dirtied order. `in_pending` dedupes; it is distinct from the
    // per-chunk mesh_dirty flag, which only the renderer clears.
    pending_dirty: Vec<usize>,
    in_pending: Vec<bool>,
}

impl Stage {
    /// An idle, empty stage. Call [`Stage::build`] to allocate the volume.
    pub fn new(catalog: Arc<SubstanceCatalog>) -> Stage {
        Stage {
            dims: StageDims {
                size_x: 0,
                size_y: 0,
                size_z: 0,
            },
            seed: 0,
            catalog,
            chunks: ChunkGrid::new(0, 0, 0),
            columns: ColumnStore::new(0, 0),
            cursor: (0, 0, 0),
            ready: false,
            okay_to_render: false,
            pending_dirty: Vec::new(),
            in_pending: Vec::new(),
        }
    }

    /// Allocates every chunk and column for the requested volume in one
    /// pass. The stage is never rebuilt in place; construct a fresh one for
    /// a new world.
    pub fn build(&mut self, dims: StageDims, seed: i32) {
        let dims = StageDims::clamped(dims.size_x, dims.size_y, dims.size_z);
        let chunks_x = dims.size_x as usize / CHUNK_SIZE;
        let chunks_y = dims.size_y as usize / CHUNK_SIZE;
        let levels = dims.size_z as usize;
        self.chunks = ChunkGrid::new(chunks_x, chunks_y, levels);
        self.columns = ColumnStore::new(dims.size_x as usize, dims.size_y as usize);
        self.in_pending = vec![false; self.chunks.len()];
        self.pending_dirty = Vec::new();
        self.dims = dims;
        self.seed = seed;
        self.cursor = (0, 0, 0);
        self.ready = true;
        self.okay_to_render = false;
        log::info!(
            "stage built: {}x{}x{} blocks, {} chunks, seed {}",
            dims.size_x,
            dims.size_y,
            dims.size_z,
            self.chunks.len(),
            seed
        );
    }

    #[inline]
    pub fn dims(&self) -> StageDims {
        self.dims
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    pub fn catalog(&self) -> &SubstanceCatalog {
        &self.catalog
    }

    #[inline]
    pub fn catalog_arc(&self) -> Arc<SubstanceCatalog> {
        Arc::clone(&self.catalog)
    }

    #[inline]
    pub fn chunks(&self) -> &ChunkGrid {
        &self.chunks
    }

    #[inline]
    pub fn chunks_mut(&mut self) -> &mut ChunkGrid {
        &mut self.chunks
    }

    #[inline]
    pub fn columns(&self) -> &ColumnStore {
        &self.columns
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// True once bulk terrain generation has progressed far enough that the
    /// renderer may mesh the stage.
    #[inline]
    pub fn okay_to_render(&self) -> bool {
        self.okay_to_render
    }

    pub fn mark_renderable(&mut self) {
        self.okay_to_render = true;
    }

    #[inline]
    pub fn cursor(&self) -> (i32, i32, i32) {
        self.cursor
    }

    /// Moves the cursor, clamping it into the volume.
    pub fn set_cursor(&mut self, x: i32, y: i32, z: i32) {
        self.cursor = (
            x.clamp(0, self.dims.size_x - 1),
            y.clamp(0, self.dims.size_y - 1),
            z.clamp(0, self.dims.size_z - 1),
        );
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && x < self.dims.size_x
            && y >= 0
            && y < self.dims.size_y
            && z >= 0
            && z < self.dims.size_z
    }

    /// Out-of-bounds access is a pipeline bug, not a recoverable condition;
    /// fail loudly rather than clamp.
    #[inline]
    fn assert_in_bounds(&self, x: i32, y: i32, z: i32) {
        if !self.in_bounds(x, y, z) {
            panic!(
                "block coordinate ({}, {}, {}) outside stage volume {}x{}x{}",
                x, y, z, self.dims.size_x, self.dims.size_y, self.dims.size_z
            );
        }
    }

    #[inline]
    pub fn block(&self, x: i32, y: i32, z: i32) -> &Block {
        self.assert_in_bounds(x, y, z);
        self.chunks.block(x, y, z)
    }

    #[inline]
    fn block_mut(&mut self, x: i32, y: i32, z: i32) -> &mut Block {
        self.assert_in_bounds(x, y, z);
        self.chunks.block_mut(x, y, z)
    }

    #[inline]
    pub fn substance(&self, x: i32, y: i32, z: i32, layer: Layer) -> SubstanceId {
        self.block(x, y, z).substance(layer)
    }

    fn note_chunk_dirty(&mut self, index: usize) {
        self.chunks.chunk_mut(index).mark_mesh_dirty();
        if !self.in_pending[index] {
            self.in_pending[index] = true;
            self.pending_dirty.push(index);
        }
    }

    /// Normal mutation path: sets the substance, marks the owning chunk's
    /// mesh stale, invalidates the face caches of the block and its axis
    /// neighbors (their hidden faces depend on this block), and marks the
    /// owning column dirty.
    pub fn set_substance(&mut self, x: i32, y: i32, z: i32, layer: Layer, id: SubstanceId) {
        self.assert_in_bounds(x, y, z);
        if self.chunks.block(x, y, z).substance(layer) == id {
            return;
        }
        let own_chunk = self.chunks.chunk_index_of(x, y, z);
        {
            let b = self.chunks.block_mut(x, y, z);
            b.set_substance_raw(layer, id);
            b.mark_faces_dirty();
        }
        self.note_chunk_dirty(own_chunk);
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            if !self.in_bounds(nx, ny, nz) {
                continue;
            }
            self.chunks.block_mut(nx, ny, nz).mark_faces_dirty();
            let nchunk = self.chunks.chunk_index_of(nx, ny, nz);
            if nchunk != own_chunk {
                self.note_chunk_dirty(nchunk);
            }
        }
        self.columns.mark_dirty(x, y);
    }

    /// Bulk-generation path: substance write plus a local face-dirty mark
    /// only. Neighbor invalidation and chunk/column dirtying are skipped
    /// because the region will be repainted many times before anyone reads
    /// it; the pipeline runs an explicit stage-wide recompute barrier before
    /// the stage becomes renderable.
    pub fn set_substance_quick(&mut self, x: i32, y: i32, z: i32, layer: Layer, id: SubstanceId) {
        let b = self.block_mut(x, y, z);
        b.set_substance_raw(layer, id);
        b.mark_faces_dirty();
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z).is_solid(&self.catalog)
    }

    #[inline]
    pub fn is_traversable(&self, x: i32, y: i32, z: i32) -> bool {
        !self.is_solid(x, y, z)
    }

    #[inline]
    pub fn is_visible(&self, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z).is_visible(&self.catalog)
    }

    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z).is_opaque(&self.catalog)
    }

    #[inline]
    pub fn is_known(&self, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z).is_known()
    }

    /// Knowledge changes what the renderer draws, so the chunk goes stale,
    /// but no substance changed: face and column caches stay valid.
    pub fn set_known(&mut self, x: i32, y: i32, z: i32, known: bool) {
        self.assert_in_bounds(x, y, z);
        if self.chunks.block(x, y, z).is_known() == known {
            return;
        }
        self.chunks.block_mut(x, y, z).set_known_raw(known);
        let idx = self.chunks.chunk_index_of(x, y, z);
        self.note_chunk_dirty(idx);
    }

    #[inline]
    pub fn flow(&self, x: i32, y: i32, z: i32) -> FluidFlow {
        self.block(x, y, z).flow()
    }

    pub fn set_flow(&mut self, x: i32, y: i32, z: i32, flow: FluidFlow) {
        self.block_mut(x, y, z).set_flow_raw(flow);
    }

    pub fn add_prop(&mut self, x: i32, y: i32, z: i32, prop: Prop) {
        self.assert_in_bounds(x, y, z);
        self.chunks.block_mut(x, y, z).inventory_mut().push(prop);
        let idx = self.chunks.chunk_index_of(x, y, z);
        self.note_chunk_dirty(idx);
    }

    /// Hidden faces for one layer, recomputing lazily if the cache is dirty.
    /// A face is hidden iff a neighbor exists in that direction (stage-edge
    /// faces are always emitted) and either shares the layer's substance or
    /// is opaque on any layer.
    pub fn hidden_faces(&mut self, x: i32, y: i32, z: i32, layer: Layer) -> FaceSet {
        self.assert_in_bounds(x, y, z);
        if self.chunks.block(x, y, z).faces_dirty() {
            let (solid, fluid) = self.compute_hidden_faces(x, y, z);
            self.chunks.block_mut(x, y, z).store_hidden(solid, fluid);
        }
        self.chunks.block(x, y, z).hidden_cached(layer)
    }

    /// Cache read without recompute, for consumers that run after the caches
    /// are known clean (the render thread, the bulk column pass).
    #[inline]
    pub fn hidden_faces_cached(&self, x: i32, y: i32, z: i32, layer: Layer) -> FaceSet {
        self.block(x, y, z).hidden_cached(layer)
    }

    fn compute_hidden_faces(&self, x: i32, y: i32, z: i32) -> (FaceSet, FaceSet) {
        let mut solid = FaceSet::NONE;
        let mut fluid = FaceSet::NONE;
        let own = self.chunks.block(x, y, z);
        let own_solid = own.substance(Layer::Solid);
        let own_fluid = own.substance(Layer::Fluid);
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            if !self.in_bounds(nx, ny, nz) {
                // No neighbor to occlude a face at the world boundary.
                continue;
            }
            let nb = self.chunks.block(nx, ny, nz);
            let nb_opaque = nb.is_opaque(&self.catalog);
            solid.set(face, nb.substance(Layer::Solid) == own_solid || nb_opaque);
            fluid.set(face, nb.substance(Layer::Fluid) == own_fluid || nb_opaque);
        }
        (solid, fluid)
    }

    /// True if, after a recompute, either layer still has a face to draw.
    pub fn has_any_visible_faces(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.hidden_faces(x, y, z, Layer::Solid);
        self.chunks.block(x, y, z).has_any_visible_faces()
    }

    /// Invalidates every block's face cache. One half of the recompute
    /// barrier run when bulk generation hands over to interactive mode.
    pub fn mark_all_faces_dirty(&mut self) {
        for chunk in self.chunks.iter_mut() {
            for ly in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    chunk.block_local_mut(lx, ly).mark_faces_dirty();
                }
            }
        }
    }

    /// Eagerly recomputes every dirty face cache, chunk by chunk. Results
    /// are staged per chunk: the computation reads neighboring chunks while
    /// the write-back needs exclusive access to the owning chunk.
    pub fn refresh_hidden_faces(&mut self) {
        let n = self.chunks.len();
        let mut staged: Vec<(usize, FaceSet, FaceSet)> = Vec::new();
        for ci in 0..n {
            staged.clear();
            {
                let chunk = self.chunks.chunk(ci);
                let (bx, by, bz) = chunk.base();
                for ly in 0..CHUNK_SIZE {
                    for lx in 0..CHUNK_SIZE {
                        if !chunk.block_local(lx, ly).faces_dirty() {
                            continue;
                        }
                        let (solid, fluid) =
                            self.compute_hidden_faces(bx + lx as i32, by + ly as i32, bz);
                        staged.push((crate::chunk::Chunk::idx(lx, ly), solid, fluid));
                    }
                }
            }
            if staged.is_empty() {
                continue;
            }
            let chunk = self.chunks.chunk_mut(ci);
            for &(idx, solid, fluid) in &staged {
                let ly = idx / CHUNK_SIZE;
                let lx = idx % CHUNK_SIZE;
                chunk.block_local_mut(lx, ly).store_hidden(solid, fluid);
            }
        }
    }

    #[inline]
    pub fn column_initial_height(&self, x: i32, y: i32) -> i32 {
        self.assert_in_bounds(x, y, 0);
        self.columns.get(x, y).initial_height
    }

    /// Written once by the height-map pass; not part of the dirty protocol.
    pub fn set_column_initial_height(&mut self, x: i32, y: i32, height: i32) {
        self.assert_in_bounds(x, y, 0);
        self.columns.get_mut(x, y).initial_height = height;
    }

    pub fn column_solid_height(&mut self, x: i32, y: i32) -> i32 {
        self.ensure_column_clean(x, y);
        self.columns.get(x, y).solid_height
    }

    pub fn column_render_height(&mut self, x: i32, y: i32) -> i32 {
        self.ensure_column_clean(x, y);
        self.columns.get(x, y).render_height
    }

    pub fn column_outdoor_height(&mut self, x: i32, y: i32) -> i32 {
        self.ensure_column_clean(x, y);
        self.columns.get(x, y).outdoor_height
    }

    fn ensure_column_clean(&mut self, x: i32, y: i32) {
        self.assert_in_bounds(x, y, 0);
        if self.columns.get(x, y).dirty {
            self.recompute_column(x, y);
        }
    }

    /// One top-to-bottom scan finding the topmost solid block, the topmost
    /// visible block, and the topmost fully-enclosed solid block.
    fn recompute_column(&mut self, x: i32, y: i32) {
        let mut solid_height = 0;
        let mut render_height = 0;
        let mut outdoor_height = 0;
        let mut seen_solid = false;
        let mut seen_visible = false;
        let mut seen_enclosed = false;
        for z in (0..self.dims.size_z).rev() {
            if seen_solid && seen_visible && seen_enclosed {
                break;
            }
            let solid = self.is_solid(x, y, z);
            if !seen_solid && solid {
                solid_height = z + 1;
                seen_solid = true;
            }
            if !seen_visible && self.is_visible(x, y, z) {
                render_height = z;
                seen_visible = true;
            }
            if !seen_enclosed && solid && self.hidden_faces(x, y, z, Layer::Solid).is_all() {
                outdoor_height = z + 1;
                seen_enclosed = true;
            }
        }
        let col = self.columns.get_mut(x, y);
        col.solid_height = solid_height;
        col.render_height = render_height;
        col.outdoor_height = outdoor_height;
        col.dirty = false;
    }

    /// Recomputes every column and the stage-wide solid-height bounds.
    /// Face caches are flushed first so the per-column scans can run in
    /// parallel over clean, read-only data.
    pub fn update_all_column_heights(&mut self) {
        self.refresh_hidden_faces();
        let size_z = self.dims.size_z;
        let Stage {
            chunks,
            columns,
            catalog,
            ..
        } = self;
        let chunks: &ChunkGrid = chunks;
        let catalog: &SubstanceCatalog = &**catalog;
        let (sx, _sy) = columns.size();
        if sx == 0 {
            return;
        }
        columns
            .columns_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, col)| {
                let x = (i % sx) as i32;
                let y = (i / sx) as i32;
                let (solid, render, outdoor) = scan_column(chunks, catalog, size_z, x, y);
                col.solid_height = solid;
                col.render_height = render;
                col.outdoor_height = outdoor;
                col.dirty = false;
            });
        let mut min = i32::MAX;
        let mut max = i32::MIN;
        for col in self.columns.columns() {
            min = min.min(col.solid_height);
            max = max.max(col.solid_height);
        }
        self.columns.set_solid_height_bounds(min, max);
    }

    /// Drains the chunk indices dirtied since the last call, in dirtying
    /// order. The consumer decides how many it can afford per frame.
    pub fn take_dirty_chunks(&mut self) -> Vec<usize> {
        let drained = std::mem::take(&mut self.pending_dirty);
        for &i in &drained {
            self.in_pending[i] = false;
        }
        drained
    }

    #[inline]
    pub fn total_blocks(&self) -> u64 {
        self.dims.total_blocks()
    }
}

fn scan_column(
    chunks: &ChunkGrid,
    catalog: &SubstanceCatalog,
    size_z: i32,
    x: i32,
    y: i32,
) -> (i32, i32, i32) {
    let mut solid_height = 0;
    let mut render_height = 0;
    let mut outdoor_height = 0;
    let mut seen_solid = false;
    let mut seen_visible = false;
    let mut seen_enclosed = false;
    for z in (0..size_z).rev() {
        if seen_solid && seen_visible && seen_enclosed {
            break;
        }
        let b = chunks.block(x, y, z);
        let solid = b.is_solid(catalog);
        if !seen_solid && solid {
            solid_height = z + 1;
            seen_solid = true;
        }
        if !seen_visible && b.is_visible(catalog) {
            render_height = z;
            seen_visible = true;
        }
        if !seen_enclosed && solid && b.hidden_cached(Layer::Solid).is_all() {
            outdoor_height = z + 1;
            seen_enclosed = true;
        }
    }
    (solid_height, render_height, outdoor_height)
}
