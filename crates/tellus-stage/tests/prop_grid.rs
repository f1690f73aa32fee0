use proptest::prelude::*;
use tellus_stage::{CHUNK_SIZE, Chunk, ChunkGrid};

fn grid_dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..=2, 1usize..=2, 1usize..=4)
}

// Local block indices hit every arena slot exactly once.
#[test]
fn chunk_idx_is_unique_and_in_range() {
    let mut seen = vec![false; CHUNK_SIZE * CHUNK_SIZE];
    for ly in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            let i = Chunk::idx(lx, ly);
            assert!(i < seen.len());
            assert!(!seen[i]);
            seen[i] = true;
        }
    }
    assert!(seen.into_iter().all(|b| b));
}

proptest! {
    // chunk_index_of maps every in-bounds coordinate to a chunk that
    // contains that coordinate.
    #[test]
    fn chunk_resolution_is_consistent((cx, cy, lv) in grid_dims(), sample in any::<u64>()) {
        let grid = ChunkGrid::new(cx, cy, lv);
        prop_assert_eq!(grid.len(), cx * cy * lv);
        let size_x = (cx * CHUNK_SIZE) as i32;
        let size_y = (cy * CHUNK_SIZE) as i32;
        let x = (sample % size_x as u64) as i32;
        let y = ((sample >> 16) % size_y as u64) as i32;
        let z = ((sample >> 32) % lv as u64) as i32;
        let idx = grid.chunk_index_of(x, y, z);
        prop_assert!(idx < grid.len());
        let chunk = grid.chunk(idx);
        prop_assert!(chunk.contains_world(x, y, z));
        prop_assert_eq!(chunk.index(), idx);
    }

    // The grid accessor and the owning chunk resolve to the same block.
    #[test]
    fn block_identity_through_chunk((cx, cy, lv) in grid_dims(), sample in any::<u64>()) {
        let grid = ChunkGrid::new(cx, cy, lv);
        let size_x = (cx * CHUNK_SIZE) as i32;
        let size_y = (cy * CHUNK_SIZE) as i32;
        let x = (sample % size_x as u64) as i32;
        let y = ((sample >> 16) % size_y as u64) as i32;
        let z = ((sample >> 32) % lv as u64) as i32;
        let via_grid = grid.block(x, y, z);
        let chunk = grid.chunk_containing(x, y, z);
        let via_chunk = chunk.block_local(
            x as usize % CHUNK_SIZE,
            y as usize % CHUNK_SIZE,
        );
        prop_assert!(std::ptr::eq(via_grid, via_chunk));
    }
}
