use std::sync::Arc;

use tellus_stage::{Face, Layer, Stage, StageDims};
use tellus_substance::{SubstanceCatalog, SubstanceId};

fn built_stage(size_z: i32) -> Stage {
    let catalog = Arc::new(SubstanceCatalog::builtin());
    let mut stage = Stage::new(catalog);
    stage.build(StageDims::clamped(64, 64, size_z), 7);
    stage
}

fn id(stage: &Stage, name: &str) -> SubstanceId {
    stage.catalog().try_id(name).unwrap()
}

#[test]
fn dims_clamp_to_whole_chunks() {
    let d = StageDims::clamped(100, 64, 0);
    assert_eq!((d.size_x, d.size_y, d.size_z), (128, 64, 1));
    let d = StageDims::clamped(1, 1, 5);
    assert_eq!((d.size_x, d.size_y, d.size_z), (64, 64, 5));
}

#[test]
fn cursor_clamps_into_volume() {
    let mut stage = built_stage(8);
    stage.set_cursor(-5, 1000, 3);
    assert_eq!(stage.cursor(), (0, 63, 3));
}

#[test]
#[should_panic(expected = "outside stage volume")]
fn out_of_bounds_access_panics() {
    let stage = built_stage(8);
    stage.block(64, 0, 0);
}

#[test]
fn normal_mutation_invalidates_neighbors() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    let air = id(&stage, "air");

    // Freshly built blocks all share `nothing`, and identical substances
    // hide each other's faces; give the center a distinct substance first.
    stage.set_substance(10, 10, 3, Layer::Solid, air);
    stage.refresh_hidden_faces();
    let before = stage.hidden_faces(11, 10, 3, Layer::Solid);
    assert!(!before.contains(Face::West));

    stage.set_substance(10, 10, 3, Layer::Solid, granite);
    // The neighbor's west face now borders an opaque block.
    let after = stage.hidden_faces(11, 10, 3, Layer::Solid);
    assert!(after.contains(Face::West));

    // And back: no stale hidden bit survives the second mutation.
    stage.set_substance(10, 10, 3, Layer::Solid, air);
    let reverted = stage.hidden_faces(11, 10, 3, Layer::Solid);
    assert!(!reverted.contains(Face::West));
}

#[test]
fn edge_faces_are_never_hidden() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    // Wall the edge block in with opaque neighbors on every in-bounds side.
    stage.set_substance(0, 5, 3, Layer::Solid, granite);
    for (x, y, z) in [(1, 5, 3), (0, 4, 3), (0, 6, 3), (0, 5, 2), (0, 5, 4)] {
        stage.set_substance(x, y, z, Layer::Solid, granite);
    }
    let hidden = stage.hidden_faces(0, 5, 3, Layer::Solid);
    assert!(!hidden.contains(Face::West), "no neighbor, no occlusion");
    assert!(hidden.contains(Face::East));
}

#[test]
fn hidden_face_reads_are_idempotent() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    stage.set_substance(10, 10, 3, Layer::Solid, granite);
    assert!(stage.block(10, 10, 3).faces_dirty());
    let first = stage.hidden_faces(10, 10, 3, Layer::Solid);
    assert!(!stage.block(10, 10, 3).faces_dirty());
    let second = stage.hidden_faces(10, 10, 3, Layer::Solid);
    assert_eq!(first, second);
}

#[test]
fn isolated_block_shows_all_faces() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    let air = id(&stage, "air");
    // Away from any stage edge, surrounded by air on all six sides.
    for face in Face::ALL {
        let (dx, dy, dz) = face.delta();
        stage.set_substance(20 + dx, 20 + dy, 4 + dz, Layer::Solid, air);
    }
    stage.set_substance(20, 20, 4, Layer::Solid, granite);
    assert!(stage.has_any_visible_faces(20, 20, 4));
    assert_eq!(
        stage.hidden_faces(20, 20, 4, Layer::Solid),
        tellus_stage::FaceSet::NONE
    );
}

#[test]
fn adjacent_same_substance_hides_the_shared_face() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    stage.set_substance(20, 20, 4, Layer::Solid, granite);
    stage.set_substance(21, 20, 4, Layer::Solid, granite);
    assert!(stage.hidden_faces(20, 20, 4, Layer::Solid).contains(Face::East));
    assert!(stage.hidden_faces(21, 20, 4, Layer::Solid).contains(Face::West));
}

#[test]
fn fluid_faces_hide_behind_opaque_neighbors() {
    let mut stage = built_stage(8);
    let water = id(&stage, "water");
    let granite = id(&stage, "granite");
    stage.set_substance(30, 30, 4, Layer::Fluid, water);
    stage.set_substance(31, 30, 4, Layer::Solid, granite);
    // Combined neighbor opacity applies to the fluid layer too.
    assert!(stage.hidden_faces(30, 30, 4, Layer::Fluid).contains(Face::East));
    // Same fluid on both sides hides the shared face as well.
    stage.set_substance(29, 30, 4, Layer::Fluid, water);
    assert!(stage.hidden_faces(30, 30, 4, Layer::Fluid).contains(Face::West));
}

#[test]
fn column_heights_follow_the_topmost_solid_block() {
    let mut stage = built_stage(16);
    let granite = id(&stage, "granite");
    for z in 0..6 {
        stage.set_substance(3, 4, z, Layer::Solid, granite);
    }
    stage.update_all_column_heights();
    assert_eq!(stage.column_solid_height(3, 4), 6);
    assert_eq!(stage.column_render_height(3, 4), 5);
    // Untouched columns hold no solid block at all.
    assert_eq!(stage.column_solid_height(10, 10), 0);
    assert!(!stage.columns().any_dirty());
    let (min, max) = stage.columns().solid_height_bounds();
    assert_eq!(min, 0);
    assert_eq!(max, 6);
}

#[test]
fn buried_column_reports_outdoor_height() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    // Solid 5x5x4 box: its inner column is fully enclosed at z=0..2.
    for x in 10..15 {
        for y in 10..15 {
            for z in 0..4 {
                stage.set_substance(x, y, z, Layer::Solid, granite);
            }
        }
    }
    stage.update_all_column_heights();
    // Center column: z=2 block is surrounded by granite on all sides
    // (z=3 above it is exposed to air on top).
    assert_eq!(stage.column_outdoor_height(12, 12), 3);
    assert_eq!(stage.column_solid_height(12, 12), 4);
}

#[test]
fn quick_path_skips_chunk_and_column_dirtying() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    stage.update_all_column_heights();
    stage.take_dirty_chunks();

    stage.set_substance_quick(10, 10, 3, Layer::Solid, granite);
    assert!(stage.block(10, 10, 3).faces_dirty());
    assert!(stage.take_dirty_chunks().is_empty());
    assert!(!stage.columns().get(10, 10).dirty);

    stage.set_substance(10, 10, 4, Layer::Solid, granite);
    assert!(!stage.take_dirty_chunks().is_empty());
    assert!(stage.columns().get(10, 10).dirty);
}

#[test]
fn dirty_chunk_queue_deduplicates() {
    let mut stage = built_stage(8);
    let granite = id(&stage, "granite");
    // Chunks are one level tall, so an interior mutation always staletens
    // the owning slab plus the slabs above and below. Two mutations in the
    // same slab produce six dirty events but only three distinct chunks.
    stage.set_substance(1, 1, 3, Layer::Solid, granite);
    stage.set_substance(2, 2, 3, Layer::Solid, granite);
    let drained = stage.take_dirty_chunks();
    assert_eq!(drained.len(), 3);
    for &i in &drained {
        assert!(stage.chunks().chunk(i).mesh_dirty());
    }
    // A fresh mutation re-queues after a drain.
    stage.set_substance(3, 3, 3, Layer::Solid, granite);
    assert_eq!(stage.take_dirty_chunks().len(), 3);
}

#[test]
fn mutation_on_a_chunk_border_queues_the_lateral_neighbor_too() {
    let catalog = Arc::new(SubstanceCatalog::builtin());
    let mut stage = Stage::new(catalog);
    stage.build(StageDims::clamped(128, 64, 4), 7);
    let granite = stage.catalog().try_id("granite").unwrap();
    // x=63 touches the seam with the chunk starting at x=64: own slab,
    // the east neighbor, and the slabs above and below go stale.
    stage.set_substance(63, 10, 2, Layer::Solid, granite);
    let drained = stage.take_dirty_chunks();
    assert_eq!(drained.len(), 4);
}

#[test]
fn known_flag_marks_the_chunk_stale() {
    let mut stage = built_stage(8);
    stage.take_dirty_chunks();
    stage.set_known(5, 5, 7, true);
    assert!(stage.is_known(5, 5, 7));
    assert_eq!(stage.take_dirty_chunks().len(), 1);
    // No-op writes do not re-queue.
    stage.set_known(5, 5, 7, true);
    assert!(stage.take_dirty_chunks().is_empty());
}
