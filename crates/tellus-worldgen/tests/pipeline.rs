use std::sync::Arc;

use tellus_stage::{Layer, Stage, StageDims};
use tellus_substance::{PrototypeCatalog, SubstanceCatalog, SubstanceId};
use tellus_worldgen::builder::{BuildStep, GenContext, TerrainBuilder};
use tellus_worldgen::generation::{DepositsBuilder, RiversBuilder, TerrainShapeBuilder};
use tellus_worldgen::params::{ResolvedParams, TerrainParams};
use tellus_worldgen::pipeline::{Phase, Pipeline};

const MAX_TICKS: usize = 200_000;

fn resolved_params(tweak: impl FnOnce(&mut TerrainParams)) -> ResolvedParams {
    let substances = SubstanceCatalog::builtin();
    let prototypes = PrototypeCatalog::builtin(&substances);
    let mut params = TerrainParams::default();
    tweak(&mut params);
    params.resolve(&substances, &prototypes).unwrap()
}

fn built_stage(seed: i32) -> Stage {
    let catalog = Arc::new(SubstanceCatalog::builtin());
    let mut stage = Stage::new(catalog);
    stage.build(StageDims::clamped(64, 64, 16), seed);
    stage
}

fn run_to_paused(stage: &mut Stage, pipeline: &mut Pipeline) {
    for _ in 0..MAX_TICKS {
        if pipeline.process(stage) == Phase::Paused {
            return;
        }
    }
    panic!("pipeline did not reach Paused within {} ticks", MAX_TICKS);
}

fn snapshot_solids(stage: &Stage) -> Vec<SubstanceId> {
    let dims = stage.dims();
    let mut out = Vec::with_capacity(dims.total_blocks() as usize);
    for z in 0..dims.size_z {
        for y in 0..dims.size_y {
            for x in 0..dims.size_x {
                out.push(stage.substance(x, y, z, Layer::Solid));
            }
        }
    }
    out
}

/// Runs the bulk terrain shaping directly and flushes the caches, leaving a
/// stage in the state the later passes expect.
fn shape_terrain(stage: &mut Stage, ctx: &mut GenContext) {
    let mut shape = TerrainShapeBuilder::new();
    for _ in 0..MAX_TICKS {
        if shape.step(stage, ctx) == BuildStep::Done {
            stage.mark_all_faces_dirty();
            stage.update_all_column_heights();
            stage.mark_renderable();
            return;
        }
    }
    panic!("terrain shaping did not finish");
}

#[test]
fn full_pipeline_reaches_paused_with_consistent_caches() {
    let mut stage = built_stage(1234);
    let mut pipeline = Pipeline::new(resolved_params(|_| {}), 1234);
    assert_eq!(pipeline.phase(), Phase::Idle);
    run_to_paused(&mut stage, &mut pipeline);

    assert!(stage.okay_to_render());
    assert!(!stage.columns().any_dirty());
    let dims = stage.dims();
    for y in 0..dims.size_y {
        for x in 0..dims.size_x {
            let h = stage.columns().get(x, y).solid_height;
            assert!((0..=16).contains(&h), "column ({x},{y}) height {h}");
        }
    }
    let (min, max) = stage.columns().solid_height_bounds();
    assert!(min >= 1, "the world floor never erodes away");
    assert!(max <= 16);
}

#[test]
fn pipeline_is_deterministic_for_a_seed() {
    let mut a = built_stage(77);
    let mut b = built_stage(77);
    let mut pa = Pipeline::new(resolved_params(|_| {}), 77);
    let mut pb = Pipeline::new(resolved_params(|_| {}), 77);
    run_to_paused(&mut a, &mut pa);
    run_to_paused(&mut b, &mut pb);
    assert_eq!(snapshot_solids(&a), snapshot_solids(&b));

    let mut c = built_stage(78);
    let mut pc = Pipeline::new(resolved_params(|_| {}), 78);
    run_to_paused(&mut c, &mut pc);
    assert_ne!(snapshot_solids(&a), snapshot_solids(&c));
}

#[test]
fn knowledge_floods_down_until_opacity() {
    let mut stage = built_stage(42);
    let mut pipeline = Pipeline::new(resolved_params(|_| {}), 42);
    run_to_paused(&mut stage, &mut pipeline);

    let dims = stage.dims();
    let top = dims.size_z - 1;
    for y in 0..dims.size_y {
        for x in 0..dims.size_x {
            assert!(stage.is_known(x, y, top), "top level is always known");
            for z in (0..top).rev() {
                if stage.is_known(x, y, z + 1) && !stage.is_opaque(x, y, z + 1) {
                    assert!(
                        stage.is_known(x, y, z),
                        "knowledge must flood down at ({x},{y},{z})"
                    );
                }
            }
        }
    }
}

#[test]
fn zero_density_deposits_leave_terrain_untouched() {
    let params = resolved_params(|p| {
        p.deposit_densities = [0; 5];
    });
    let mut ctx = GenContext::new(Arc::new(params), 99);
    let mut stage = built_stage(99);
    shape_terrain(&mut stage, &mut ctx);

    let before = snapshot_solids(&stage);
    let mut deposits = DepositsBuilder::new();
    for _ in 0..MAX_TICKS {
        if deposits.step(&mut stage, &mut ctx) == BuildStep::Done {
            break;
        }
    }
    assert_eq!(before, snapshot_solids(&stage));
    assert_eq!(deposits.give_ups().iter().sum::<u64>(), 0);
}

#[test]
fn deposits_only_replace_solid_blocks_with_pool_substances() {
    let params = resolved_params(|_| {});
    let mut ctx = GenContext::new(Arc::new(params), 7);
    let mut stage = built_stage(7);
    shape_terrain(&mut stage, &mut ctx);

    let before = snapshot_solids(&stage);
    let mut deposits = DepositsBuilder::new();
    for _ in 0..MAX_TICKS {
        if deposits.step(&mut stage, &mut ctx) == BuildStep::Done {
            break;
        }
    }
    let after = snapshot_solids(&stage);
    assert_ne!(before, after, "default densities must place something");
    let air = stage.catalog().air();
    for (b, a) in before.iter().zip(after.iter()) {
        if b != a {
            // Deposits replace rock with rock; air and water stay put.
            assert_ne!(*b, air);
            assert_ne!(*b, SubstanceCatalog::NOTHING);
        }
    }
}

#[test]
fn river_profile_never_flows_uphill() {
    let params = resolved_params(|_| {});
    let mut ctx = GenContext::new(Arc::new(params), 31);
    let mut stage = built_stage(31);
    shape_terrain(&mut stage, &mut ctx);

    let mut rivers = RiversBuilder::new();
    for _ in 0..MAX_TICKS {
        if rivers.step(&mut stage, &mut ctx) == BuildStep::Done {
            break;
        }
    }
    let profile = rivers.profile();
    assert!(!profile.is_empty());
    for w in profile.windows(2) {
        assert!(w[0] >= w[1], "water surface rose downstream: {:?}", w);
    }
    // The carved surface holds water.
    let path = rivers.path();
    let mid = path[path.len() / 2];
    let water = stage.catalog().try_id("water").unwrap();
    assert_eq!(
        stage.substance(mid.0, mid.1, profile[path.len() / 2], Layer::Fluid),
        water
    );
}

#[test]
fn disabled_rivers_finish_without_touching_the_stage() {
    let params = resolved_params(|p| p.rivers_enable = false);
    let mut ctx = GenContext::new(Arc::new(params), 5);
    let mut stage = built_stage(5);
    shape_terrain(&mut stage, &mut ctx);
    let before = snapshot_solids(&stage);
    let mut rivers = RiversBuilder::new();
    assert_eq!(rivers.step(&mut stage, &mut ctx), BuildStep::Done);
    assert_eq!(before, snapshot_solids(&stage));
}

#[test]
fn flora_places_props_on_dry_soil() {
    let mut stage = built_stage(2024);
    let mut pipeline = Pipeline::new(resolved_params(|_| {}), 2024);
    run_to_paused(&mut stage, &mut pipeline);

    let dims = stage.dims();
    let mut props = 0usize;
    for y in 0..dims.size_y {
        for x in 0..dims.size_x {
            let top = stage.columns().get(x, y).solid_height - 1;
            if top >= 0 {
                props += stage.block(x, y, top).inventory().len();
            }
        }
    }
    assert!(props > 0, "a 64x64 stage should grow something");
}

#[test]
fn pause_resume_and_halt_transitions() {
    let mut stage = built_stage(3);
    let mut pipeline = Pipeline::new(resolved_params(|_| {}), 3);
    run_to_paused(&mut stage, &mut pipeline);

    pipeline.resume();
    assert_eq!(pipeline.phase(), Phase::Running);
    // Running ticks flush dirty columns from interactive mutations.
    let granite = stage.catalog().try_id("granite").unwrap();
    stage.set_substance(10, 10, 8, Layer::Solid, granite);
    assert!(stage.columns().any_dirty());
    pipeline.process(&mut stage);
    assert!(!stage.columns().any_dirty());

    pipeline.pause();
    assert_eq!(pipeline.phase(), Phase::Paused);
    pipeline.halt();
    assert!(pipeline.is_halted());
    assert_eq!(pipeline.process(&mut stage), Phase::Halted);
}

#[test]
fn builder_reset_restarts_the_cursor() {
    let params = resolved_params(|_| {});
    let mut ctx = GenContext::new(Arc::new(params), 11);
    let mut stage = built_stage(11);
    let mut shape = TerrainShapeBuilder::new();
    // Step partway, reset, then run to completion; the builder must finish
    // normally from a restarted cursor.
    for _ in 0..5 {
        shape.step(&mut stage, &mut ctx);
    }
    shape.reset();
    let mut finished = false;
    for _ in 0..MAX_TICKS {
        if shape.step(&mut stage, &mut ctx) == BuildStep::Done {
            finished = true;
            break;
        }
    }
    assert!(finished);
}
