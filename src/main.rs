use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use clap::Parser;
use notify::{RecursiveMode, Watcher};

use tellus_runtime::Runtime;
use tellus_stage::{Stage, StageDims};
use tellus_substance::{PrototypeCatalog, SubstanceCatalog};
use tellus_worldgen::{Pipeline, ResolvedParams, TerrainParams, load_params_from_path};

#[derive(Parser, Debug)]
#[command(name = "tellus", about = "Headless voxel stage generator")]
struct Args {
    /// Stage width in blocks (rounded up to whole chunks)
    #[arg(long, default_value_t = 256)]
    size_x: i32,
    /// Stage depth in blocks (rounded up to whole chunks)
    #[arg(long, default_value_t = 256)]
    size_y: i32,
    /// Stage height in levels
    #[arg(long, default_value_t = 48)]
    size_z: i32,
    /// World seed
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    /// Substance catalog TOML; the built-in catalog when omitted
    #[arg(long)]
    substances: Option<PathBuf>,
    /// Prototype catalog TOML; the built-in catalog when omitted
    #[arg(long)]
    prototypes: Option<PathBuf>,
    /// Terrain parameter TOML; defaults when omitted
    #[arg(long)]
    terrain: Option<PathBuf>,
    /// Stale chunks consumed per simulated frame
    #[arg(long, default_value_t = 64)]
    chunks_per_frame: usize,
    /// Watch the terrain file and regenerate on change
    #[arg(long)]
    watch: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let substances = Arc::new(match &args.substances {
        Some(path) => SubstanceCatalog::from_path(path)?,
        None => SubstanceCatalog::builtin(),
    });
    let prototypes = match &args.prototypes {
        Some(path) => PrototypeCatalog::from_path(path, &substances)?,
        None => PrototypeCatalog::builtin(&substances),
    };
    log::info!(
        "catalogs loaded: {} substances, {} prototypes",
        substances.len(),
        prototypes.prototypes.len()
    );

    let resolved = load_resolved(args.terrain.as_deref(), &substances, &prototypes)?;
    generate(args, Arc::clone(&substances), resolved)?;

    if args.watch {
        let terrain_path = args
            .terrain
            .as_deref()
            .ok_or("--watch needs --terrain pointing at a file to watch")?;
        watch_and_regenerate(args, substances, prototypes, terrain_path)?;
    }
    Ok(())
}

fn load_resolved(
    terrain: Option<&Path>,
    substances: &SubstanceCatalog,
    prototypes: &PrototypeCatalog,
) -> Result<ResolvedParams, Box<dyn Error>> {
    let params = match terrain {
        Some(path) => load_params_from_path(path)?,
        None => TerrainParams::default(),
    };
    params.resolve(substances, prototypes)
}

/// Builds a fresh stage and runs the pipeline to `Paused`, draining stale
/// chunks the way a renderer's frame loop would.
fn generate(
    args: &Args,
    substances: Arc<SubstanceCatalog>,
    resolved: ResolvedParams,
) -> Result<(), Box<dyn Error>> {
    let mut stage = Stage::new(substances);
    stage.build(
        StageDims::clamped(args.size_x, args.size_y, args.size_z),
        args.seed,
    );
    let stage = Arc::new(RwLock::new(stage));
    let pipeline = Pipeline::new(resolved, args.seed);
    let runtime = Runtime::spawn(Arc::clone(&stage), pipeline);

    let mut meshed = 0u64;
    while !runtime.is_finished() {
        meshed += consume_stale_chunks(&runtime, &stage, args.chunks_per_frame);
        std::thread::sleep(Duration::from_millis(16));
    }
    meshed += consume_stale_chunks(&runtime, &stage, usize::MAX);
    let report = runtime.join();
    report.log_summary();
    log::info!("{} chunk meshes rebuilt during generation", meshed);

    summarize(&stage);
    Ok(())
}

/// Stand-in for the render thread's per-frame rebuild: dequeue a bounded
/// batch and clear each chunk's stale flag, as only the renderer may.
fn consume_stale_chunks(
    runtime: &Runtime,
    stage: &Arc<RwLock<Stage>>,
    max: usize,
) -> u64 {
    let drained = runtime.drain_dirty(max);
    if drained.is_empty() {
        return 0;
    }
    let mut st = stage.write().expect("stage lock poisoned");
    let n = drained.len() as u64;
    for idx in drained {
        st.chunks_mut().chunk_mut(idx).clear_mesh_dirty();
    }
    n
}

fn summarize(stage: &Arc<RwLock<Stage>>) {
    let mut st = stage.write().expect("stage lock poisoned");
    let dims = st.dims();
    let (min_h, max_h) = st.columns().solid_height_bounds();
    let catalog = st.catalog_arc();
    let mut known = 0u64;
    let mut visible_chunks = 0usize;
    for chunk in st.chunks().iter() {
        if chunk.any_visible(&catalog) {
            visible_chunks += 1;
        }
        known += chunk.blocks().iter().filter(|b| b.is_known()).count() as u64;
    }
    let total = st.total_blocks();
    log::info!(
        "stage {}x{}x{}: solid heights {}..{}, {}/{} chunks visible, {:.1}% of blocks known",
        dims.size_x,
        dims.size_y,
        dims.size_z,
        min_h,
        max_h,
        visible_chunks,
        st.chunks().len(),
        known as f64 * 100.0 / total as f64
    );
    st.set_cursor(dims.size_x / 2, dims.size_y / 2, max_h);
    let (cx, cy, cz) = st.cursor();
    log::info!("cursor parked at ({}, {}, {})", cx, cy, cz);
}

/// Blocks on the terrain file and rebuilds the whole stage on every
/// change; a stage is never reshaped in place.
fn watch_and_regenerate(
    args: &Args,
    substances: Arc<SubstanceCatalog>,
    prototypes: PrototypeCatalog,
    terrain_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(terrain_path, RecursiveMode::NonRecursive)?;
    log::info!("watching {:?} for terrain changes", terrain_path);
    for event in rx {
        let event = event?;
        if !event.kind.is_modify() && !event.kind.is_create() {
            continue;
        }
        match load_resolved(Some(terrain_path), &substances, &prototypes) {
            Ok(resolved) => {
                log::info!("terrain parameters changed, regenerating");
                generate(args, Arc::clone(&substances), resolved)?;
            }
            Err(e) => log::warn!("terrain reload failed, keeping last stage: {}", e),
        }
    }
    Ok(())
}
