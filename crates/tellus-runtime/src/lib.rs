//! Worker-thread orchestration for stage generation.
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use tellus_stage::Stage;
use tellus_worldgen::{Phase, Pipeline};

/// Per-phase accounting for one generation run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseStat {
    pub ticks: u64,
    pub duration: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct GenReport {
    phases: HashMap<&'static str, PhaseStat>,
    order: Vec<&'static str>,
    pub total: Duration,
    pub chunks_dirtied: u64,
}

impl GenReport {
    fn record(&mut self, label: &'static str, elapsed: Duration) {
        if !self.phases.contains_key(label) {
            self.order.push(label);
        }
        let stat = self.phases.entry(label).or_default();
        stat.ticks += 1;
        stat.duration += elapsed;
    }

    pub fn phase(&self, label: &str) -> Option<PhaseStat> {
        self.phases.get(label).copied()
    }

    pub fn log_summary(&self) {
        for label in &self.order {
            let stat = self.phases[label];
            log::info!(
                "  {:<22} {:>8} ticks  {:>10.1?}",
                label,
                stat.ticks,
                stat.duration
            );
        }
        log::info!(
            "generation: {:.1?} total, {} chunk mesh invalidations",
            self.total,
            self.chunks_dirtied
        );
    }
}

/// Owns the processing thread. The thread is the stage's only writer; the
/// render side reads through the lock and receives stale chunk indices over
/// the channel. Dropping the runtime without `shutdown` detaches the
/// worker, so call `shutdown` (or `join`) for an orderly exit.
pub struct Runtime {
    stage: Arc<RwLock<Stage>>,
    handle: Option<JoinHandle<GenReport>>,
    stop: Arc<AtomicBool>,
    dirty_rx: Receiver<usize>,
}

impl Runtime {
    /// Spawns the processing thread: one pipeline tick per loop iteration,
    /// yielding between iterations, publishing dirty chunks after each
    /// tick. The thread parks itself when the pipeline reaches `Paused` or
    /// `Halted`.
    pub fn spawn(stage: Arc<RwLock<Stage>>, pipeline: Pipeline) -> Runtime {
        let (tx, rx) = unbounded::<usize>();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stage = Arc::clone(&stage);
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("stage-gen".into())
            .spawn(move || generation_loop(thread_stage, pipeline, tx, thread_stop))
            .expect("failed to spawn the stage generation thread");
        Runtime {
            stage,
            handle: Some(handle),
            stop,
            dirty_rx: rx,
        }
    }

    #[inline]
    pub fn stage(&self) -> &Arc<RwLock<Stage>> {
        &self.stage
    }

    /// Dequeues up to `max` stale chunk indices. Never blocks: a frame takes
    /// what it can afford and leaves the rest queued.
    pub fn drain_dirty(&self, max: usize) -> Vec<usize> {
        self.dirty_rx.try_iter().take(max).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Signals the worker and joins it, returning the generation report.
    pub fn shutdown(mut self) -> GenReport {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => GenReport::default(),
        }
    }

    /// Waits for the pipeline to reach `Paused`/`Halted` and joins.
    pub fn join(mut self) -> GenReport {
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => GenReport::default(),
        }
    }
}

fn generation_loop(
    stage: Arc<RwLock<Stage>>,
    mut pipeline: Pipeline,
    tx: Sender<usize>,
    stop: Arc<AtomicBool>,
) -> GenReport {
    let mut report = GenReport::default();
    let run_start = Instant::now();
    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let tick_start = Instant::now();
        let (phase, dirtied) = {
            let mut st = stage.write().expect("stage lock poisoned");
            let phase = pipeline.process(&mut st);
            let dirty = st.take_dirty_chunks();
            (phase, dirty)
        };
        report.chunks_dirtied += dirtied.len() as u64;
        for idx in dirtied {
            if tx.send(idx).is_err() {
                // Consumer went away; keep generating, stop publishing.
                break;
            }
        }
        report.record(phase.label(), tick_start.elapsed());
        if matches!(phase, Phase::Paused | Phase::Halted) {
            break;
        }
        thread::yield_now();
    }
    report.total = run_start.elapsed();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tellus_stage::StageDims;
    use tellus_substance::{PrototypeCatalog, SubstanceCatalog};
    use tellus_worldgen::params::TerrainParams;

    fn small_runtime() -> Runtime {
        let substances = SubstanceCatalog::builtin();
        let prototypes = PrototypeCatalog::builtin(&substances);
        let resolved = TerrainParams::default()
            .resolve(&substances, &prototypes)
            .unwrap();
        let mut stage = Stage::new(Arc::new(substances));
        stage.build(StageDims::clamped(64, 64, 8), 5);
        let pipeline = Pipeline::new(resolved, 5);
        Runtime::spawn(Arc::new(RwLock::new(stage)), pipeline)
    }

    #[test]
    fn runtime_generates_to_paused_and_reports() {
        let runtime = small_runtime();
        let stage = Arc::clone(runtime.stage());
        // Drain like a renderer would while generation runs.
        let mut seen = 0usize;
        while !runtime.is_finished() {
            seen += runtime.drain_dirty(64).len();
            thread::yield_now();
        }
        seen += runtime.drain_dirty(usize::MAX).len();
        let report = runtime.join();
        assert!(report.chunks_dirtied > 0);
        assert_eq!(seen as u64, report.chunks_dirtied);
        assert!(report.phase("generate_terrain").is_some());
        assert!(report.phase("set_player_knowledge").is_some());
        let st = stage.read().unwrap();
        assert!(st.okay_to_render());
        assert!(!st.columns().any_dirty());
    }

    #[test]
    fn shutdown_interrupts_a_running_worker() {
        let runtime = small_runtime();
        let stage = Arc::clone(runtime.stage());
        let _report = runtime.shutdown();
        // The worker released the stage lock on the way out.
        assert!(stage.read().is_ok());
    }
}
