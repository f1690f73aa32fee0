use std::sync::Arc;
use std::time::Instant;

use tellus_stage::Stage;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};
use crate::generation::{
    BeachesBuilder, DepositsBuilder, FaunaBuilder, FloraBuilder, KnowledgeBuilder, LakesBuilder,
    RiversBuilder, SmootherBuilder, TerrainShapeBuilder,
};
use crate::params::ResolvedParams;

/// Stage processing states, advanced linearly by `Pipeline::process`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Phase {
    Idle,
    GenerateTerrain,
    AddDeposits,
    AddLakes,
    AddBeaches,
    AddRivers,
    SmoothTerrain,
    AddFlora,
    AddFauna,
    SetPlayerKnowledge,
    Paused,
    Running,
    Halted,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::GenerateTerrain => "generate_terrain",
            Phase::AddDeposits => "add_deposits",
            Phase::AddLakes => "add_lakes",
            Phase::AddBeaches => "add_beaches",
            Phase::AddRivers => "add_rivers",
            Phase::SmoothTerrain => "smooth_terrain",
            Phase::AddFlora => "add_flora",
            Phase::AddFauna => "add_fauna",
            Phase::SetPlayerKnowledge => "set_player_knowledge",
            Phase::Paused => "paused",
            Phase::Running => "running",
            Phase::Halted => "halted",
        }
    }

    fn next(self) -> Phase {
        match self {
            Phase::Idle => Phase::GenerateTerrain,
            Phase::GenerateTerrain => Phase::AddDeposits,
            Phase::AddDeposits => Phase::AddLakes,
            Phase::AddLakes => Phase::AddBeaches,
            Phase::AddBeaches => Phase::AddRivers,
            Phase::AddRivers => Phase::SmoothTerrain,
            Phase::SmoothTerrain => Phase::AddFlora,
            Phase::AddFlora => Phase::AddFauna,
            Phase::AddFauna => Phase::SetPlayerKnowledge,
            Phase::SetPlayerKnowledge => Phase::Paused,
            other => other,
        }
    }

    /// True for the phases that drive a terrain builder.
    pub fn is_generating(self) -> bool {
        matches!(
            self,
            Phase::GenerateTerrain
                | Phase::AddDeposits
                | Phase::AddLakes
                | Phase::AddBeaches
                | Phase::AddRivers
                | Phase::SmoothTerrain
                | Phase::AddFlora
                | Phase::AddFauna
                | Phase::SetPlayerKnowledge
        )
    }
}

/// Drives the generation state machine: one bounded builder step per
/// `process` call, with column-recompute checkpoints on the transitions
/// that need a consistent world.
pub struct Pipeline {
    phase: Phase,
    builder: Option<Box<dyn TerrainBuilder + Send>>,
    ctx: GenContext,
    phase_started: Option<Instant>,
    phase_steps: u64,
}

impl Pipeline {
    pub fn new(params: ResolvedParams, seed: i32) -> Pipeline {
        Pipeline {
            phase: Phase::Idle,
            builder: None,
            ctx: GenContext::new(Arc::new(params), seed),
            phase_started: None,
            phase_steps: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    pub fn halt(&mut self) {
        self.phase = Phase::Halted;
        self.builder = None;
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    /// Advances the state machine by one tick. Never blocks: generation
    /// phases perform one bounded builder step.
    pub fn process(&mut self, stage: &mut Stage) -> Phase {
        match self.phase {
            Phase::Idle => {
                if stage.ready() {
                    self.enter(Phase::GenerateTerrain);
                }
            }
            Phase::Paused | Phase::Halted => {}
            Phase::Running => {
                // Steady-state consistency checkpoint: gameplay mutations
                // since the last tick re-dirty columns lazily.
                if stage.columns().any_dirty() {
                    stage.update_all_column_heights();
                }
            }
            _ => {
                self.phase_steps += 1;
                let done = match self.builder.as_mut() {
                    Some(builder) => builder.step(stage, &mut self.ctx) == BuildStep::Done,
                    None => true,
                };
                if done {
                    self.complete_phase(stage);
                }
            }
        }
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.builder = Self::make_builder(phase);
        self.phase_started = Some(Instant::now());
        self.phase_steps = 0;
        if phase.is_generating() {
            log::info!("pipeline phase: {}", phase.label());
        }
    }

    fn complete_phase(&mut self, stage: &mut Stage) {
        let elapsed = self
            .phase_started
            .map(|t| t.elapsed())
            .unwrap_or_default();
        log::info!(
            "phase {} complete after {} steps in {:.1?}",
            self.phase.label(),
            self.phase_steps,
            elapsed
        );
        match self.phase {
            Phase::GenerateTerrain => {
                // The quick path skipped all propagation; rebuild every
                // cache before anyone is allowed to look at the stage.
                stage.mark_all_faces_dirty();
                stage.update_all_column_heights();
                stage.mark_renderable();
            }
            Phase::AddDeposits | Phase::AddRivers | Phase::SmoothTerrain => {
                stage.update_all_column_heights();
            }
            _ => {}
        }
        let next = self.phase.next();
        if next == Phase::Paused {
            self.phase = Phase::Paused;
            self.builder = None;
            log::info!("terrain generation finished");
        } else {
            self.enter(next);
        }
    }

    fn make_builder(phase: Phase) -> Option<Box<dyn TerrainBuilder + Send>> {
        match phase {
            Phase::GenerateTerrain => Some(Box::new(TerrainShapeBuilder::new())),
            Phase::AddDeposits => Some(Box::new(DepositsBuilder::new())),
            Phase::AddLakes => Some(Box::new(LakesBuilder::new())),
            Phase::AddBeaches => Some(Box::new(BeachesBuilder::new())),
            Phase::AddRivers => Some(Box::new(RiversBuilder::new())),
            Phase::SmoothTerrain => Some(Box::new(SmootherBuilder::new())),
            Phase::AddFlora => Some(Box::new(FloraBuilder::new())),
            Phase::AddFauna => Some(Box::new(FaunaBuilder::new())),
            Phase::SetPlayerKnowledge => Some(Box::new(KnowledgeBuilder::new())),
            _ => None,
        }
    }
}
