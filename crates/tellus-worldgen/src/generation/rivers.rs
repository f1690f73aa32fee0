use tellus_stage::{Face, FluidFlow, Layer, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

// One walk segment is short; a step advances a bounded batch of them.
const WALK_BATCH: usize = 64;
const CARVE_BATCH: usize = 8;
// The walk must clear its starting edge before edge contact can end it.
const MIN_PATH_LEN: usize = 16;

#[derive(Copy, Clone)]
enum RiverState {
    Walk,
    Profile,
    Carve(usize),
    Finished,
}

/// Carves one river per stage: a noise-perturbed walk from a random edge
/// point toward the stage center until it runs off any edge, a backward
/// pass that forbids the water surface from rising downstream, then a
/// cylindrical channel carved and filled around every path point.
pub struct RiversBuilder {
    state: RiverState,
    path: Vec<(i32, i32)>,
    profile: Vec<i32>,
    pos: (f32, f32),
    heading: f32,
    walked: f32,
    started: bool,
}

impl RiversBuilder {
    pub fn new() -> Self {
        RiversBuilder {
            state: RiverState::Walk,
            path: Vec::new(),
            profile: Vec::new(),
            pos: (0.0, 0.0),
            heading: 0.0,
            walked: 0.0,
            started: false,
        }
    }

    /// The walked path, available once the builder finishes.
    pub fn path(&self) -> &[(i32, i32)] {
        &self.path
    }

    /// Water-surface height per path point; monotonically non-increasing.
    pub fn profile(&self) -> &[i32] {
        &self.profile
    }

    fn start_walk(&mut self, stage: &Stage, ctx: &mut GenContext) {
        let dims = stage.dims();
        let (max_x, max_y) = (dims.size_x - 1, dims.size_y - 1);
        let (x, y) = match ctx.rng.next_usize(4) {
            0 => (ctx.rng.next_i32(0, dims.size_x), 0),
            1 => (ctx.rng.next_i32(0, dims.size_x), max_y),
            2 => (0, ctx.rng.next_i32(0, dims.size_y)),
            _ => (max_x, ctx.rng.next_i32(0, dims.size_y)),
        };
        self.pos = (x as f32, y as f32);
        let center = (dims.size_x as f32 * 0.5, dims.size_y as f32 * 0.5);
        self.heading = (center.1 - self.pos.1).atan2(center.0 - self.pos.0);
        self.path.push((x, y));
        self.started = true;
    }

    fn on_edge(stage: &Stage, x: i32, y: i32) -> bool {
        let dims = stage.dims();
        x == 0 || y == 0 || x == dims.size_x - 1 || y == dims.size_y - 1
    }

    fn walk_some(&mut self, stage: &Stage, ctx: &mut GenContext) -> bool {
        let dims = stage.dims();
        let max_len = ((dims.size_x + dims.size_y) * 2) as usize;
        for _ in 0..WALK_BATCH {
            let wiggle = ctx.wiggle.sample2(self.walked, 0.0);
            self.heading += wiggle * ctx.params.params.wiggle_strength;
            self.pos.0 += self.heading.cos();
            self.pos.1 += self.heading.sin();
            self.walked += 1.0;
            let cell = (
                (self.pos.0.round() as i32).clamp(0, dims.size_x - 1),
                (self.pos.1.round() as i32).clamp(0, dims.size_y - 1),
            );
            if Some(&cell) != self.path.last() {
                self.path.push(cell);
            }
            let done = (self.path.len() >= MIN_PATH_LEN && Self::on_edge(stage, cell.0, cell.1))
                || self.path.len() >= max_len;
            if done {
                return true;
            }
        }
        false
    }

    /// The water surface may never rise in the flow direction: each point is
    /// pulled down to its upstream predecessor.
    fn build_profile(&mut self, stage: &mut Stage) {
        self.profile = self
            .path
            .iter()
            .map(|&(x, y)| (stage.column_solid_height(x, y) - 1).max(1))
            .collect();
        for i in 1..self.profile.len() {
            self.profile[i] = self.profile[i].min(self.profile[i - 1]);
        }
    }

    fn flow_face(from: (i32, i32), to: (i32, i32)) -> Option<Face> {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        if dx.abs() >= dy.abs() {
            match dx.signum() {
                1 => Some(Face::East),
                -1 => Some(Face::West),
                _ => None,
            }
        } else if dy > 0 {
            Some(Face::North)
        } else {
            Some(Face::South)
        }
    }

    fn carve_point(&self, stage: &mut Stage, ctx: &GenContext, i: usize) {
        let dims = stage.dims();
        let (px, py) = self.path[i];
        let surface = self.profile[i];
        let radius = ctx.params.params.river_radius.max(1);
        let flow = self
            .path
            .get(i + 1)
            .and_then(|&next| Self::flow_face((px, py), next));
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let (x, y) = (px + dx, py + dy);
                if x < 0 || x >= dims.size_x || y < 0 || y >= dims.size_y {
                    continue;
                }
                let top = stage.column_solid_height(x, y);
                // Terrain above the water surface is carved away; terrain
                // below it leaves a dip that fills to the same surface.
                for z in surface..top {
                    stage.set_substance(x, y, z, Layer::Solid, ctx.params.air);
                }
                for z in top.min(surface)..=surface {
                    stage.set_substance(x, y, z, Layer::Fluid, ctx.params.water);
                }
                stage.set_flow(
                    x,
                    y,
                    surface,
                    FluidFlow {
                        dir: flow,
                        speed: 1,
                    },
                );
            }
        }
    }
}

impl Default for RiversBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for RiversBuilder {
    fn name(&self) -> &'static str {
        "rivers"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        if !ctx.params.params.rivers_enable {
            return BuildStep::Done;
        }
        match self.state {
            RiverState::Walk => {
                if !self.started {
                    self.start_walk(stage, ctx);
                }
                if self.walk_some(stage, ctx) {
                    self.state = RiverState::Profile;
                }
                BuildStep::InProgress
            }
            RiverState::Profile => {
                self.build_profile(stage);
                self.state = RiverState::Carve(0);
                BuildStep::InProgress
            }
            RiverState::Carve(mut i) => {
                for _ in 0..CARVE_BATCH {
                    if i >= self.path.len() {
                        break;
                    }
                    self.carve_point(stage, ctx, i);
                    i += 1;
                }
                if i >= self.path.len() {
                    log::info!("river carved: {} path points", self.path.len());
                    self.state = RiverState::Finished;
                    BuildStep::Done
                } else {
                    self.state = RiverState::Carve(i);
                    BuildStep::InProgress
                }
            }
            RiverState::Finished => BuildStep::Done,
        }
    }

    fn reset(&mut self) {
        self.state = RiverState::Walk;
        self.path.clear();
        self.profile.clear();
        self.pos = (0.0, 0.0);
        self.heading = 0.0;
        self.walked = 0.0;
        self.started = false;
    }
}
