use tellus_stage::{Layer, Stage};
use tellus_substance::{DepositKind, SubstanceId};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

// Blob templates: fixed voxel offsets around the seed point. The large and
// small shapes span three z-levels; gangue is a flat halo.
const LARGE_TEMPLATE: &[(i32, i32, i32)] = &[
    (0, 0, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (1, 1, 0),
    (1, -1, 0),
    (-1, 1, 0),
    (-1, -1, 0),
    (2, 0, 0),
    (-2, 0, 0),
    (0, 2, 0),
    (0, -2, 0),
    (0, 0, 1),
    (1, 0, 1),
    (-1, 0, 1),
    (0, 1, 1),
    (0, -1, 1),
    (0, 0, -1),
    (1, 0, -1),
    (-1, 0, -1),
    (0, 1, -1),
    (0, -1, -1),
];

const SMALL_TEMPLATE: &[(i32, i32, i32)] = &[
    (0, 0, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

const SOLITARY_TEMPLATE: &[(i32, i32, i32)] = &[(0, 0, 0)];

const GANGUE_TEMPLATE: &[(i32, i32, i32)] = &[
    (0, 0, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
];

// Deposits placed per step call; keeps a step a bounded slice of work.
const PLACEMENTS_PER_STEP: u64 = 4;

/// Scatters mineral deposits through the terrain, one category at a time:
/// Large -> Small -> Vein -> Solitary -> Gangue. Seed points must land on a
/// host substance whose affinity list for the category is non-empty; after
/// a bounded number of misses the placement is given up and counted.
pub struct DepositsBuilder {
    kind_idx: usize,
    remaining: u64,
    kind_ready: bool,
    give_ups: [u64; 5],
}

impl DepositsBuilder {
    pub fn new() -> Self {
        DepositsBuilder {
            kind_idx: 0,
            remaining: 0,
            kind_ready: false,
            give_ups: [0; 5],
        }
    }

    pub fn give_ups(&self) -> &[u64; 5] {
        &self.give_ups
    }

    /// Deposit count for a category, scaled from the stage volume.
    fn count_for(stage: &Stage, density: u32) -> u64 {
        (stage.total_blocks() * density as u64) >> 18
    }

    fn random_point(stage: &Stage, ctx: &mut GenContext) -> (i32, i32, i32) {
        let dims = stage.dims();
        (
            ctx.rng.next_i32(0, dims.size_x),
            ctx.rng.next_i32(0, dims.size_y),
            ctx.rng.next_i32(0, dims.size_z),
        )
    }

    /// Picks a seed point whose host substance accepts this category, or
    /// gives up after the configured number of attempts.
    fn pick_host(
        stage: &Stage,
        ctx: &mut GenContext,
        kind: DepositKind,
    ) -> Option<((i32, i32, i32), SubstanceId)> {
        let attempts = ctx.params.params.deposit_max_attempts;
        for _ in 0..attempts {
            let (x, y, z) = Self::random_point(stage, ctx);
            let host = stage.substance(x, y, z, Layer::Solid);
            let pool = stage.catalog().get(host).deposit_pool(kind);
            if pool.is_empty() {
                continue;
            }
            let deposit = pool[ctx.rng.next_usize(pool.len())];
            return Some(((x, y, z), deposit));
        }
        None
    }

    fn stamp(
        stage: &mut Stage,
        center: (i32, i32, i32),
        template: &[(i32, i32, i32)],
        deposit: SubstanceId,
    ) {
        for &(dx, dy, dz) in template {
            let (x, y, z) = (center.0 + dx, center.1 + dy, center.2 + dz);
            if !stage.in_bounds(x, y, z) {
                continue;
            }
            if stage.is_solid(x, y, z) {
                stage.set_substance(x, y, z, Layer::Solid, deposit);
            }
        }
    }

    fn place_blob(
        stage: &mut Stage,
        ctx: &mut GenContext,
        kind: DepositKind,
        template: &[(i32, i32, i32)],
    ) -> bool {
        match Self::pick_host(stage, ctx, kind) {
            Some((center, deposit)) => {
                Self::stamp(stage, center, template, deposit);
                true
            }
            None => false,
        }
    }

    /// A vein connects two solid points with a 3-D Bresenham walk, stamping
    /// a small blob at every step.
    fn place_vein(stage: &mut Stage, ctx: &mut GenContext) -> bool {
        let Some((start, deposit)) = Self::pick_host(stage, ctx, DepositKind::Vein) else {
            return false;
        };
        let attempts = ctx.params.params.deposit_max_attempts;
        let mut end = None;
        for _ in 0..attempts {
            let p = Self::random_point(stage, ctx);
            if stage.is_solid(p.0, p.1, p.2) {
                end = Some(p);
                break;
            }
        }
        let Some(end) = end else {
            return false;
        };
        for point in bresenham3(start, end) {
            Self::stamp(stage, point, SMALL_TEMPLATE, deposit);
        }
        true
    }

    fn place_one(stage: &mut Stage, ctx: &mut GenContext, kind: DepositKind) -> bool {
        match kind {
            DepositKind::Large => Self::place_blob(stage, ctx, kind, LARGE_TEMPLATE),
            DepositKind::Small => Self::place_blob(stage, ctx, kind, SMALL_TEMPLATE),
            DepositKind::Vein => Self::place_vein(stage, ctx),
            DepositKind::Solitary => Self::place_blob(stage, ctx, kind, SOLITARY_TEMPLATE),
            DepositKind::Gangue => Self::place_blob(stage, ctx, kind, GANGUE_TEMPLATE),
        }
    }
}

impl Default for DepositsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for DepositsBuilder {
    fn name(&self) -> &'static str {
        "deposits"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        while self.kind_idx < DepositKind::ALL.len() {
            let kind = DepositKind::ALL[self.kind_idx];
            if !self.kind_ready {
                let density = ctx.params.params.deposit_densities[kind.index()];
                let enabled = kind != DepositKind::Gangue || ctx.params.params.gangue_present;
                self.remaining = if enabled {
                    Self::count_for(stage, density)
                } else {
                    0
                };
                self.kind_ready = true;
            }
            if self.remaining == 0 {
                self.kind_idx += 1;
                self.kind_ready = false;
                continue;
            }
            let batch = self.remaining.min(PLACEMENTS_PER_STEP);
            for _ in 0..batch {
                if !Self::place_one(stage, ctx, kind) {
                    self.give_ups[kind.index()] += 1;
                }
                self.remaining -= 1;
            }
            if self.remaining > 0 {
                return BuildStep::InProgress;
            }
            self.kind_idx += 1;
            self.kind_ready = false;
        }
        let total_give_ups: u64 = self.give_ups.iter().sum();
        if total_give_ups > 0 {
            log::debug!(
                "deposit placement gave up {} times (per category: {:?})",
                total_give_ups,
                self.give_ups
            );
        }
        BuildStep::Done
    }

    fn reset(&mut self) {
        self.kind_idx = 0;
        self.remaining = 0;
        self.kind_ready = false;
        self.give_ups = [0; 5];
    }
}

/// Integer line between two grid points, inclusive of both endpoints.
fn bresenham3(a: (i32, i32, i32), b: (i32, i32, i32)) -> Vec<(i32, i32, i32)> {
    let (mut x, mut y, mut z) = a;
    let (dx, dy, dz) = ((b.0 - x).abs(), (b.1 - y).abs(), (b.2 - z).abs());
    let (sx, sy, sz) = (
        (b.0 - x).signum(),
        (b.1 - y).signum(),
        (b.2 - z).signum(),
    );
    let mut points = Vec::with_capacity((dx.max(dy).max(dz) + 1) as usize);
    points.push((x, y, z));
    if dx >= dy && dx >= dz {
        let mut e_y = 2 * dy - dx;
        let mut e_z = 2 * dz - dx;
        for _ in 0..dx {
            x += sx;
            if e_y >= 0 {
                y += sy;
                e_y -= 2 * dx;
            }
            if e_z >= 0 {
                z += sz;
                e_z -= 2 * dx;
            }
            e_y += 2 * dy;
            e_z += 2 * dz;
            points.push((x, y, z));
        }
    } else if dy >= dx && dy >= dz {
        let mut e_x = 2 * dx - dy;
        let mut e_z = 2 * dz - dy;
        for _ in 0..dy {
            y += sy;
            if e_x >= 0 {
                x += sx;
                e_x -= 2 * dy;
            }
            if e_z >= 0 {
                z += sz;
                e_z -= 2 * dy;
            }
            e_x += 2 * dx;
            e_z += 2 * dz;
            points.push((x, y, z));
        }
    } else {
        let mut e_x = 2 * dx - dz;
        let mut e_y = 2 * dy - dz;
        for _ in 0..dz {
            z += sz;
            if e_x >= 0 {
                x += sx;
                e_x -= 2 * dz;
            }
            if e_y >= 0 {
                y += sy;
                e_y -= 2 * dz;
            }
            e_x += 2 * dx;
            e_y += 2 * dy;
            points.push((x, y, z));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bresenham_connects_endpoints_in_unit_steps() {
        let pts = bresenham3((0, 0, 0), (5, 3, -2));
        assert_eq!(*pts.first().unwrap(), (0, 0, 0));
        assert_eq!(*pts.last().unwrap(), (5, 3, -2));
        for w in pts.windows(2) {
            let (a, b) = (w[0], w[1]);
            assert!((b.0 - a.0).abs() <= 1);
            assert!((b.1 - a.1).abs() <= 1);
            assert!((b.2 - a.2).abs() <= 1);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn bresenham_handles_degenerate_lines() {
        assert_eq!(bresenham3((1, 1, 1), (1, 1, 1)), vec![(1, 1, 1)]);
        let vertical = bresenham3((0, 0, 0), (0, 0, 4));
        assert_eq!(vertical.len(), 5);
    }
}
