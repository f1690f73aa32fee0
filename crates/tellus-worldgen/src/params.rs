use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use tellus_substance::{PrototypeCatalog, PrototypeId, SubstanceCatalog, SubstanceId};

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub water: Water,
    #[serde(default)]
    pub strata: Strata,
    #[serde(default)]
    pub deposits: Deposits,
    #[serde(default)]
    pub beaches: Beaches,
    #[serde(default)]
    pub rivers: Rivers,
    #[serde(default)]
    pub smoothing: Smoothing,
    #[serde(default)]
    pub flora: Flora,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height: Height::default(),
            water: Water::default(),
            strata: Strata::default(),
            deposits: Deposits::default(),
            beaches: Beaches::default(),
            rivers: Rivers::default(),
            smoothing: Smoothing::default(),
            flora: Flora::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_octaves")]
    pub octaves: i32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_average_ratio")]
    pub average_ratio: f32,
    #[serde(default = "default_feature_ratio")]
    pub feature_ratio: f32,
}
fn default_height_freq() -> f32 {
    0.02
}
fn default_octaves() -> i32 {
    4
}
fn default_persistence() -> f32 {
    0.55
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_average_ratio() -> f32 {
    0.45
}
fn default_feature_ratio() -> f32 {
    0.25
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            average_ratio: default_average_ratio(),
            feature_ratio: default_feature_ratio(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Water {
    #[serde(default = "default_water_level_ratio")]
    pub level_ratio: f32,
}
fn default_water_level_ratio() -> f32 {
    0.33
}
impl Default for Water {
    fn default() -> Self {
        Self {
            level_ratio: default_water_level_ratio(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Strata {
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_soil_depth")]
    pub soil_depth: i32,
    #[serde(default = "default_sedimentary_frac")]
    pub sedimentary_frac: f32,
    #[serde(default = "default_metamorphic_frac")]
    pub metamorphic_frac: f32,
    #[serde(default = "default_soil_pool")]
    pub soil: Vec<String>,
    #[serde(default = "default_sedimentary_pool")]
    pub sedimentary: Vec<String>,
    #[serde(default = "default_metamorphic_pool")]
    pub metamorphic: Vec<String>,
    #[serde(default = "default_igneous_pool")]
    pub igneous: Vec<String>,
}
fn default_base() -> String {
    "granite".into()
}
fn default_soil_depth() -> i32 {
    3
}
fn default_sedimentary_frac() -> f32 {
    0.45
}
fn default_metamorphic_frac() -> f32 {
    0.75
}
fn default_soil_pool() -> Vec<String> {
    vec!["loam".into(), "clay".into()]
}
fn default_sedimentary_pool() -> Vec<String> {
    vec!["sandstone".into(), "limestone".into(), "shale".into()]
}
fn default_metamorphic_pool() -> Vec<String> {
    vec!["slate".into(), "marble".into()]
}
fn default_igneous_pool() -> Vec<String> {
    vec!["granite".into(), "basalt".into()]
}
impl Default for Strata {
    fn default() -> Self {
        Self {
            base: default_base(),
            soil_depth: default_soil_depth(),
            sedimentary_frac: default_sedimentary_frac(),
            metamorphic_frac: default_metamorphic_frac(),
            soil: default_soil_pool(),
            sedimentary: default_sedimentary_pool(),
            metamorphic: default_metamorphic_pool(),
            igneous: default_igneous_pool(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Deposits {
    #[serde(default = "default_large_density")]
    pub large_density: u32,
    #[serde(default = "default_small_density")]
    pub small_density: u32,
    #[serde(default = "default_vein_density")]
    pub vein_density: u32,
    #[serde(default = "default_solitary_density")]
    pub solitary_density: u32,
    #[serde(default = "default_gangue_density")]
    pub gangue_density: u32,
    #[serde(default = "default_gangue_present")]
    pub gangue_present: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}
fn default_large_density() -> u32 {
    96
}
fn default_small_density() -> u32 {
    384
}
fn default_vein_density() -> u32 {
    64
}
fn default_solitary_density() -> u32 {
    768
}
fn default_gangue_density() -> u32 {
    128
}
fn default_gangue_present() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    8
}
impl Default for Deposits {
    fn default() -> Self {
        Self {
            large_density: default_large_density(),
            small_density: default_small_density(),
            vein_density: default_vein_density(),
            solitary_density: default_solitary_density(),
            gangue_density: default_gangue_density(),
            gangue_present: default_gangue_present(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Beaches {
    #[serde(default = "default_beach_band")]
    pub band: i32,
    #[serde(default = "default_beach_substance")]
    pub substance: String,
}
fn default_beach_band() -> i32 {
    2
}
fn default_beach_substance() -> String {
    "sand".into()
}
impl Default for Beaches {
    fn default() -> Self {
        Self {
            band: default_beach_band(),
            substance: default_beach_substance(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rivers {
    #[serde(default = "default_rivers_enable")]
    pub enable: bool,
    #[serde(default = "default_river_radius")]
    pub radius: i32,
    #[serde(default = "default_wiggle_frequency")]
    pub wiggle_frequency: f32,
    #[serde(default = "default_wiggle_strength")]
    pub wiggle_strength: f32,
}
fn default_rivers_enable() -> bool {
    true
}
fn default_river_radius() -> i32 {
    2
}
fn default_wiggle_frequency() -> f32 {
    0.05
}
fn default_wiggle_strength() -> f32 {
    0.6
}
impl Default for Rivers {
    fn default() -> Self {
        Self {
            enable: default_rivers_enable(),
            radius: default_river_radius(),
            wiggle_frequency: default_wiggle_frequency(),
            wiggle_strength: default_wiggle_strength(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Smoothing {
    #[serde(default = "default_smoothing_enable")]
    pub enable: bool,
}
fn default_smoothing_enable() -> bool {
    true
}
impl Default for Smoothing {
    fn default() -> Self {
        Self {
            enable: default_smoothing_enable(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flora {
    #[serde(default = "default_plains_threshold")]
    pub plains_threshold: f32,
    #[serde(default = "default_forest_threshold")]
    pub forest_threshold: f32,
    #[serde(default = "default_forest_frequency")]
    pub forest_frequency: f32,
    #[serde(default = "default_grass_prototype")]
    pub grass_prototype: String,
    #[serde(default = "default_tree_prototypes")]
    pub tree_prototypes: Vec<String>,
}
fn default_plains_threshold() -> f32 {
    0.72
}
fn default_forest_threshold() -> f32 {
    0.35
}
fn default_forest_frequency() -> f32 {
    0.01
}
fn default_grass_prototype() -> String {
    "grass_tuft".into()
}
fn default_tree_prototypes() -> Vec<String> {
    vec!["oak_tree".into(), "pine_tree".into()]
}
impl Default for Flora {
    fn default() -> Self {
        Self {
            plains_threshold: default_plains_threshold(),
            forest_threshold: default_forest_threshold(),
            forest_frequency: default_forest_frequency(),
            grass_prototype: default_grass_prototype(),
            tree_prototypes: default_tree_prototypes(),
        }
    }
}

// Flattened params used in tight loops (snapshot of config).
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub height_frequency: f32,
    pub height_octaves: i32,
    pub height_persistence: f32,
    pub height_lacunarity: f32,
    pub average_ratio: f32,
    pub feature_ratio: f32,
    pub water_level_ratio: f32,
    pub base: String,
    pub soil_depth: i32,
    pub sedimentary_frac: f32,
    pub metamorphic_frac: f32,
    pub soil_pool: Vec<String>,
    pub sedimentary_pool: Vec<String>,
    pub metamorphic_pool: Vec<String>,
    pub igneous_pool: Vec<String>,
    pub deposit_densities: [u32; 5],
    pub gangue_present: bool,
    pub deposit_max_attempts: u32,
    pub beach_band: i32,
    pub beach_substance: String,
    pub rivers_enable: bool,
    pub river_radius: i32,
    pub wiggle_frequency: f32,
    pub wiggle_strength: f32,
    pub smoothing_enable: bool,
    pub plains_threshold: f32,
    pub forest_threshold: f32,
    pub forest_frequency: f32,
    pub grass_prototype: String,
    pub tree_prototypes: Vec<String>,
}

impl TerrainParams {
    pub fn from_config(cfg: &TerrainConfig) -> Self {
        Self {
            height_frequency: cfg.height.frequency,
            height_octaves: cfg.height.octaves,
            height_persistence: cfg.height.persistence,
            height_lacunarity: cfg.height.lacunarity,
            average_ratio: cfg.height.average_ratio,
            feature_ratio: cfg.height.feature_ratio,
            water_level_ratio: cfg.water.level_ratio,
            base: cfg.strata.base.clone(),
            soil_depth: cfg.strata.soil_depth,
            sedimentary_frac: cfg.strata.sedimentary_frac,
            metamorphic_frac: cfg.strata.metamorphic_frac,
            soil_pool: cfg.strata.soil.clone(),
            sedimentary_pool: cfg.strata.sedimentary.clone(),
            metamorphic_pool: cfg.strata.metamorphic.clone(),
            igneous_pool: cfg.strata.igneous.clone(),
            deposit_densities: [
                cfg.deposits.large_density,
                cfg.deposits.small_density,
                cfg.deposits.vein_density,
                cfg.deposits.solitary_density,
                cfg.deposits.gangue_density,
            ],
            gangue_present: cfg.deposits.gangue_present,
            deposit_max_attempts: cfg.deposits.max_attempts,
            beach_band: cfg.beaches.band,
            beach_substance: cfg.beaches.substance.clone(),
            rivers_enable: cfg.rivers.enable,
            river_radius: cfg.rivers.radius,
            wiggle_frequency: cfg.rivers.wiggle_frequency,
            wiggle_strength: cfg.rivers.wiggle_strength,
            smoothing_enable: cfg.smoothing.enable,
            plains_threshold: cfg.flora.plains_threshold,
            forest_threshold: cfg.flora.forest_threshold,
            forest_frequency: cfg.flora.forest_frequency,
            grass_prototype: cfg.flora.grass_prototype.clone(),
            tree_prototypes: cfg.flora.tree_prototypes.clone(),
        }
    }

    pub fn default() -> Self {
        Self::from_config(&TerrainConfig::default())
    }

    /// Resolves every substance and prototype name against the catalogs,
    /// erroring on names that do not exist so generation never discovers a
    /// missing substance halfway through a pass.
    pub fn resolve(
        &self,
        substances: &SubstanceCatalog,
        prototypes: &PrototypeCatalog,
    ) -> Result<ResolvedParams, Box<dyn Error>> {
        let sub = |name: &str| -> Result<SubstanceId, Box<dyn Error>> {
            substances
                .try_id(name)
                .ok_or_else(|| format!("terrain params reference unknown substance '{}'", name).into())
        };
        let pool = |names: &[String]| -> Result<Vec<SubstanceId>, Box<dyn Error>> {
            names.iter().map(|n| sub(n)).collect()
        };
        let proto = |name: &str| -> Result<PrototypeId, Box<dyn Error>> {
            prototypes
                .try_id(name)
                .ok_or_else(|| format!("terrain params reference unknown prototype '{}'", name).into())
        };
        let soil_pool = pool(&self.soil_pool)?;
        if soil_pool.is_empty() {
            return Err("strata soil pool must not be empty".into());
        }
        let grass_prototype = proto(&self.grass_prototype)?;
        let tree_prototypes = self
            .tree_prototypes
            .iter()
            .map(|n| proto(n))
            .collect::<Result<Vec<_>, _>>()?;
        let grass_substance = prototypes.get(grass_prototype).substance;
        let tree_substances = tree_prototypes
            .iter()
            .map(|&p| prototypes.get(p).substance)
            .collect();
        Ok(ResolvedParams {
            params: self.clone(),
            air: substances.air(),
            water: sub("water")?,
            base: sub(&self.base)?,
            beach_substance: sub(&self.beach_substance)?,
            soil_pool,
            sedimentary_pool: pool(&self.sedimentary_pool)?,
            metamorphic_pool: pool(&self.metamorphic_pool)?,
            igneous_pool: pool(&self.igneous_pool)?,
            grass_prototype,
            grass_substance,
            tree_prototypes,
            tree_substances,
        })
    }
}

/// Terrain params with every name resolved to a catalog id.
#[derive(Clone, Debug)]
pub struct ResolvedParams {
    pub params: TerrainParams,
    pub air: SubstanceId,
    pub water: SubstanceId,
    pub base: SubstanceId,
    pub beach_substance: SubstanceId,
    pub soil_pool: Vec<SubstanceId>,
    pub sedimentary_pool: Vec<SubstanceId>,
    pub metamorphic_pool: Vec<SubstanceId>,
    pub igneous_pool: Vec<SubstanceId>,
    pub grass_prototype: PrototypeId,
    pub grass_substance: SubstanceId,
    pub tree_prototypes: Vec<PrototypeId>,
    pub tree_substances: Vec<SubstanceId>,
}

impl ResolvedParams {
    /// Sea level for a stage of the given height.
    #[inline]
    pub fn sea_level(&self, size_z: i32) -> i32 {
        ((size_z as f32 * self.params.water_level_ratio).round() as i32).clamp(0, size_z - 1)
    }
}

pub fn load_params_from_path(path: &Path) -> Result<TerrainParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    Ok(TerrainParams::from_config(&cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_against_builtin_catalogs() {
        let subs = SubstanceCatalog::builtin();
        let protos = PrototypeCatalog::builtin(&subs);
        let params = TerrainParams::default();
        let resolved = params.resolve(&subs, &protos).unwrap();
        assert_eq!(resolved.sea_level(16), 5);
        assert!(!resolved.igneous_pool.is_empty());
    }

    #[test]
    fn unknown_pool_name_fails_resolution() {
        let subs = SubstanceCatalog::builtin();
        let protos = PrototypeCatalog::builtin(&subs);
        let mut params = TerrainParams::default();
        params.igneous_pool.push("kryptonite".into());
        let err = params.resolve(&subs, &protos).unwrap_err();
        assert!(err.to_string().contains("kryptonite"));
    }

    #[test]
    fn config_roundtrip_from_toml() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [height]
            frequency = 0.05
            octaves = 6
            [deposits]
            vein_density = 0
            [rivers]
            enable = false
            "#,
        )
        .unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.height_frequency, 0.05);
        assert_eq!(params.height_octaves, 6);
        assert_eq!(params.deposit_densities[2], 0);
        assert!(!params.rivers_enable);
        // Unspecified sections keep their defaults.
        assert_eq!(params.soil_depth, 3);
    }
}
