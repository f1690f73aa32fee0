use std::collections::HashMap;

use serde::Deserialize;

use super::types::{Phase, Visibility};

#[derive(Deserialize)]
pub struct SubstancesConfig {
    pub substances: HashMap<String, SubstanceEntry>,
}

#[derive(Deserialize)]
pub struct SubstanceEntry {
    pub phase: Phase,
    pub visibility: Visibility,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_specular")]
    pub specular: [f32; 3],
    #[serde(default)]
    pub deposits: DepositEntry,
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_specular() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

/// Per-host lists of substance names that may be embedded in it, by category.
#[derive(Deserialize, Default, Clone)]
pub struct DepositEntry {
    #[serde(default)]
    pub large: Vec<String>,
    #[serde(default)]
    pub small: Vec<String>,
    #[serde(default)]
    pub vein: Vec<String>,
    #[serde(default)]
    pub solitary: Vec<String>,
    #[serde(default)]
    pub gangue: Vec<String>,
}

#[derive(Deserialize)]
pub struct PrototypesConfig {
    pub prototypes: HashMap<String, PrototypeEntry>,
}

#[derive(Deserialize)]
pub struct PrototypeEntry {
    pub substance: String,
}
