//! Terrain generation: parameters, noise, builders, and the pipeline.
#![forbid(unsafe_code)]

pub mod builder;
pub mod generation;
pub mod noise;
pub mod params;
pub mod pipeline;
pub mod rng;

pub use builder::{BuildStep, GenContext, TerrainBuilder};
pub use noise::NoiseField;
pub use params::{ResolvedParams, TerrainConfig, TerrainParams, load_params_from_path};
pub use pipeline::{Phase, Pipeline};
pub use rng::GenRng;
