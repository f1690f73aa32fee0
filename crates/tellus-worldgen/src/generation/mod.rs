mod beaches;
mod column_shift;
mod deposits;
mod fauna;
mod flora;
mod height;
mod knowledge;
mod lakes;
mod rivers;
mod smoother;
mod strata;
mod terrain_shape;

pub use beaches::BeachesBuilder;
pub use column_shift::ColumnShiftBuilder;
pub use deposits::DepositsBuilder;
pub use fauna::FaunaBuilder;
pub use flora::FloraBuilder;
pub use height::HeightMapBuilder;
pub use knowledge::KnowledgeBuilder;
pub use lakes::LakesBuilder;
pub use rivers::RiversBuilder;
pub use smoother::SmootherBuilder;
pub use strata::StrataBuilder;
pub use terrain_shape::TerrainShapeBuilder;
