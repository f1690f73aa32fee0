//! Chunked voxel stage: block storage, face visibility, column cache.
#![forbid(unsafe_code)]

pub mod block;
pub mod chunk;
pub mod column;
pub mod face;
pub mod grid;
pub mod stage;
pub mod visit;

pub use block::{Block, FluidFlow, Inventory, Layer, Prop};
pub use chunk::{CHUNK_AREA, CHUNK_SIZE, Chunk};
pub use column::{ColumnData, ColumnStore};
pub use face::{Face, FaceSet};
pub use grid::ChunkGrid;
pub use stage::{Stage, StageDims};
pub use visit::{StageNode, Step, Traverse};
