use crate::block::{Block, Prop};
use crate::chunk::{CHUNK_SIZE, Chunk};
use crate::grid::ChunkGrid;
use crate::stage::Stage;

/// One node of the render traversal. The renderer pulls block and face data
/// through this rather than reaching into storage, and decides per chunk
/// whether a stale mesh is worth rebuilding this frame.
pub enum StageNode<'a> {
    Stage(&'a Stage),
    Chunks(&'a ChunkGrid),
    Chunk(&'a Chunk),
    Block {
        x: i32,
        y: i32,
        z: i32,
        block: &'a Block,
    },
    Prop(&'a Prop),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// Descend into this node's children.
    Into,
    /// Skip the children, continue with siblings.
    Over,
    /// Abort the whole walk.
    Stop,
}

pub trait Traverse {
    fn visit(&mut self, node: StageNode<'_>) -> Step;
}

/// Walks stage -> chunk grid -> chunks -> blocks -> inventory props.
/// A block's children are only its inventory contents; nothing recurses
/// past a prop. Returns false if the visitor stopped the walk.
pub fn walk(stage: &Stage, visitor: &mut impl Traverse) -> bool {
    match visitor.visit(StageNode::Stage(stage)) {
        Step::Stop => return false,
        Step::Over => return true,
        Step::Into => {}
    }
    let grid = stage.chunks();
    match visitor.visit(StageNode::Chunks(grid)) {
        Step::Stop => return false,
        Step::Over => return true,
        Step::Into => {}
    }
    for chunk in grid.iter() {
        match visitor.visit(StageNode::Chunk(chunk)) {
            Step::Stop => return false,
            Step::Over => continue,
            Step::Into => {}
        }
        let (bx, by, bz) = chunk.base();
        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let block = chunk.block_local(lx, ly);
                let step = visitor.visit(StageNode::Block {
                    x: bx + lx as i32,
                    y: by + ly as i32,
                    z: bz,
                    block,
                });
                match step {
                    Step::Stop => return false,
                    Step::Over => continue,
                    Step::Into => {}
                }
                for prop in block.inventory().iter() {
                    match visitor.visit(StageNode::Prop(prop)) {
                        Step::Stop => return false,
                        _ => {}
                    }
                }
            }
        }
    }
    true
}
