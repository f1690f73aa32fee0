use tellus_substance::{Phase, PrototypeId, SubstanceCatalog, SubstanceId};

use crate::face::{Face, FaceSet};

/// Substance layers of a block. Hidden-face caching covers Solid and Fluid;
/// the Cover layer carries surface dressing only.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Layer {
    Solid = 0,
    Fluid = 1,
    Cover = 2,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Solid, Layer::Fluid, Layer::Cover];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Flow descriptor for the fluid layer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FluidFlow {
    pub dir: Option<Face>,
    pub speed: u8,
}

/// A movable object sitting inside a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Prop {
    pub prototype: PrototypeId,
    pub substance: SubstanceId,
}

/// Movable objects contained in a block. Empty for the vast majority of
/// blocks; `Vec::new` does not allocate, so empty inventories cost a pointer
/// triple and nothing on the heap.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: Vec<Prop>,
}

impl Inventory {
    #[inline]
    pub fn push(&mut self, prop: Prop) {
        self.items.push(prop);
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Smallest addressable voxel. Lives only inside a chunk's block arena;
/// never allocated individually.
#[derive(Clone, Debug)]
pub struct Block {
    substances: [SubstanceId; 3],
    hidden: [FaceSet; 2],
    faces_dirty: bool,
    known: bool,
    flow: FluidFlow,
    inventory: Inventory,
}

impl Block {
    /// A block with `nothing` on every layer. Faces start dirty so the first
    /// read computes a real answer.
    pub fn empty() -> Block {
        Block {
            substances: [SubstanceCatalog::NOTHING; 3],
            hidden: [FaceSet::NONE; 2],
            faces_dirty: true,
            known: false,
            flow: FluidFlow::default(),
            inventory: Inventory::default(),
        }
    }

    #[inline]
    pub fn substance(&self, layer: Layer) -> SubstanceId {
        self.substances[layer.index()]
    }

    #[inline]
    pub(crate) fn set_substance_raw(&mut self, layer: Layer, id: SubstanceId) {
        self.substances[layer.index()] = id;
    }

    #[inline]
    pub fn faces_dirty(&self) -> bool {
        self.faces_dirty
    }

    #[inline]
    pub(crate) fn mark_faces_dirty(&mut self) {
        self.faces_dirty = true;
    }

    /// Cached hidden faces for the Solid or Fluid layer. The caller is
    /// responsible for the cache being clean; panics on the Cover layer.
    #[inline]
    pub fn hidden_cached(&self, layer: Layer) -> FaceSet {
        match layer {
            Layer::Solid | Layer::Fluid => self.hidden[layer.index()],
            Layer::Cover => panic!("the cover layer has no hidden-face cache"),
        }
    }

    #[inline]
    pub(crate) fn store_hidden(&mut self, solid: FaceSet, fluid: FaceSet) {
        self.hidden = [solid, fluid];
        self.faces_dirty = false;
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.known
    }

    #[inline]
    pub(crate) fn set_known_raw(&mut self, known: bool) {
        self.known = known;
    }

    #[inline]
    pub fn flow(&self) -> FluidFlow {
        self.flow
    }

    #[inline]
    pub(crate) fn set_flow_raw(&mut self, flow: FluidFlow) {
        self.flow = flow;
    }

    #[inline]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[inline]
    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// True if either layer's substance is drawn at all.
    #[inline]
    pub fn is_visible(&self, catalog: &SubstanceCatalog) -> bool {
        catalog.get(self.substance(Layer::Solid)).is_visible()
            || catalog.get(self.substance(Layer::Fluid)).is_visible()
    }

    /// Combined occlusion over both layers. Deliberately shared by the Solid
    /// and Fluid neighbor tests.
    #[inline]
    pub fn is_opaque(&self, catalog: &SubstanceCatalog) -> bool {
        catalog.get(self.substance(Layer::Solid)).is_opaque()
            || catalog.get(self.substance(Layer::Fluid)).is_opaque()
    }

    #[inline]
    pub fn is_solid(&self, catalog: &SubstanceCatalog) -> bool {
        catalog.get(self.substance(Layer::Solid)).phase == Phase::Solid
    }

    #[inline]
    pub fn is_traversable(&self, catalog: &SubstanceCatalog) -> bool {
        !self.is_solid(catalog)
    }

    /// Fast short-circuit before a block is handed to a mesh builder: after a
    /// recompute, at least one layer must have a face left to draw.
    #[inline]
    pub fn has_any_visible_faces(&self) -> bool {
        !self.hidden[0].is_all() || !self.hidden[1].is_all()
    }
}
