/// Cached statistics for the vertical stack of blocks at one (x, y).
/// Heights are "topmost z + 1" counts except `render_height`, which is the
/// topmost visible z itself. A set dirty bit means none of the cached heights
/// may be trusted until a full top-to-bottom rescan.
#[derive(Copy, Clone, Debug)]
pub struct ColumnData {
    pub initial_height: i32,
    pub solid_height: i32,
    pub render_height: i32,
    pub outdoor_height: i32,
    pub dirty: bool,
}

impl Default for ColumnData {
    fn default() -> Self {
        ColumnData {
            initial_height: 0,
            solid_height: 0,
            render_height: 0,
            outdoor_height: 0,
            dirty: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColumnStore {
    size_x: usize,
    size_y: usize,
    columns: Vec<ColumnData>,
    min_solid_height: i32,
    max_solid_height: i32,
}

impl ColumnStore {
    pub fn new(size_x: usize, size_y: usize) -> ColumnStore {
        ColumnStore {
            size_x,
            size_y,
            columns: vec![ColumnData::default(); size_x * size_y],
            min_solid_height: 0,
            max_solid_height: 0,
        }
    }

    #[inline]
    pub fn idx(&self, x: i32, y: i32) -> usize {
        y as usize * self.size_x + x as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> &ColumnData {
        &self.columns[self.idx(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> &mut ColumnData {
        let i = self.idx(x, y);
        &mut self.columns[i]
    }

    #[inline]
    pub fn mark_dirty(&mut self, x: i32, y: i32) {
        self.get_mut(x, y).dirty = true;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    #[inline]
    pub(crate) fn columns_mut(&mut self) -> &mut [ColumnData] {
        &mut self.columns
    }

    /// Stage-wide solid-height bounds, refreshed by the bulk update pass.
    #[inline]
    pub fn solid_height_bounds(&self) -> (i32, i32) {
        (self.min_solid_height, self.max_solid_height)
    }

    pub(crate) fn set_solid_height_bounds(&mut self, min: i32, max: i32) {
        self.min_solid_height = min;
        self.max_solid_height = max;
    }

    pub fn any_dirty(&self) -> bool {
        self.columns.iter().any(|c| c.dirty)
    }
}
