//! Lattice construction
//!
//! Struts are created in two ways: a handful of hand-placed struts near the
//! bottom center, then an expanding-ring full build that adds one cell at a
//! time from the bottom row upward.

use std::collections::HashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use super::grid::LatticeGeometry;
use crate::config::ScaffoldParams;
use crate::math::Vec2;

/// Lifecycle of the scaffold and everything grown on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Initial,
    Building,
    VineGrowing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Building => "building",
            Stage::VineGrowing => "vine-growing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Structural identity of a strut within one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrutKey {
    pub row: i32,
    pub col: i32,
    pub orientation: Orientation,
}

impl StrutKey {
    pub const fn new(row: i32, col: i32, orientation: Orientation) -> Self {
        Self { row, col, orientation }
    }
}

/// One straight lattice segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strut {
    pub key: StrutKey,
    pub start: Vec2,
    pub end: Vec2,
}

impl Strut {
    /// Vertical struts hang down from the cell corner, horizontal ones run right
    pub fn from_key(key: StrutKey, geometry: &LatticeGeometry) -> Self {
        let start = geometry.cell_origin(key.row, key.col);
        let end = match key.orientation {
            Orientation::Vertical => Vec2::new(start.x, start.y + geometry.cell_size),
            Orientation::Horizontal => Vec2::new(start.x + geometry.cell_size, start.y),
        };
        Self { key, start, end }
    }

    pub fn is_horizontal(&self) -> bool {
        self.key.orientation == Orientation::Horizontal
    }

    /// Whether `x` lies within the strut's horizontal extent
    pub fn spans_x(&self, x: f32) -> bool {
        let (lo, hi) = if self.start.x <= self.end.x {
            (self.start.x, self.end.x)
        } else {
            (self.end.x, self.start.x)
        };
        x >= lo && x <= hi
    }

    pub fn midpoint(&self) -> Vec2 {
        self.start.lerp(&self.end, 0.5)
    }
}

/// Hand-placed struts relative to (bottom row, center column): left vertical,
/// center vertical, bridge, right vertical, right connector.
const MANUAL_LAYOUT: [(i32, Orientation); 5] = [
    (-1, Orientation::Vertical),
    (0, Orientation::Vertical),
    (-1, Orientation::Horizontal),
    (1, Orientation::Vertical),
    (0, Orientation::Horizontal),
];

/// Visits lattice cells row by row from the bottom up, each row growing
/// outward from the center column.
#[derive(Debug, Clone)]
pub struct RingCursor {
    row: i32,
    last_row: i32,
    center: i32,
    min_col: i32,
    max_col: i32,
    offset: i32,
    pending_right: Option<i32>,
}

impl RingCursor {
    pub fn new(geometry: &LatticeGeometry, params: &ScaffoldParams) -> Self {
        let (min_col, max_col) = extended_columns(geometry, params);
        Self {
            row: geometry.rows - 1 + params.rows_below,
            last_row: -params.rows_above,
            center: geometry.center_col(),
            min_col,
            max_col,
            offset: 0,
            pending_right: None,
        }
    }

    fn in_bounds(&self, col: i32) -> bool {
        col >= self.min_col && col <= self.max_col
    }
}

impl Iterator for RingCursor {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.row < self.last_row {
                return None;
            }

            if let Some(col) = self.pending_right.take() {
                return Some((self.row, col));
            }

            if self.offset == 0 {
                self.offset = 1;
                if self.in_bounds(self.center) {
                    return Some((self.row, self.center));
                }
                continue;
            }

            let left = self.center - self.offset;
            let right = self.center + self.offset;
            self.offset += 1;

            match (self.in_bounds(left), self.in_bounds(right)) {
                (false, false) => {
                    self.row -= 1;
                    self.offset = 0;
                }
                (true, true) => {
                    self.pending_right = Some(right);
                    return Some((self.row, left));
                }
                (true, false) => return Some((self.row, left)),
                (false, true) => return Some((self.row, right)),
            }
        }
    }
}

/// Column range of the full build: the visible grid plus padding on both sides
fn extended_columns(geometry: &LatticeGeometry, params: &ScaffoldParams) -> (i32, i32) {
    (-params.padding_cells, geometry.cols - 1 + params.padding_cells)
}

/// Outcome of one scheduler tick of the full build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProgress {
    /// No full build running
    Idle,
    InProgress,
    /// The last cell was placed this tick
    Completed,
}

/// Owns the struts and drives both construction stages
#[derive(Debug, Clone)]
pub struct ScaffoldBuilder {
    params: ScaffoldParams,
    stage: Stage,
    struts: Vec<Strut>,
    keys: HashSet<StrutKey>,
    manual_count: u32,
    cursor: Option<RingCursor>,
    /// Geometry the current struts were laid out against
    world: Option<LatticeGeometry>,
    max_col: i32,
}

impl ScaffoldBuilder {
    pub fn new(params: ScaffoldParams) -> Self {
        Self {
            params,
            stage: Stage::Initial,
            struts: Vec::new(),
            keys: HashSet::new(),
            manual_count: 0,
            cursor: None,
            world: None,
            max_col: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn struts(&self) -> &[Strut] {
        &self.struts
    }

    pub fn horizontal_struts(&self) -> impl Iterator<Item = &Strut> {
        self.struts.iter().filter(|s| s.is_horizontal())
    }

    pub fn manual_count(&self) -> u32 {
        self.manual_count
    }

    pub fn is_building(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn world(&self) -> Option<&LatticeGeometry> {
        self.world.as_ref()
    }

    /// Place the next hand-specified strut. Returns the updated counter.
    pub fn add_manual_strut(&mut self, geometry: &LatticeGeometry) -> u32 {
        if self.manual_count >= self.params.manual_limit
            || self.cursor.is_some()
            || self.stage == Stage::VineGrowing
        {
            return self.manual_count;
        }

        if self.stage == Stage::Initial {
            self.stage = Stage::Building;
            self.world = Some(*geometry);
            log::info!("scaffold stage: initial -> building");
        }

        let index = self.manual_count as usize % MANUAL_LAYOUT.len();
        let (dcol, orientation) = MANUAL_LAYOUT[index];
        let row = geometry.bottom_row();
        let col = geometry.center_col() + dcol;

        // Viewports too small for the fixture place nothing
        if row >= 0 && col >= 0 && col < geometry.cols {
            self.insert(StrutKey::new(row, col, orientation), geometry);
        }

        self.manual_count += 1;
        self.manual_count
    }

    /// Begin the expanding-ring build. Returns false if one is already running
    /// or has already finished.
    pub fn start_full_build(&mut self, geometry: &LatticeGeometry) -> bool {
        if self.cursor.is_some() || self.stage == Stage::VineGrowing {
            return false;
        }

        self.struts.clear();
        self.keys.clear();
        self.manual_count = 0;
        self.world = Some(*geometry);
        self.max_col = extended_columns(geometry, &self.params).1;
        self.cursor = Some(RingCursor::new(geometry, &self.params));
        self.stage = Stage::Building;

        log::info!(
            "full lattice build started: {} rows x {} cols, padding {}",
            geometry.rows,
            geometry.cols,
            self.params.padding_cells
        );
        true
    }

    /// Place up to `cells` cells of the running build
    pub fn advance(&mut self, cells: usize) -> BuildProgress {
        let Some(geometry) = self.world else {
            return BuildProgress::Idle;
        };
        let Some(cursor) = self.cursor.as_mut() else {
            return BuildProgress::Idle;
        };

        let mut placed = Vec::with_capacity(cells);
        let mut exhausted = false;
        for _ in 0..cells.max(1) {
            match cursor.next() {
                Some(cell) => placed.push(cell),
                None => {
                    exhausted = true;
                    break;
                }
            }
        }

        for (row, col) in placed {
            self.add_cell(row, col, &geometry);
        }

        if exhausted {
            self.cursor = None;
            self.stage = Stage::VineGrowing;
            log::info!("full lattice build complete: {} struts", self.struts.len());
            BuildProgress::Completed
        } else {
            BuildProgress::InProgress
        }
    }

    /// Left vertical and top horizontal, plus the closing right vertical on the last column
    fn add_cell(&mut self, row: i32, col: i32, geometry: &LatticeGeometry) {
        self.insert(StrutKey::new(row, col, Orientation::Vertical), geometry);
        self.insert(StrutKey::new(row, col, Orientation::Horizontal), geometry);
        if col == self.max_col {
            self.insert(StrutKey::new(row, col + 1, Orientation::Vertical), geometry);
        }
    }

    fn insert(&mut self, key: StrutKey, geometry: &LatticeGeometry) -> bool {
        if !self.keys.insert(key) {
            return false;
        }
        self.struts.push(Strut::from_key(key, geometry));
        true
    }

    /// Starting points for the first vines: a strided, shuffled subset of the
    /// lowest horizontal struts that are visible.
    pub fn root_candidates<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec2> {
        let Some(world) = self.world else {
            return Vec::new();
        };
        let Some(lowest) = self
            .horizontal_struts()
            .map(|s| s.key.row)
            .max()
        else {
            return Vec::new();
        };

        let mut row: Vec<&Strut> = self
            .horizontal_struts()
            .filter(|s| s.key.row == lowest)
            .filter(|s| {
                let mid = s.midpoint().x;
                mid >= 0.0 && mid <= world.width
            })
            .collect();
        row.sort_by_key(|s| s.key.col);

        let mut points: Vec<Vec2> = row
            .iter()
            .step_by(self.params.root_stride.max(1))
            .map(|s| s.midpoint())
            .collect();
        points.shuffle(rng);
        points.truncate(self.params.initial_roots);
        points
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Initial;
        self.struts.clear();
        self.keys.clear();
        self.manual_count = 0;
        self.cursor = None;
        self.world = None;
        self.max_col = 0;
    }
}
