use crate::math::Vec2;

/// Discrete lattice geometry derived from a viewport size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeGeometry {
    pub cell_size: f32,
    pub rows: i32,
    pub cols: i32,
    /// Horizontal shift that centers the grid in the viewport
    pub offset_x: f32,
    pub width: f32,
    pub height: f32,
}

impl LatticeGeometry {
    /// Compute the lattice that fits inside a `width` x `height` viewport
    pub fn compute(width: f32, height: f32, cell_size: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let cell_size = cell_size.max(1.0);

        let cols = (width / cell_size).floor() as i32;
        let rows = (height / cell_size).floor() as i32;
        let offset_x = (width - cols as f32 * cell_size) / 2.0;

        Self {
            cell_size,
            rows,
            cols,
            offset_x,
            width,
            height,
        }
    }

    /// Top-left corner of the cell at (`row`, `col`); both may lie outside the viewport
    pub fn cell_origin(&self, row: i32, col: i32) -> Vec2 {
        Vec2::new(
            self.offset_x + col as f32 * self.cell_size,
            row as f32 * self.cell_size,
        )
    }

    /// Column closest to the horizontal center
    pub fn center_col(&self) -> i32 {
        self.cols / 2
    }

    /// Bottom visible row
    pub fn bottom_row(&self) -> i32 {
        self.rows - 1
    }

    /// Ground plane for falling seeds
    pub fn ground_y(&self) -> f32 {
        self.height
    }
}
