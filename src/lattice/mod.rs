pub mod grid;
pub mod scaffold;

pub use grid::LatticeGeometry;
pub use scaffold::{BuildProgress, Orientation, RingCursor, ScaffoldBuilder, Stage, Strut, StrutKey};
