pub mod canvas;
pub mod color;
pub mod renderer;
pub mod surface;

pub use canvas::CanvasSurface;
pub use color::{Color, hsv_to_rgb};
pub use renderer::{RenderStyle, Renderer};
pub use surface::{DrawCall, RecordingSurface, Surface};
