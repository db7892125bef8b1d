pub mod vine;

pub use vine::{Flower, Flowering, GrowthEvent, VineGrowth, VineSegment};
