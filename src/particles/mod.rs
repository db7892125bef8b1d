pub mod seeds;

pub use seeds::{Ground, Landing, Population, Seed, SeedField};
