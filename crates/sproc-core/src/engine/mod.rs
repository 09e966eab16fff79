pub mod runner;

pub use runner::{RunArtifacts, RunPolicy, Runner};
