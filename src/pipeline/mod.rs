//! Pipeline module - sequencing of a single generation

pub mod studio;

pub use studio::{GeneratedAsset, Stage, Studio, Submission};
