//! Backend module - Generation traits, output normalization, and the Replicate client

pub mod output;
pub mod replicate;
pub mod traits;
