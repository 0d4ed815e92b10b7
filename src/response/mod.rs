//! Response handling module - asset download and render checks

pub mod asset;
pub mod fetcher;

pub use asset::FetchedAsset;
pub use fetcher::ResultFetcher;
