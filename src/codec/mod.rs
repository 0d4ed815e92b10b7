//! Codec module - base64 data URIs and raster image encoding

pub mod base64;
pub mod raster;
