//! Configuration module

pub mod settings;

pub use settings::{
    Credentials, FetchConfig, GenerationConfig, LoggingConfig, ServerConfig, Settings,
    DEFAULT_MODEL,
};
