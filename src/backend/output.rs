//! Normalization of prediction output into a single locator
//!
//! Hosted models return their result in one of a few shapes: a bare URL string,
//! an object carrying a `url` field, or a list of either. Every shape reduces to
//! exactly one [`Locator`]; for lists the first element wins.

use serde::Deserialize;
use serde_json::Value;

use crate::backend::traits::Locator;
use crate::error::{AppError, Result};

/// Raw `output` of a finished prediction.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Collection(Vec<OutputItem>),
    Single(OutputItem),
}

/// One element of the output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OutputItem {
    PlainString(String),
    LocatorObject(LocatorObject),
    /// Anything else; converted through its JSON text
    Opaque(Value),
}

/// Object exposing a `url` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocatorObject {
    pub url: String,
}

impl PredictionOutput {
    pub fn into_locator(self) -> Result<Locator> {
        match self {
            PredictionOutput::Collection(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Generation("model returned an empty output list".to_string()))?
                .into_locator(),
            PredictionOutput::Single(item) => item.into_locator(),
        }
    }
}

impl OutputItem {
    pub fn into_locator(self) -> Result<Locator> {
        let url = match self {
            OutputItem::PlainString(url) => url,
            OutputItem::LocatorObject(object) => object.url,
            OutputItem::Opaque(Value::Null) => {
                return Err(AppError::Generation("model returned no output".to_string()))
            }
            OutputItem::Opaque(value) => value.to_string(),
        };

        if url.trim().is_empty() {
            return Err(AppError::Generation("model returned an empty locator".to_string()));
        }

        Ok(Locator::new(url))
    }
}
