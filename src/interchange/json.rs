//! JSON dump of the canonical model.
//!
//! The dump is the model itself: `system` metadata plus one array per
//! collection, keyed by plural name.
//!
//! ```json
//! {
//!   "system": { "author": "trespass.js", "title": "Office", "id": "model-1", ... },
//!   "actors": [],
//!   "locations": [ { "id": "hall" }, { "id": "desk", "atLocations": ["hall"] } ],
//!   ...
//! }
//! ```

use super::{InterchangeError, ModelFormat};
use crate::model::Model;

/// JSON format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl ModelFormat for Json {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn read(&self, input: &[u8]) -> Result<Model, InterchangeError> {
        let model: Model =
            serde_json::from_slice(input).map_err(|e| InterchangeError::json(e.to_string()))?;
        Ok(model.normalized())
    }

    fn write(&self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        serde_json::to_vec_pretty(model).map_err(|e| InterchangeError::json(e.to_string()))
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let content = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::json(format!("Invalid UTF-8: {e}")))?;
        if !content.trim_start().starts_with('{') {
            return Err(InterchangeError::json("Expected a JSON object"));
        }
        Ok(())
    }
}
