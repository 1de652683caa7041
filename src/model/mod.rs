//! Canonical TREsPASS model.
//!
//! - [`value`] - open entity records
//! - [`registry`] - collection and known-attribute tables
//! - [`Model`] - immutable model values and the builder API
//! - [`validate`] - per-type schema checks
//! - [`Scenario`] - attack scenario documents

#[allow(clippy::module_inception)]
mod model;
pub mod registry;
mod scenario;
pub mod validate;
pub mod value;

pub use model::{DEFAULT_AUTHOR, DEFAULT_TITLE, DEFAULT_VERSION, Metadata, Model, namespace};
pub use registry::{CollectionDescriptor, collection_names, known_attributes, singular};
pub use scenario::{AssetGoal, Scenario};
pub use validate::{ValidationError, Violation, validate_component, validate_model};
pub use value::{Record, Value, record};
