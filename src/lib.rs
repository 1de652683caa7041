//! # trespass-model
//!
//! Canonical in-memory representation of TREsPASS socio-technical models,
//! with lossless translation to and from the TREsPASS model XML format.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! interchange → XML codec, import/export passes, JSON/YAML dumps
//!   ↓
//! model       → Model values, collection registry, builder, validation
//! ```

// ============================================================================
// MODULES (dependency order: model → interchange)
// ============================================================================

/// Canonical model: records, registry, builder API, validation
pub mod model;

/// Model interchange formats: TREsPASS XML, JSON, YAML
pub mod interchange;

// Re-export the common entry points
pub use interchange::{InterchangeError, ModelFormat, Xml, parse, scenario_to_xml, to_xml};
pub use model::{Metadata, Model, Record, Scenario, ValidationError, Value, record};
pub use model::{validate_component, validate_model};
