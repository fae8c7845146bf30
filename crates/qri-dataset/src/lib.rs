//! Mapping between a working directory of component files and a structured
//! dataset value (§4.B–§4.E): the component catalog, directory scanner,
//! per-component typed model, and aggregated dataset view.

mod aggregate;
mod body;
mod canonical;
mod catalog;
mod component;
mod error;
mod format;
mod scanner;
mod values;

pub use aggregate::{expand, AggregatedView, BodyFileSchemaInferrer, SchemaInferrer};
pub use body::{infer_csv_schema, infer_json_schema, BodyShape};
pub use canonical::canonical_bytes;
pub use catalog::{is_known_filename, ComponentName};
pub use component::{BodyData, Component, ComponentBody, ProblemKind};
pub use error::ComponentError;
pub use format::{normalize_extension, Format};
pub use scanner::{scan_dir, ScannedContainer};
pub use values::{CommitValue, MetaValue, StructureValue};
