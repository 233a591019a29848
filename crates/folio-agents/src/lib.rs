#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod agent;
mod category;
mod config;
mod provenance;
pub mod workflow;

pub use category::Category;
pub use config::{ContentLimits, ModelTable, Publisher, UnitOptions, WorkflowConfig};
pub use folio_core::{ContentInput, Error, ErrorKind, Result};
pub use provenance::{Generated, Provenance, Unit};
pub use workflow::{Workflow, WorkflowResult};
