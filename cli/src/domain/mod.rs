//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod host;
pub mod shell;
pub mod supervisor;
pub mod template;

pub use config::{Inventory, PipelineSettings};
pub use error::{ConfigError, ProvisionError};
pub use host::{ConfigValue, HostConfig};
pub use supervisor::{InstalledStatus, UnitState};
pub use template::{BindingTable, MissingTemplatePolicy, SyntheticKey};
