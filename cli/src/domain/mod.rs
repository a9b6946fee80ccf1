//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::process`, or `std::net`.
//! The only filesystem access is the existence checks performed while
//! resolving a plan.

pub mod config;
pub mod error;
pub mod install;
pub mod plan;
pub mod remote;
pub mod target;

pub use config::ProvisionConfig;
pub use error::{ConfigError, ConfigErrors, Phase, ProvisionError, RemoteError};
pub use install::InstallStrategy;
pub use plan::{ProvisioningPlan, resolve};
pub use target::Target;
