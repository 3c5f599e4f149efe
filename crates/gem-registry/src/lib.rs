//! gem-registry: publish the pulp_tofu Ruby client gem
//!
//! Checks the registry for an existing release of a version and pushes the
//! built gem only when the version is new. The registry is reached through
//! the [`GemRegistry`] trait; [`fakes`] provides an in-memory version for
//! tests.

pub mod config;
pub mod credentials;
pub mod error;
pub mod fakes;
pub mod publish;
pub mod registry;

pub use config::RegistryConfig;
pub use credentials::{default_credentials_path, write_credentials, CREDENTIALS_MODE};
pub use error::{GemError, Result};
pub use publish::{require_version, GemPublisher, PublishOutcome};
pub use registry::{GemRegistry, RubyGemsClient};
