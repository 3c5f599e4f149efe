//! tofu-bindings: client bindings for the pulp_tofu REST API
//!
//! Builds the Python client package for the plugin from the running
//! service's OpenAPI schema, verifies and installs it, and packages both the
//! distributions and the documentation site as tar archives.

pub mod archive;
pub mod artifacts;
pub mod builder;
pub mod config;
pub mod docs;
pub mod error;
pub mod stages;
pub mod status;
pub mod version;

pub use archive::{create_archive, ArchiveOutput};
pub use artifacts::{find_distributions, Distributions};
pub use builder::{BindingsBuilder, BuildFailure, BuildOutput};
pub use config::BindingsConfig;
pub use docs::{rewrite_docs, DocsRewrite, MkdocsSite};
pub use error::{BindingsError, Result};
pub use stages::BindingsStage;
pub use status::{ComponentStatus, StatusClient, StatusReport};
pub use version::{release_version, ComponentVersion};
