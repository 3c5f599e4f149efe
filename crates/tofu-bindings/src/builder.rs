//! Client binding build driver.
//!
//! Runs the whole build as one fail-fast sequence: any failing step or tool
//! aborts the run and nothing after it executes.

use crate::archive::{create_archive_blocking, ArchiveOutput};
use crate::artifacts::find_distributions;
use crate::config::BindingsConfig;
use crate::docs::{rewrite_docs, DocsRewrite, MkdocsSite};
use crate::error::{BindingsError, Result};
use crate::stages::BindingsStage;
use crate::status::StatusClient;
use crate::version::release_version;
use chrono::Utc;
use thiserror::Error;
use tofu_ci::{Pipeline, PipelineResult, StageRunner};
use tracing::{info, warn};

/// Everything a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Component version reported by the service.
    pub reported_version: String,
    /// Version the bindings were generated with.
    pub version: String,
    /// Whether the schema was fetched locally before generating.
    pub local_schema: bool,
    /// Archive of `dist/`.
    pub client_archive: ArchiveOutput,
    /// Archive of the built docs `site/`.
    pub docs_archive: ArchiveOutput,
    /// Docs rewrite summary.
    pub docs: DocsRewrite,
    /// Executed tool stages.
    pub pipeline: PipelineResult,
}

/// A build that stopped early, with the stages it got through.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct BuildFailure {
    #[source]
    pub source: BindingsError,
    /// Stages executed before the failure, including a failed one.
    pub pipeline: PipelineResult,
}

struct Artifacts {
    reported_version: String,
    version: String,
    local_schema: bool,
    client_archive: ArchiveOutput,
    docs_archive: ArchiveOutput,
    docs: DocsRewrite,
}

/// Builds, verifies and packages the client bindings.
pub struct BindingsBuilder {
    config: BindingsConfig,
    status: StatusClient,
}

impl BindingsBuilder {
    /// Create a builder for the given configuration.
    pub fn new(config: BindingsConfig) -> Result<Self> {
        let status = StatusClient::new(config.clone())?;
        Ok(Self::with_status_client(config, status))
    }

    /// Create a builder that talks to the service through `status`.
    pub fn with_status_client(config: BindingsConfig, status: StatusClient) -> Self {
        Self { config, status }
    }

    /// Run the full build.
    ///
    /// On failure the returned [`BuildFailure`] still carries the record of
    /// every stage that ran.
    pub async fn run(&self) -> std::result::Result<BuildOutput, BuildFailure> {
        let mut pipeline = Pipeline::start("build-client");
        match self.build(&mut pipeline).await {
            Ok(artifacts) => Ok(BuildOutput {
                reported_version: artifacts.reported_version,
                version: artifacts.version,
                local_schema: artifacts.local_schema,
                client_archive: artifacts.client_archive,
                docs_archive: artifacts.docs_archive,
                docs: artifacts.docs,
                pipeline: pipeline.finish(),
            }),
            Err(source) => Err(BuildFailure {
                pipeline: pipeline.abort(&source),
                source,
            }),
        }
    }

    async fn build(&self, pipeline: &mut Pipeline) -> Result<Artifacts> {
        let config = &self.config;

        let report = self.status.fetch_status().await?;
        let reported_version = report.component_version(&[
            config.component.as_str(),
            config.legacy_component.as_str(),
        ])?;

        let description = self.describe_head().await;
        let version = release_version(
            &reported_version,
            description.as_deref(),
            Utc::now().timestamp(),
        );
        info!(reported = %reported_version, version = %version, "Resolved bindings version");

        let client_dir = config.client_dir();
        if tokio::fs::try_exists(&client_dir).await? {
            info!(dir = ?client_dir, "Removing previous client");
            tokio::fs::remove_dir_all(&client_dir).await?;
        }

        let local_schema = report.supports_component_schema();
        if local_schema {
            self.status.fetch_schema(&config.local_schema_path()).await?;
        } else {
            info!("Server cannot render component schemas; generator will fetch it");
        }

        pipeline
            .run_all(&[
                BindingsStage::Generate {
                    version: version.clone(),
                    local_schema,
                }
                .to_stage_config(config),
                BindingsStage::BuildDistributions.to_stage_config(config),
            ])
            .await?;

        let dists = find_distributions(&client_dir.join("dist"), &config.package)?;
        let verify: Vec<_> = dists
            .all()
            .map(|artifact| {
                BindingsStage::TwineCheck {
                    artifact: artifact.clone(),
                }
                .to_stage_config(config)
            })
            .chain(dists.wheels.iter().map(|wheel| {
                BindingsStage::PipInstall {
                    wheel: wheel.clone(),
                }
                .to_stage_config(config)
            }))
            .collect();
        pipeline.run_all(&verify).await?;

        let client_archive = create_archive_blocking(
            client_dir.join("dist"),
            "dist".to_string(),
            config.client_archive_path(),
        )
        .await?;

        let docs = rewrite_docs(&client_dir)?;
        MkdocsSite::for_plugin(config).append_to(&client_dir.join("mkdocs.yml"))?;
        pipeline
            .run_stage(&BindingsStage::MkdocsBuild.to_stage_config(config))
            .await?;

        let docs_archive = create_archive_blocking(
            client_dir.join("site"),
            "site".to_string(),
            config.docs_archive_path(),
        )
        .await?;

        Ok(Artifacts {
            reported_version,
            version,
            local_schema,
            client_archive,
            docs_archive,
            docs,
        })
    }

    /// `git describe` of the plugin checkout, if HEAD is tagged.
    ///
    /// Not being on a tag (or not having git) only means a dev build.
    async fn describe_head(&self) -> Option<String> {
        let stage = BindingsStage::GitDescribe.to_stage_config(&self.config);
        match StageRunner::execute_stage(&stage).await {
            Ok(result) if result.passed() => Some(result.stdout.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Could not describe plugin checkout");
                None
            }
        }
    }
}
