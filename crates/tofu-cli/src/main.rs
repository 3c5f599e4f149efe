//! tofu-release - release tasks for the pulp_tofu client bindings
//!
//! ## Commands
//!
//! - `build-client`: generate, build, verify and package the Python client
//!   and its documentation site
//! - `publish-gem`: push the Ruby client gem to rubygems.org unless that
//!   version is already released

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gem_registry::{
    require_version, GemError, GemPublisher, PublishOutcome, RegistryConfig, RubyGemsClient,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tofu_bindings::config::{DEFAULT_API_ROOT, DEFAULT_PULP_URL};
use tofu_bindings::{BindingsBuilder, BindingsConfig};
use tofu_ci::PipelineResult;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "tofu-release")]
#[command(author = "Pulp Tofu Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build and publish pulp_tofu client bindings", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, build, verify and package the Python client bindings
    BuildClient {
        /// Service base URL
        #[arg(long, env = "PULP_URL", default_value = DEFAULT_PULP_URL)]
        pulp_url: String,

        /// API root path on the service
        #[arg(long, env = "PULP_API_ROOT", default_value = DEFAULT_API_ROOT)]
        api_root: String,

        /// Plugin checkout
        #[arg(long, default_value = ".")]
        plugin_dir: PathBuf,

        /// pulp-openapi-generator checkout
        #[arg(long, default_value = "../pulp-openapi-generator")]
        generator_dir: PathBuf,

        /// Where to write the archives (default: plugin checkout)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Accept self-signed certificates from the service
        #[arg(short = 'k', long)]
        insecure: bool,

        /// Timeout for each external tool, in seconds
        #[arg(long, default_value = "1800")]
        stage_timeout: u64,

        /// Write a JSON report of the executed tool stages
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Publish the Ruby client gem unless the version is already released
    ///
    /// The API key is read from RUBYGEMS_API_KEY.
    PublishGem {
        /// Version to publish
        version: Option<String>,

        /// Gem name
        #[arg(long, default_value = gem_registry::config::DEFAULT_GEM_NAME)]
        gem: String,

        /// Directory holding the built `<gem>-<version>.gem`
        #[arg(long, default_value = ".")]
        gem_dir: PathBuf,

        /// Credentials file (default: ~/.gem/credentials)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Registry base URL (default: $GEM_REGISTRY_URL or https://rubygems.org)
        #[arg(long)]
        registry_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tofu_ci::init_tracing(cli.json, level);

    match cli.command {
        Commands::BuildClient {
            pulp_url,
            api_root,
            plugin_dir,
            generator_dir,
            output_dir,
            insecure,
            stage_timeout,
            report,
        } => {
            let mut config = BindingsConfig::new(&pulp_url, &api_root)
                .with_plugin_dir(&plugin_dir)
                .with_generator_dir(&generator_dir)
                .with_insecure_tls(insecure)
                .with_stage_timeout(stage_timeout);
            if let Some(dir) = output_dir {
                config = config.with_output_dir(dir);
            }
            cmd_build_client(config, report.as_deref()).await
        }
        Commands::PublishGem {
            version,
            gem,
            gem_dir,
            credentials,
            registry_url,
        } => {
            let version = match require_version(version.as_deref()) {
                Ok(v) => v,
                Err(e @ GemError::NoVersion) => {
                    println!("{}", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            let mut config = RegistryConfig::from_env()
                .with_gem_name(&gem)
                .with_gem_dir(&gem_dir);
            if let Some(url) = registry_url {
                config = config.with_registry_url(&url);
            }
            if let Some(path) = credentials {
                config = config.with_credentials_path(path);
            }
            cmd_publish_gem(config, &version).await
        }
    }
}

/// Build and package the client bindings
async fn cmd_build_client(config: BindingsConfig, report: Option<&Path>) -> Result<()> {
    info!(
        status_url = %config.status_url(),
        generator = ?config.generator_dir,
        "Building client bindings"
    );

    let builder = BindingsBuilder::new(config).context("Failed to create HTTP client")?;
    let output = match builder.run().await {
        Ok(output) => output,
        Err(failure) => {
            if let Some(path) = report {
                write_report(&failure.pipeline, path)?;
            }
            return Err(anyhow::Error::new(failure).context("Client binding build failed"));
        }
    };

    if let Some(path) = report {
        write_report(&output.pipeline, path)?;
    }

    println!("Version:  {} (reported {})", output.version, output.reported_version);
    println!(
        "Schema:   {}",
        if output.local_schema {
            "fetched from server"
        } else {
            "fetched by generator"
        }
    );
    println!(
        "Docs:     {} pages rewritten ({} scanned)",
        output.docs.files_changed, output.docs.files_scanned
    );
    println!();
    for stage in &output.pipeline.stages {
        println!("  ✓ {} ({}ms)", stage.stage_name, stage.duration_ms);
    }
    println!();
    println!(
        "Client:   {:?}  sha256:{}",
        output.client_archive.path, output.client_archive.sha256
    );
    println!(
        "Docs:     {:?}  sha256:{}",
        output.docs_archive.path, output.docs_archive.sha256
    );

    Ok(())
}

fn write_report(pipeline: &PipelineResult, path: &Path) -> Result<()> {
    pipeline
        .write_json(path)
        .with_context(|| format!("Failed to write report to {:?}", path))?;
    info!(path = ?path, success = pipeline.success, "Wrote build report");
    Ok(())
}

/// Publish the gem once per version
async fn cmd_publish_gem(config: RegistryConfig, version: &str) -> Result<()> {
    let registry = RubyGemsClient::new(config.clone()).context("Failed to create HTTP client")?;
    let publisher = GemPublisher::new(Arc::new(registry), config);

    match publisher.publish(version).await? {
        PublishOutcome::AlreadyPublished { gem, version } => {
            println!("{} {} has already been released. Skipping.", gem, version);
        }
        PublishOutcome::Published {
            gem,
            version,
            gem_file,
        } => {
            println!("Published {} {} from {:?}", gem, version, gem_file);
        }
    }

    Ok(())
}
