//! External tool stages of a binding build.

use crate::config::BindingsConfig;
use std::path::{Path, PathBuf};
use tofu_ci::StageConfig;

/// External commands run during a binding build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingsStage {
    /// git describe --all --exact-match HEAD
    GitDescribe,

    /// ./generate.sh <package> <language> <version>
    Generate { version: String, local_schema: bool },

    /// python setup.py sdist bdist_wheel --python-tag py3
    BuildDistributions,

    /// twine check dist/<artifact>
    TwineCheck { artifact: PathBuf },

    /// pip install dist/<wheel>
    PipInstall { wheel: PathBuf },

    /// mkdocs build
    MkdocsBuild,
}

impl BindingsStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> String {
        match self {
            BindingsStage::GitDescribe => "git_describe".to_string(),
            BindingsStage::Generate { .. } => "generate_client".to_string(),
            BindingsStage::BuildDistributions => "build_distributions".to_string(),
            BindingsStage::TwineCheck { artifact } => {
                format!("twine_check:{}", file_name(artifact))
            }
            BindingsStage::PipInstall { .. } => "pip_install".to_string(),
            BindingsStage::MkdocsBuild => "mkdocs_build".to_string(),
        }
    }

    /// Get the stage's command line.
    pub fn command(&self, config: &BindingsConfig) -> Vec<String> {
        match self {
            BindingsStage::GitDescribe => vec![
                "git".to_string(),
                "describe".to_string(),
                "--all".to_string(),
                "--exact-match".to_string(),
                "HEAD".to_string(),
            ],
            BindingsStage::Generate { version, .. } => vec![
                "./generate.sh".to_string(),
                config.package.clone(),
                config.language.clone(),
                version.clone(),
            ],
            BindingsStage::BuildDistributions => vec![
                "python".to_string(),
                "setup.py".to_string(),
                "sdist".to_string(),
                "bdist_wheel".to_string(),
                "--python-tag".to_string(),
                "py3".to_string(),
            ],
            BindingsStage::TwineCheck { artifact } => vec![
                "twine".to_string(),
                "check".to_string(),
                in_dist(artifact),
            ],
            BindingsStage::PipInstall { wheel } => vec![
                "pip".to_string(),
                "install".to_string(),
                in_dist(wheel),
            ],
            BindingsStage::MkdocsBuild => vec!["mkdocs".to_string(), "build".to_string()],
        }
    }

    /// Directory the command runs in.
    pub fn working_dir(&self, config: &BindingsConfig) -> PathBuf {
        match self {
            BindingsStage::GitDescribe => config.plugin_dir.clone(),
            BindingsStage::Generate { .. } => config.generator_dir.clone(),
            BindingsStage::BuildDistributions
            | BindingsStage::TwineCheck { .. }
            | BindingsStage::PipInstall { .. }
            | BindingsStage::MkdocsBuild => config.client_dir(),
        }
    }

    /// Build the runnable stage configuration.
    pub fn to_stage_config(&self, config: &BindingsConfig) -> StageConfig {
        let mut stage = StageConfig::custom(
            self.name(),
            self.command(config),
            config.stage_timeout_secs,
        )
        .in_dir(self.working_dir(config));

        if let BindingsStage::Generate {
            version,
            local_schema,
        } = self
        {
            stage = stage.with_env("VERSION", version.clone());
            if *local_schema {
                stage = stage.with_env("USE_LOCAL_API_JSON", "1");
            }
        }
        stage
    }
}

/// Artifact path as seen from the client directory the stage runs in.
fn in_dist(artifact: &Path) -> String {
    Path::new("dist")
        .join(file_name(artifact))
        .to_string_lossy()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BindingsConfig {
        BindingsConfig::new("https://pulp", "/pulp/")
            .with_plugin_dir("/src/pulp_tofu")
            .with_generator_dir("/src/gen")
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(BindingsStage::GitDescribe.name(), "git_describe");
        assert_eq!(BindingsStage::BuildDistributions.name(), "build_distributions");
        assert_eq!(BindingsStage::MkdocsBuild.name(), "mkdocs_build");
        assert_eq!(
            BindingsStage::TwineCheck {
                artifact: PathBuf::from("dist/pulp_tofu_client-0.1.0-py3-none-any.whl")
            }
            .name(),
            "twine_check:pulp_tofu_client-0.1.0-py3-none-any.whl"
        );
    }

    #[test]
    fn test_generate_stage_with_local_schema() {
        let stage = BindingsStage::Generate {
            version: "0.1.0".to_string(),
            local_schema: true,
        }
        .to_stage_config(&config());

        assert_eq!(
            stage.command,
            vec!["./generate.sh", "pulp_tofu", "python", "0.1.0"]
        );
        assert_eq!(stage.working_dir, Some(PathBuf::from("/src/gen")));
        assert!(stage
            .env
            .contains(&("USE_LOCAL_API_JSON".to_string(), "1".to_string())));
        assert!(stage
            .env
            .contains(&("VERSION".to_string(), "0.1.0".to_string())));
    }

    #[test]
    fn test_generate_stage_without_local_schema() {
        let stage = BindingsStage::Generate {
            version: "0.1.0".to_string(),
            local_schema: false,
        }
        .to_stage_config(&config());

        assert!(!stage.env.iter().any(|(k, _)| k == "USE_LOCAL_API_JSON"));
    }

    #[test]
    fn test_packaging_stages_run_in_client_dir() {
        let config = config();
        for stage in [
            BindingsStage::BuildDistributions,
            BindingsStage::MkdocsBuild,
            BindingsStage::PipInstall {
                wheel: PathBuf::from("dist/x.whl"),
            },
        ] {
            assert_eq!(
                stage.to_stage_config(&config).working_dir,
                Some(PathBuf::from("/src/gen/pulp_tofu-client"))
            );
        }
        assert_eq!(
            BindingsStage::GitDescribe.working_dir(&config),
            PathBuf::from("/src/pulp_tofu")
        );
    }

    #[test]
    fn test_artifact_stages_address_dist_from_client_dir() {
        let config = BindingsConfig::new("https://pulp", "/pulp/")
            .with_generator_dir("target/gen");
        let wheel = config
            .client_dir()
            .join("dist")
            .join("pulp_tofu_client-0.1.0-py3-none-any.whl");

        let check = BindingsStage::TwineCheck {
            artifact: wheel.clone(),
        }
        .to_stage_config(&config);
        assert_eq!(
            check.command,
            vec!["twine", "check", "dist/pulp_tofu_client-0.1.0-py3-none-any.whl"]
        );
        assert_eq!(
            check.working_dir,
            Some(PathBuf::from("target/gen/pulp_tofu-client"))
        );

        let install = BindingsStage::PipInstall { wheel }.to_stage_config(&config);
        assert_eq!(
            install.command,
            vec!["pip", "install", "dist/pulp_tofu_client-0.1.0-py3-none-any.whl"]
        );
    }

    #[test]
    fn test_build_distributions_command() {
        let cmd = BindingsStage::BuildDistributions.command(&config());
        assert_eq!(cmd[0], "python");
        assert!(cmd.contains(&"bdist_wheel".to_string()));
        assert!(cmd.contains(&"py3".to_string()));
    }
}
