//! Full client builds against a local status server and stub tools.
//!
//! `generate.sh`, `git`, `python`, `twine`, `pip` and `mkdocs` are replaced
//! by small shell scripts placed first on `PATH`. They log their arguments to
//! `tools.log` in the generator checkout and produce the files the real tools
//! would.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use tofu_bindings::archive::list_entries;
use tofu_bindings::{BindingsBuilder, BindingsConfig, BindingsError, StatusClient};
use tofu_ci::PipelineError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const GENERATE_SH: &str = r#"#!/bin/sh
set -e
echo "generate $* VERSION=$VERSION USE_LOCAL_API_JSON=${USE_LOCAL_API_JSON:-}" >> tools.log
if [ -n "$USE_LOCAL_API_JSON" ]; then cp api.json schema-used.json; fi
client="$1-client"
mkdir -p "$client/docs"
printf '# %s\n\n- [TofuProvider](docs/TofuProvider.md)\n' "$client" > "$client/README.md"
printf '# TofuProvider\n\n[[Back to README]](../README.md)\n' > "$client/docs/TofuProvider.md"
printf 'docs_dir: docs\n' > "$client/mkdocs.yml"
printf 'from setuptools import setup\n' > "$client/setup.py"
"#;

const GIT: &str = r#"#!/bin/sh
if [ -f .describe ]; then cat .describe; else echo "fatal: no tag exactly matches" >&2; exit 128; fi
"#;

const PYTHON: &str = r#"#!/bin/sh
set -e
echo "python $*" >> ../tools.log
[ -f setup.py ]
mkdir -p dist
: > dist/pulp_tofu_client-0.1.0-py3-none-any.whl
: > dist/pulp_tofu-client-0.1.0.tar.gz
"#;

const TWINE: &str = r#"#!/bin/sh
echo "twine $*" >> ../tools.log
if [ "$1" != check ] || [ ! -f "$2" ]; then echo "cannot read $2" >&2; exit 2; fi
if [ -f ../fail-twine ]; then echo "InvalidDistribution: bad metadata" >&2; exit 1; fi
"#;

const PIP: &str = r#"#!/bin/sh
echo "pip $*" >> ../tools.log
if [ "$1" != install ] || [ ! -f "$2" ]; then echo "cannot read $2" >&2; exit 2; fi
"#;

const MKDOCS: &str = r#"#!/bin/sh
set -e
echo "mkdocs $*" >> ../tools.log
grep -q '^site_name: ' mkdocs.yml
mkdir -p site
cp docs/index.md site/index.html
"#;

static SHIMS: Once = Once::new();

fn shim_dir() -> PathBuf {
    Path::new(env!("CARGO_TARGET_TMPDIR")).join("tofu-build-shims")
}

fn write_executable(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install the stub tools and put them first on `PATH`.
fn install_shims() {
    SHIMS.call_once(|| {
        let dir = shim_dir();
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in [
            ("generate.sh", GENERATE_SH),
            ("git", GIT),
            ("python", PYTHON),
            ("twine", TWINE),
            ("pip", PIP),
            ("mkdocs", MKDOCS),
        ] {
            write_executable(&dir.join(name), content);
        }

        let path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{}", dir.display(), path));
    });
}

/// Plugin and generator checkouts plus an output directory under `root`.
struct Workspace {
    plugin: PathBuf,
    generator: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new(root: &Path) -> Self {
        let workspace = Workspace {
            plugin: root.join("pulp_tofu"),
            generator: root.join("pulp-openapi-generator"),
            output: root.join("out"),
        };
        std::fs::create_dir_all(&workspace.plugin).unwrap();
        std::fs::create_dir_all(&workspace.generator).unwrap();
        std::os::unix::fs::symlink(
            shim_dir().join("generate.sh"),
            workspace.generator.join("generate.sh"),
        )
        .unwrap();
        workspace
    }

    fn config(&self, base_url: &str) -> BindingsConfig {
        BindingsConfig::new(base_url, "/pulp/")
            .with_plugin_dir(&self.plugin)
            .with_generator_dir(&self.generator)
            .with_output_dir(&self.output)
            .with_stage_timeout(60)
    }

    fn tools_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.generator.join("tools.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn builder(config: BindingsConfig) -> BindingsBuilder {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let status = StatusClient::with_http_client(config.clone(), http);
    BindingsBuilder::with_status_client(config, status)
}

/// Serve the status and schema endpoints until the runtime shuts down.
///
/// Returns the base URL and the request lines seen so far.
async fn serve_api(status_body: String) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&request).to_string();
            let line = request.lines().next().unwrap_or_default().to_string();
            seen.lock().unwrap().push(line.clone());

            let path = line.split_whitespace().nth(1).unwrap_or_default();
            let (status, body) = if path.starts_with("/pulp/api/v3/status/") {
                ("200 OK", status_body.clone())
            } else if path.starts_with("/pulp/api/v3/docs/api.json") {
                ("200 OK", r#"{"openapi":"3.0.3","paths":{}}"#.to_string())
            } else {
                ("404 Not Found", "{}".to_string())
            };
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{}", addr), requests)
}

fn status_body(core: &str, tofu: &str) -> String {
    format!(
        r#"{{"versions":[{{"component":"core","version":"{}"}},{{"component":"tofu","version":"{}"}}]}}"#,
        core, tofu
    )
}

/// Test: a tagged build with a new core produces both archives.
///
/// Paths are relative to the test's working directory, as with the CLI
/// defaults.
#[tokio::test]
async fn test_tagged_build_produces_both_archives() {
    install_shims();
    let root = tempfile::Builder::new()
        .prefix("build-flow-")
        .tempdir_in(".")
        .unwrap();
    let relative_root = PathBuf::from(root.path().file_name().unwrap());
    assert!(relative_root.is_relative());

    let ws = Workspace::new(&relative_root);
    std::fs::write(ws.plugin.join(".describe"), "tags/0.1.0\n").unwrap();
    let stale = ws.generator.join("pulp_tofu-client").join("stale.txt");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, "previous build").unwrap();

    let (url, requests) = serve_api(status_body("3.45.0.post1", "0.1.0")).await;
    let output = builder(ws.config(&url)).run().await.unwrap();

    assert_eq!(output.reported_version, "0.1.0");
    assert_eq!(output.version, "0.1.0");
    assert!(output.local_schema);
    assert!(!stale.exists(), "Previous client must be removed");

    assert_eq!(
        *requests.lock().unwrap(),
        vec![
            "GET /pulp/api/v3/status/ HTTP/1.1".to_string(),
            "GET /pulp/api/v3/docs/api.json?bindings&component=tofu HTTP/1.1".to_string(),
        ]
    );
    let schema = std::fs::read_to_string(ws.generator.join("schema-used.json")).unwrap();
    assert!(schema.contains("openapi"));

    let stages: Vec<_> = output
        .pipeline
        .stages
        .iter()
        .map(|s| s.stage_name.as_str())
        .collect();
    assert_eq!(
        stages,
        vec![
            "generate_client",
            "build_distributions",
            "twine_check:pulp_tofu_client-0.1.0-py3-none-any.whl",
            "twine_check:pulp_tofu-client-0.1.0.tar.gz",
            "pip_install",
            "mkdocs_build",
        ]
    );
    assert!(output.pipeline.success);
    assert!(output.pipeline.error.is_none());

    assert_eq!(
        ws.tools_log(),
        vec![
            "generate pulp_tofu python 0.1.0 VERSION=0.1.0 USE_LOCAL_API_JSON=1",
            "python setup.py sdist bdist_wheel --python-tag py3",
            "twine check dist/pulp_tofu_client-0.1.0-py3-none-any.whl",
            "twine check dist/pulp_tofu-client-0.1.0.tar.gz",
            "pip install dist/pulp_tofu_client-0.1.0-py3-none-any.whl",
            "mkdocs build",
        ]
    );

    assert_eq!(output.client_archive.path, ws.output.join("tofu-python-client.tar"));
    let client_entries = list_entries(&output.client_archive.path).unwrap();
    assert!(client_entries.contains(&PathBuf::from(
        "dist/pulp_tofu_client-0.1.0-py3-none-any.whl"
    )));
    assert!(client_entries.contains(&PathBuf::from("dist/pulp_tofu-client-0.1.0.tar.gz")));

    assert_eq!(
        output.docs_archive.path,
        ws.output.join("tofu-python-client-docs.tar")
    );
    let docs_entries = list_entries(&output.docs_archive.path).unwrap();
    assert!(docs_entries.contains(&PathBuf::from("site/index.html")));
    assert_eq!(output.docs.files_scanned, 2);
}

/// Test: a failing twine check stops the build before anything is packaged
#[tokio::test]
async fn test_failed_twine_check_stops_build() {
    install_shims();
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::new(root.path());
    std::fs::write(ws.generator.join("fail-twine"), "").unwrap();

    let (url, requests) = serve_api(status_body("3.43.0", "0.1.0a1.dev")).await;
    let failure = builder(ws.config(&url)).run().await.unwrap_err();

    match &failure.source {
        BindingsError::Pipeline(PipelineError::StageFailed {
            stage,
            exit_code,
            stderr,
        }) => {
            assert_eq!(stage, "twine_check:pulp_tofu_client-0.1.0-py3-none-any.whl");
            assert_eq!(*exit_code, 1);
            assert_eq!(stderr, "InvalidDistribution: bad metadata");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(!failure.pipeline.success);
    assert_eq!(failure.pipeline.passed_count(), 2);
    assert_eq!(failure.pipeline.failed_count(), 1);
    assert_eq!(
        failure.pipeline.error.as_deref(),
        Some(failure.source.to_string().as_str())
    );

    // Old core: the generator fetches the schema itself.
    assert_eq!(
        *requests.lock().unwrap(),
        vec!["GET /pulp/api/v3/status/ HTTP/1.1".to_string()]
    );
    assert!(!ws.generator.join("api.json").exists());

    let log = ws.tools_log();
    assert!(log[0].starts_with("generate pulp_tofu python 0.1.0a1.dev"));
    assert!(log[0].ends_with("USE_LOCAL_API_JSON="));
    assert!(!log.iter().any(|l| l.starts_with("pip") || l.starts_with("mkdocs")));

    assert!(!ws.output.join("tofu-python-client.tar").exists());
    assert!(!ws.output.join("tofu-python-client-docs.tar").exists());
    assert!(!ws.generator.join("pulp_tofu-client/site").exists());
}

/// Test: a status report without the component aborts before any tool runs
#[tokio::test]
async fn test_missing_component_aborts_before_stages() {
    install_shims();
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::new(root.path());

    let (url, _requests) = serve_api(
        r#"{"versions":[{"component":"core","version":"3.45.0"}]}"#.to_string(),
    )
    .await;
    let failure = builder(ws.config(&url)).run().await.unwrap_err();

    assert!(matches!(failure.source, BindingsError::ComponentNotFound(_)));
    assert!(!failure.pipeline.success);
    assert!(failure.pipeline.stages.is_empty());
    assert!(ws.tools_log().is_empty());
}
