//! Packaging of a generated client: docs rewrite, mkdocs config and archives.

use std::path::{Path, PathBuf};
use tofu_bindings::archive::list_entries;
use tofu_bindings::{
    create_archive, find_distributions, rewrite_docs, BindingsConfig, BindingsError, MkdocsSite,
};
use walkdir::WalkDir;

/// Lay out a client directory the way the generator and setuptools leave it.
fn fake_client(root: &Path) -> PathBuf {
    let client = root.join("pulp_tofu-client");
    std::fs::create_dir_all(client.join("docs")).unwrap();
    std::fs::create_dir_all(client.join("dist")).unwrap();

    std::fs::write(
        client.join("README.md"),
        "# pulp_tofu-client\n\n## Documentation For Models\n\n\
         - [TofuProvider](docs/TofuProvider.md)\n\nSee README.md for details.\n",
    )
    .unwrap();
    std::fs::write(
        client.join("docs/TofuProvider.md"),
        "# TofuProvider\n\n[[Back to Model list]](../README.md#documentation-for-models) \
         [[Back to API list]](../README.md#documentation-for-api-endpoints) \
         [[Back to README]](../README.md)\n",
    )
    .unwrap();
    std::fs::write(
        client.join("docs/ContentProvidersApi.md"),
        "# ContentProvidersApi\n\nReturns [TofuProvider](TofuProvider.md)\n",
    )
    .unwrap();
    std::fs::write(client.join("mkdocs.yml"), "docs_dir: docs\n").unwrap();

    std::fs::write(
        client.join("dist/pulp_tofu_client-0.1.0-py3-none-any.whl"),
        b"wheel",
    )
    .unwrap();
    std::fs::write(client.join("dist/pulp_tofu-client-0.1.0.tar.gz"), b"sdist").unwrap();

    client
}

#[test]
fn test_docs_never_mention_readme_after_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let client = fake_client(dir.path());

    let summary = rewrite_docs(&client).unwrap();
    assert_eq!(summary.files_scanned, 3, "two pages plus index");

    for entry in WalkDir::new(client.join("docs")) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let content = std::fs::read_to_string(entry.path()).unwrap();
            assert!(
                !content.contains("README"),
                "{:?} still mentions README",
                entry.path()
            );
        }
    }
}

#[test]
fn test_index_page_comes_from_readme() {
    let dir = tempfile::tempdir().unwrap();
    let client = fake_client(dir.path());

    rewrite_docs(&client).unwrap();

    let index = std::fs::read_to_string(client.join("docs/index.md")).unwrap();
    assert!(index.contains("- [TofuProvider](TofuProvider)"));
    assert!(!index.contains("docs/"));

    let page = std::fs::read_to_string(client.join("docs/TofuProvider.md")).unwrap();
    assert!(page.contains("[[Back to HOME]](../)"));
    assert!(page.contains("(../#documentation-for-models)"));
}

#[test]
fn test_rewrite_requires_readme() {
    let dir = tempfile::tempdir().unwrap();
    let client = fake_client(dir.path());
    std::fs::remove_file(client.join("README.md")).unwrap();

    let err = rewrite_docs(&client).unwrap_err();
    assert!(matches!(err, BindingsError::MissingFile(_)));
}

#[test]
fn test_client_archive_contains_dist() {
    let dir = tempfile::tempdir().unwrap();
    let client = fake_client(dir.path());
    let config = BindingsConfig::new("https://pulp", "/pulp/").with_plugin_dir(dir.path());

    let dists = find_distributions(&client.join("dist"), &config.package).unwrap();
    assert_eq!(dists.all().count(), 2);

    let output = create_archive(&client.join("dist"), "dist", &config.client_archive_path())
        .unwrap();
    assert!(output.path.ends_with("tofu-python-client.tar"));

    let entries = list_entries(&output.path).unwrap();
    assert!(entries.contains(&PathBuf::from("dist")));
    assert!(entries.contains(&PathBuf::from(
        "dist/pulp_tofu_client-0.1.0-py3-none-any.whl"
    )));
}

#[test]
fn test_docs_archive_contains_site() {
    let dir = tempfile::tempdir().unwrap();
    let client = fake_client(dir.path());
    let config = BindingsConfig::new("https://pulp", "/pulp/").with_plugin_dir(dir.path());

    rewrite_docs(&client).unwrap();
    MkdocsSite::for_plugin(&config)
        .append_to(&client.join("mkdocs.yml"))
        .unwrap();

    // Stand-in for `mkdocs build`.
    std::fs::create_dir_all(client.join("site")).unwrap();
    std::fs::write(client.join("site/index.html"), "<html></html>").unwrap();

    let output = create_archive(&client.join("site"), "site", &config.docs_archive_path())
        .unwrap();
    assert!(output.path.ends_with("tofu-python-client-docs.tar"));

    let entries = list_entries(&output.path).unwrap();
    assert!(entries.contains(&PathBuf::from("site")));
    assert!(entries.contains(&PathBuf::from("site/index.html")));

    let mkdocs = std::fs::read_to_string(client.join("mkdocs.yml")).unwrap();
    assert!(mkdocs.starts_with("docs_dir: docs\n---\n"));
}
