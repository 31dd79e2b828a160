//! Integration tests for library map resolution
//!
//! These tests verify:
//! - Include flattening order and include-relative base folders
//! - Missing, unreadable and circular includes become issues
//! - Structurally broken includes fail the resolution
//! - Determinism across repeated calls

use camino::{Utf8Path, Utf8PathBuf};
use libmap::{
    LibraryDefinition, LibraryMapConfig, LibraryMapError, LibraryMapInclude, ResolvedLibrary,
    Resolver, ValidationOptions,
};
use std::fs;
use tempfile::TempDir;

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf())
        .unwrap()
        .canonicalize_utf8()
        .unwrap();
    (temp_dir, path)
}

fn write_lib(path: &Utf8Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"\x00\x06\x00\x02GDS").unwrap();
}

fn write_map(path: &Utf8Path, config: &LibraryMapConfig) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    config.write_json(path).unwrap();
}

#[test]
fn test_include_is_spliced_in_place() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("a.gds"));
    write_lib(&dir.join("b.gds"));
    write_lib(&dir.join("shared/c.gds"));
    write_map(
        &dir.join("shared/x.klib"),
        &LibraryMapConfig::new("", vec![LibraryDefinition::new("C", "c.gds").into()]),
    );

    let config = LibraryMapConfig::new(
        "sg13g2",
        vec![
            LibraryDefinition::new("A", "a.gds").into(),
            LibraryMapInclude::new("shared/x.klib").into(),
            LibraryDefinition::new("B", "b.gds").into(),
        ],
    );

    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert_eq!(
        resolution.libraries,
        vec![
            ResolvedLibrary::new("A", dir.join("a.gds")),
            ResolvedLibrary::new("C", dir.join("shared/c.gds")),
            ResolvedLibrary::new("B", dir.join("b.gds")),
        ]
    );
    assert!(resolution.is_clean());
}

#[test]
fn test_nested_includes_use_their_own_folder() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("pdk/io/io.gds"));
    write_map(
        &dir.join("pdk/io/io.klib"),
        &LibraryMapConfig::new("", vec![LibraryDefinition::new("io", "./io.gds").into()]),
    );
    write_map(
        &dir.join("pdk/all.klib"),
        &LibraryMapConfig::new("", vec![LibraryMapInclude::new("io/io.klib").into()]),
    );
    write_map(
        &dir.join("design/top.klib"),
        &LibraryMapConfig::new("", vec![LibraryMapInclude::new("../pdk/all.klib").into()]),
    );

    let resolution = Resolver::default()
        .resolve_file(&dir.join("design/top.klib"))
        .unwrap();

    assert_eq!(
        resolution.libraries,
        vec![ResolvedLibrary::new("io", dir.join("pdk/io/io.gds"))]
    );
}

#[test]
fn test_missing_include_is_reported() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("a.gds"));
    let include = LibraryMapInclude::new("nowhere.klib");
    let config = LibraryMapConfig::new(
        "",
        vec![
            include.clone().into(),
            LibraryDefinition::new("A", "a.gds").into(),
        ],
    );

    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert_eq!(resolution.libraries, vec![ResolvedLibrary::new("A", dir.join("a.gds"))]);
    assert_eq!(resolution.issues.failed_includes.len(), 1);
    assert_eq!(resolution.issues.include_reason(&include), Some("file does not exist"));
    assert_eq!(
        resolution.issues.failed_includes[0].resolved_path,
        Some(dir.join("nowhere.klib"))
    );
}

#[test]
fn test_directory_include_is_reported() {
    let (_guard, dir) = create_test_dir();
    fs::create_dir(dir.join("folder.klib")).unwrap();
    let config = LibraryMapConfig::new("", vec![LibraryMapInclude::new("folder.klib").into()]);

    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert!(resolution.libraries.is_empty());
    assert_eq!(
        resolution.issues.failed_includes[0].reason,
        "not a regular file"
    );
}

#[test]
fn test_issues_from_included_maps_are_merged() {
    let (_guard, dir) = create_test_dir();
    write_map(
        &dir.join("sub/inner.klib"),
        &LibraryMapConfig::new("", vec![LibraryDefinition::new("gone", "gone.gds").into()]),
    );
    let config = LibraryMapConfig::new("", vec![LibraryMapInclude::new("sub/inner.klib").into()]);

    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert_eq!(
        resolution.libraries,
        vec![ResolvedLibrary::new("gone", dir.join("sub/gone.gds"))]
    );
    let issue = &resolution.issues.failed_libraries[0];
    assert_eq!(issue.definition, LibraryDefinition::new("gone", "gone.gds"));
    assert_eq!(issue.resolved_path, Some(dir.join("sub/gone.gds")));
}

#[test]
fn test_broken_include_fails_resolution() {
    let (_guard, dir) = create_test_dir();
    fs::write(dir.join("broken.klib"), "{ \"statements\": [ { \"bogus\": 1 } ] }").unwrap();
    let config = LibraryMapConfig::new("", vec![LibraryMapInclude::new("broken.klib").into()]);

    let err = Resolver::default().resolve(&config, &dir).unwrap_err();

    match err {
        LibraryMapError::Parse { path, .. } => assert_eq!(path, dir.join("broken.klib")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_self_include_is_circular() {
    let (_guard, dir) = create_test_dir();
    let map_path = dir.join("loop.klib");
    write_map(
        &map_path,
        &LibraryMapConfig::new("", vec![LibraryMapInclude::new("loop.klib").into()]),
    );

    let resolution = Resolver::default().resolve_file(&map_path).unwrap();

    assert!(resolution.libraries.is_empty());
    assert_eq!(resolution.issues.circular_includes.len(), 1);
    assert_eq!(resolution.issues.circular_includes[0].resolved_path, map_path);
    assert_eq!(resolution.issues.circular_includes[0].chain, vec![map_path.clone()]);
}

#[test]
fn test_indirect_cycle_terminates() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("a.gds"));
    write_lib(&dir.join("b.gds"));
    write_map(
        &dir.join("a.klib"),
        &LibraryMapConfig::new(
            "",
            vec![
                LibraryDefinition::new("A", "a.gds").into(),
                LibraryMapInclude::new("b.klib").into(),
            ],
        ),
    );
    write_map(
        &dir.join("b.klib"),
        &LibraryMapConfig::new(
            "",
            vec![
                LibraryDefinition::new("B", "b.gds").into(),
                LibraryMapInclude::new("a.klib").into(),
            ],
        ),
    );

    // resolve an in-memory map that includes a.klib, so the cycle is a -> b -> a
    let config = LibraryMapConfig::new("", vec![LibraryMapInclude::new("a.klib").into()]);
    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert_eq!(
        resolution.libraries,
        vec![
            ResolvedLibrary::new("A", dir.join("a.gds")),
            ResolvedLibrary::new("B", dir.join("b.gds")),
        ]
    );
    let circular = &resolution.issues.circular_includes;
    assert_eq!(circular.len(), 1);
    assert_eq!(circular[0].resolved_path, dir.join("a.klib"));
    assert_eq!(circular[0].chain, vec![dir.join("a.klib"), dir.join("b.klib")]);
    assert!(resolution.issues.render_text().contains("Circular includes"));
}

#[test]
fn test_diamond_include_is_not_a_cycle() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("common.gds"));
    write_map(
        &dir.join("common.klib"),
        &LibraryMapConfig::new("", vec![LibraryDefinition::new("common", "common.gds").into()]),
    );
    for side in ["left", "right"] {
        write_map(
            &dir.join(format!("{side}.klib")),
            &LibraryMapConfig::new("", vec![LibraryMapInclude::new("common.klib").into()]),
        );
    }
    let config = LibraryMapConfig::new(
        "",
        vec![
            LibraryMapInclude::new("left.klib").into(),
            LibraryMapInclude::new("right.klib").into(),
        ],
    );

    let resolution = Resolver::default().resolve(&config, &dir).unwrap();

    assert_eq!(resolution.libraries.len(), 2);
    assert!(resolution.is_clean());
}

#[test]
fn test_probe_disabled_accepts_empty_files() {
    let (_guard, dir) = create_test_dir();
    fs::write(dir.join("empty.gds"), b"").unwrap();
    let config = LibraryMapConfig::new("", vec![LibraryDefinition::new("e", "empty.gds").into()]);

    let probing = Resolver::default().resolve(&config, &dir).unwrap();
    let lenient = Resolver::new(ValidationOptions { probe_bytes: 0 })
        .resolve(&config, &dir)
        .unwrap();

    assert_eq!(probing.issues.failed_libraries[0].reason, "file is empty");
    assert!(lenient.is_clean());
    assert_eq!(probing.libraries, lenient.libraries);
}

#[test]
fn test_resolution_is_deterministic() {
    let (_guard, dir) = create_test_dir();
    write_lib(&dir.join("a.gds"));
    write_map(
        &dir.join("inc.klib"),
        &LibraryMapConfig::new(
            "",
            vec![
                LibraryDefinition::new("missing", "missing.gds").into(),
                LibraryMapInclude::new("also_missing.klib").into(),
            ],
        ),
    );
    let config = LibraryMapConfig::new(
        "",
        vec![
            LibraryDefinition::new("A", "a.gds").into(),
            LibraryMapInclude::new("inc.klib").into(),
        ],
    );

    let resolver = Resolver::default();
    let first = resolver.resolve(&config, &dir).unwrap();
    let second = resolver.resolve(&config, &dir).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.issues.render_text(), second.issues.render_text());
    assert_eq!(first.issues.len(), 2);
}

#[test]
fn test_missing_top_level_file_is_an_error() {
    let (_guard, dir) = create_test_dir();
    let result = Resolver::default().resolve_file(&dir.join("absent.klib"));
    assert!(matches!(result, Err(LibraryMapError::Io { .. })));
}
