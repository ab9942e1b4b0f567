use std::fs;
use std::path::{Path, PathBuf};

use plinth_core::config::{GlobalConfig, OptionalDependencies};
use plinth_core::platform::PLATFORM_FILE;
use plinth_ops::ops_classpath::{get_required_bundles, BundleSpec, RequiredBundlesRequest};
use plinth_ops::ops_platform::{load_platform, Platform};
use tempfile::TempDir;

const PLATFORM: &str = r#"
[[module]]
name = "org.example.app"
version = "1.0.0"
origin = "workspace"
location = "ws/app"
classpath = ["bin"]

[[module.requires]]
name = "org.example.util"
version = "[1.0,2.0)"

[[module.requires]]
name = "org.example.extras"
optional = true

[[module]]
name = "org.example.util"
version = "1.2.0"
location = "plugins/util"
classpath = ["classes", "lib/gson.jar"]

[[module]]
name = "org.example.util.nl"
version = "1.2.0"
location = "plugins/util.nl"
host = { name = "org.example.util" }
"#;

/// Lay out the directories the platform points at.
fn setup() -> (TempDir, Platform) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("ws/app/bin")).unwrap();
    fs::create_dir_all(root.join("plugins/util/classes")).unwrap();
    fs::create_dir_all(root.join("plugins/util/lib")).unwrap();
    fs::write(root.join("plugins/util/lib/gson.jar"), b"").unwrap();
    fs::create_dir_all(root.join("plugins/util.nl")).unwrap();
    fs::write(root.join(PLATFORM_FILE), PLATFORM).unwrap();

    let platform = load_platform(&root.join(PLATFORM_FILE), &GlobalConfig::default()).unwrap();
    (tmp, platform)
}

fn named(name: &str) -> RequiredBundlesRequest {
    RequiredBundlesRequest {
        symbolic_name: Some(name.to_string()),
        ..Default::default()
    }
}

fn lenient(mut request: RequiredBundlesRequest) -> RequiredBundlesRequest {
    request.config.optional = OptionalDependencies::Lenient;
    request
}

fn rel(root: &Path, entries: &[PathBuf]) -> Vec<String> {
    entries
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn strict_optional_fails_on_missing_bundle() {
    let (_tmp, platform) = setup();
    let err = get_required_bundles(&named("org.example.app"), &platform.registry, &platform.layout())
        .unwrap_err();
    assert!(
        err.to_string().contains("Module not found: org.example.extras"),
        "got: {err}"
    );
}

#[test]
fn resolves_classpath_of_closure() {
    let (tmp, platform) = setup();
    let result = get_required_bundles(
        &lenient(named("org.example.app")),
        &platform.registry,
        &platform.layout(),
    )
    .unwrap();

    assert_eq!(
        result.bundles,
        vec!["org.example.app_1.0.0", "org.example.util_1.2.0"]
    );
    assert_eq!(
        rel(tmp.path(), &result.classpath),
        vec!["ws/app/bin", "plugins/util/classes", "plugins/util/lib/gson.jar"]
    );
}

#[test]
fn root_only_mode_and_relative_output() {
    let (tmp, platform) = setup();
    let mut request = lenient(named("org.example.app"));
    request.config.resolve_bundle_classpath = false;
    request.relative_to = Some(tmp.path().join("ws"));

    let result = get_required_bundles(&request, &platform.registry, &platform.layout()).unwrap();
    let rendered: Vec<String> = result
        .classpath
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(rendered, vec!["app", "../plugins/util"]);
}

#[test]
fn specified_bundles_can_be_left_out() {
    let (_tmp, platform) = setup();
    let mut request = lenient(named("org.example.app"));
    request.config.include_specified_bundles = false;

    let result = get_required_bundles(&request, &platform.registry, &platform.layout()).unwrap();
    assert_eq!(result.bundles, vec!["org.example.util_1.2.0"]);
}

#[test]
fn workspace_bundles_can_be_left_out() {
    let (_tmp, platform) = setup();
    let mut request = RequiredBundlesRequest {
        bundles: vec![
            BundleSpec::parse("org.example.app"),
            BundleSpec::parse("org.example.util.nl@1.2.0"),
        ],
        ..Default::default()
    };
    request.config.include_workspace_bundles = false;

    let result = get_required_bundles(&request, &platform.registry, &platform.layout()).unwrap();
    assert_eq!(
        result.bundles,
        vec!["org.example.util.nl_1.2.0", "org.example.util_1.2.0"]
    );
}

#[test]
fn exclude_patterns_apply() {
    let (_tmp, platform) = setup();
    let mut request = lenient(named("org.example.app"));
    request.config.exclude = vec!["org.example.util*".to_string()];

    let result = get_required_bundles(&request, &platform.registry, &platform.layout()).unwrap();
    assert_eq!(result.bundles, vec!["org.example.app_1.0.0"]);
}

#[test]
fn missing_backing_artifact_is_fatal() {
    let (tmp, platform) = setup();
    fs::remove_dir_all(tmp.path().join("plugins/util")).unwrap();
    let err = get_required_bundles(
        &lenient(named("org.example.app")),
        &platform.registry,
        &platform.layout(),
    )
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Cannot resolve layout of org.example.util_1.2.0"),
        "got: {err}"
    );
}
