use std::path::Path;

use plinth_core::config::OptionalDependencies;
use plinth_core::module::ModuleOrigin;
use plinth_core::platform::PlatformFile;
use plinth_core::version::BundleVersion;

const SAMPLE: &str = r#"
[platform]
prefer-workspace = false
unpack-dir = "build/unpacked"

[[module]]
name = "org.example.app"
version = "1.0.0.qualifier"
origin = "workspace"
location = "projects/app"
classpath = ["bin"]

[[module.requires]]
name = "org.example.util"
version = "[1.0,2.0)"

[[module.requires]]
name = "org.example.extra"
optional = true

[[module]]
name = "org.example.util"
version = "1.4.2"
location = "plugins/org.example.util_1.4.2.jar"

[[module]]
name = "org.example.util.nl"
version = "1.4.2"
host = { name = "org.example.util", version = "1.0" }

[resolve]
optional = "exclude"
"#;

#[test]
fn parses_sections() {
    let platform = PlatformFile::parse_toml(SAMPLE).unwrap();
    assert!(!platform.platform.prefer_workspace);
    assert_eq!(
        platform.platform.unpack_dir.as_deref(),
        Some("build/unpacked")
    );
    assert_eq!(platform.modules.len(), 3);
    assert_eq!(
        platform.resolve.unwrap().optional,
        OptionalDependencies::Exclude
    );
}

#[test]
fn converts_entries_into_modules() {
    let platform = PlatformFile::parse_toml(SAMPLE).unwrap();
    let modules = platform.modules(Path::new("/ws")).unwrap();

    let app = &modules[0];
    assert_eq!(app.name(), "org.example.app");
    assert_eq!(
        *app.version(),
        BundleVersion::new(1, 0, 0).with_qualifier("qualifier")
    );
    assert_eq!(app.origin, ModuleOrigin::Workspace);
    assert_eq!(app.location.as_deref(), Some(Path::new("/ws/projects/app")));
    assert_eq!(app.classpath, vec!["bin"]);
    assert_eq!(app.requires.len(), 2);
    assert!(!app.requires[0].optional);
    assert!(app.requires[1].optional);

    let util = &modules[1];
    assert_eq!(util.origin, ModuleOrigin::External);
    assert!(util.classpath.is_empty());

    let nl = &modules[2];
    assert!(nl.host.is_some());
    assert!(nl.location.is_none());
}

#[test]
fn empty_file_has_defaults() {
    let platform = PlatformFile::parse_toml("").unwrap();
    assert!(platform.platform.prefer_workspace);
    assert!(platform.modules.is_empty());
    assert!(platform.resolve.is_none());
}

#[test]
fn invalid_module_version_is_rejected() {
    let platform = PlatformFile::parse_toml(
        r#"
[[module]]
name = "broken"
version = "one.two"
"#,
    )
    .unwrap();
    let err = platform.modules(Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("Invalid version"), "got: {err}");
}

#[test]
fn syntax_error_is_platform_error() {
    let err = PlatformFile::parse_toml("[[module]\nname = ").unwrap_err();
    assert!(err.to_string().starts_with("Platform error"), "got: {err}");
}
