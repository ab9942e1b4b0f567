use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use plinth_classpath::{
    materialize, to_classpath_string, FileSystemLayout, LayoutResolver, MaterializeMode,
    MaterializeOptions,
};
use plinth_core::module::ResolvedModule;
use plinth_core::version::BundleVersion;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_jar(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut jar = zip::ZipWriter::new(file);
    for (name, contents) in files {
        jar.start_file(*name, SimpleFileOptions::default()).unwrap();
        jar.write_all(contents.as_bytes()).unwrap();
    }
    jar.finish().unwrap();
}

fn module(name: &str) -> ResolvedModule {
    ResolvedModule::new(name, BundleVersion::new(1, 2, 0))
}

#[test]
fn jar_bundle_unpacks_embedded_jars() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("org.example.a_1.2.0.jar");
    write_jar(
        &jar,
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
            ("lib/inner.jar", "inner"),
            ("org/example/A.class", "class"),
        ],
    );
    let unpack = tmp.path().join("unpacked");
    let layout = FileSystemLayout::new(tmp.path(), &unpack);

    let m = module("org.example.a")
        .at(&jar)
        .with_classpath([".", "lib/inner.jar", "lib/absent.jar"]);
    let entries = layout.classpath_entries(&m).unwrap();

    let inner = unpack.join("org.example.a_1.2.0").join("lib/inner.jar");
    assert_eq!(entries, vec![jar.clone(), inner.clone()]);
    assert_eq!(fs::read(&inner).unwrap(), b"inner");
}

#[test]
fn rebuilt_jar_replaces_previously_unpacked_entries() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("a.jar");
    write_jar(&jar, &[("lib/x.jar", "old"), ("classes/Old.class", "old")]);
    let unpack = tmp.path().join("unpacked");
    let layout = FileSystemLayout::new(tmp.path(), &unpack);
    let m = module("a").at(&jar).with_classpath(["lib/x.jar", "classes"]);

    layout.classpath_entries(&m).unwrap();
    write_jar(&jar, &[("lib/x.jar", "new"), ("classes/New.class", "new")]);
    let entries = layout.classpath_entries(&m).unwrap();

    let root = unpack.join("a_1.2.0");
    assert_eq!(entries, vec![root.join("lib/x.jar"), root.join("classes")]);
    assert_eq!(fs::read_to_string(root.join("lib/x.jar")).unwrap(), "new");
    assert!(root.join("classes/New.class").is_file());
    assert!(!root.join("classes/Old.class").exists());
}

#[test]
fn jar_bundle_unpacks_directory_entries() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("b.jar");
    write_jar(
        &jar,
        &[("classes/b/B.class", "b"), ("classes/b/C.class", "c")],
    );
    let unpack = tmp.path().join("unpacked");
    let layout = FileSystemLayout::new(tmp.path(), &unpack);

    let m = module("b").at(&jar).with_classpath(["classes/"]);
    let entries = layout.classpath_entries(&m).unwrap();

    let dir = unpack.join("b_1.2.0").join("classes");
    assert_eq!(entries, vec![dir.clone()]);
    assert!(dir.join("b/B.class").is_file());
    assert!(dir.join("b/C.class").is_file());
}

#[test]
fn corrupt_jar_is_a_layout_error() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("c.jar");
    fs::write(&jar, b"not a zip").unwrap();
    let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));

    let m = module("c").at(&jar).with_classpath(["lib/x.jar"]);
    let err = layout.classpath_entries(&m).unwrap_err();
    assert!(
        err.to_string().starts_with("Cannot resolve layout of c_1.2.0"),
        "got: {err}"
    );
}

#[test]
fn materializes_mixed_bundles_in_order() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("a.jar");
    write_jar(&jar, &[("lib/dep.jar", "dep")]);
    let dir = tmp.path().join("b");
    fs::create_dir_all(dir.join("bin")).unwrap();

    let modules = vec![
        module("b").at("b").with_classpath(["bin"]),
        module("a").at("a.jar").with_classpath([".", "lib/dep.jar"]),
    ];
    let unpack = tmp.path().join("unpacked");
    let layout = FileSystemLayout::new(tmp.path(), &unpack);

    let paths = materialize(&modules, &layout, MaterializeOptions::default()).unwrap();
    assert_eq!(
        paths,
        vec![
            dir.join("bin"),
            jar.clone(),
            unpack.join("a_1.2.0").join("lib/dep.jar"),
        ]
    );

    let roots = materialize(
        &modules,
        &layout,
        MaterializeOptions {
            mode: MaterializeMode::RootOnly,
            deduplicate: false,
        },
    )
    .unwrap();
    assert_eq!(roots, vec![dir.clone(), jar.clone()]);
    assert!(to_classpath_string(&roots).contains(&*jar.to_string_lossy()));
}

#[test]
fn missing_backing_artifact_aborts_materialization() {
    let tmp = TempDir::new().unwrap();
    let layout = FileSystemLayout::new(tmp.path(), tmp.path().join("unpacked"));
    let modules = vec![module("gone").at(PathBuf::from("gone.jar"))];
    let err = materialize(&modules, &layout, MaterializeOptions::default()).unwrap_err();
    assert!(err.to_string().contains("gone_1.2.0"), "got: {err}");
}
