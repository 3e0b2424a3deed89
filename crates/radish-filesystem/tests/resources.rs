//! Resource manager tests over built paks

#![allow(clippy::expect_used, clippy::unwrap_used)]

use radish_filesystem::pak::{BuildOptions, PakSource, build_pak_file};
use radish_filesystem::resource::{
    DirectoryProvider, ResourceError, ResourceLoadContext, ResourceManager,
    ResourceManagerOptions, ResourceResult,
};
use std::path::Path;
use tempfile::TempDir;

fn load_text(ctx: &mut ResourceLoadContext<'_>) -> ResourceResult<String> {
    let bytes = ctx.read_to_end()?;
    String::from_utf8(bytes).map_err(|e| ctx.error(e.to_string()))
}

fn pack(dir: &Path, name: &str, files: &[(&str, &str)]) {
    let content = dir.join(format!("{name}-content"));
    std::fs::create_dir_all(&content).unwrap();
    let sources: Vec<PakSource> = files
        .iter()
        .map(|(path, text)| {
            let source = content.join(path);
            std::fs::write(&source, text).unwrap();
            PakSource::new(path, source)
        })
        .collect();
    build_pak_file(name, dir, true, sources, &BuildOptions::default()).unwrap();
}

#[test]
fn test_patch_pak_shadows_base_pak() {
    let temp = TempDir::new().unwrap();
    pack(temp.path(), "base", &[("greeting.txt", "hello"), ("name.txt", "radish")]);
    pack(temp.path(), "patch", &[("greeting.txt", "hello again")]);

    let mut manager = ResourceManager::new(ResourceManagerOptions::new(temp.path()));
    manager.loaders_mut().register::<String, _>(load_text).unwrap();
    manager.mount_pak("base_dir.rpk").unwrap();
    manager.mount_pak("patch_dir.rpk").unwrap();

    assert_eq!(manager.load::<String>("GREETING.TXT").unwrap(), "hello again");
    assert_eq!(manager.load::<String>("name.txt").unwrap(), "radish");
    assert!(matches!(
        manager.load::<String>("missing.txt"),
        Err(ResourceError::NotFound(_))
    ));

    let names: Vec<&str> = manager.providers().map(|p| p.name()).collect();
    assert_eq!(names, vec!["base", "patch"]);
}

#[test]
fn test_loose_directory_over_pak() {
    let temp = TempDir::new().unwrap();
    pack(temp.path(), "base", &[("config.txt", "packed")]);
    let loose = temp.path().join("loose");
    std::fs::create_dir(&loose).unwrap();
    std::fs::write(loose.join("config.txt"), "loose").unwrap();

    let mut manager = ResourceManager::new(ResourceManagerOptions::new(temp.path()));
    manager.loaders_mut().register::<String, _>(load_text).unwrap();
    manager.mount_pak("base_dir.rpk").unwrap();
    manager.mount(DirectoryProvider::new(&loose));

    assert_eq!(manager.load::<String>("config.txt").unwrap(), "loose");
}
