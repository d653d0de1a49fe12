//! End-to-end streaming through the filesystem source and its worker threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DMat4;
use terra_assets::{
    AssetDatabase, AssetDescriptor, LoadState, LocalFileSource, RetryPolicy, SourceKind,
    SourceRegistry,
};
use terra_math::LatLng;
use terra_mesh::LoadStatus;

const CUBE: &str = "\
# unit cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 7 3
f 4 8 7
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

/// Run frames until `done` holds, failing after a few seconds.
fn pump_until(
    db: &mut AssetDatabase,
    mut done: impl FnMut(&AssetDatabase, &[AssetDescriptor]) -> bool,
) {
    let start = Instant::now();
    loop {
        let mut ready = Vec::new();
        db.query_ready(&mut ready);
        if done(db, &ready) {
            return;
        }
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "Timed out waiting for asset database"
        );
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_streams_meshes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cube.obj"), CUBE).unwrap();
    std::fs::write(dir.path().join("broken.obj"), "v 1 2\n").unwrap();

    let files = Arc::new(LocalFileSource::new(dir.path(), 2).unwrap());
    let sources = SourceRegistry::new().with(SourceKind::File, files);
    let mut db = AssetDatabase::new(sources, RetryPolicy::no_retry());

    let here = LatLng::new(60.1699, 24.9384);
    db.register(AssetDescriptor::from_file(here, "cube.obj", DMat4::IDENTITY))
        .unwrap()
        .register(AssetDescriptor::from_file(here, "broken.obj", DMat4::IDENTITY))
        .unwrap()
        .register(AssetDescriptor::from_file(here, "missing.obj", DMat4::IDENTITY))
        .unwrap();

    pump_until(&mut db, |db, _| db.loading_count() == 0 && db.tick() > 1);

    let mut ready = Vec::new();
    db.query_ready(&mut ready);
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].uri, "cube.obj");

    let cube = db.get_mesh("cube.obj").unwrap();
    assert_eq!(cube.vertices().len(), 8);
    assert_eq!(cube.triangles().len(), 12);
    assert_eq!(cube.bounds().max, glam::Vec3::ONE);

    assert!(matches!(
        db.record("broken.obj").unwrap().state(),
        LoadState::Failed {
            status: LoadStatus::InvalidData,
            ..
        }
    ));
    assert!(matches!(
        db.record("missing.obj").unwrap().state(),
        LoadState::Failed {
            status: LoadStatus::NotFound,
            ..
        }
    ));
}

#[test]
fn test_many_assets_load_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..16 {
        std::fs::write(dir.path().join(format!("m{i}.obj")), CUBE).unwrap();
    }
    let files = Arc::new(LocalFileSource::new(dir.path(), 4).unwrap());
    let mut db = AssetDatabase::new(
        SourceRegistry::new().with(SourceKind::File, files),
        RetryPolicy::default(),
    );
    for i in 0..16 {
        db.register(AssetDescriptor::from_file(
            LatLng::new(f64::from(i), 0.0),
            format!("file://m{i}.obj"),
            DMat4::IDENTITY,
        ))
        .unwrap();
    }

    pump_until(&mut db, |_, ready| ready.len() == 16);
    assert_eq!(db.loading_count(), 0);
}
