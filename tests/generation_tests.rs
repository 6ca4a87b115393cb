// tests/generation_tests.rs
use image::{Rgba, RgbaImage};
use minimap_core::{ClassDictionary, MinimapError};
use minimap_gen::{
    export::LabelRecord, ErrorPolicy, Generator, GeneratorConfig, LabelExporter, PlacedObject,
    SceneObjects,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAP_SIZE: u32 = 512;

fn write_icon(path: &Path, color: [u8; 4]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(16, 16, Rgba(color)).save(path).unwrap();
}

fn slot(name: &str, x: u32, y: u32, size: u32) -> String {
    format!(r#"{{"name": "{name}", "x": {x}, "y": {y}, "width": {size}, "height": {size}}}"#)
}

/// Asset tree with 2 nexus, 11 tower, 2 inhibitor and 4 jungle slots
fn asset_tree(dir: &Path, portraits: usize, pings: usize) -> GeneratorConfig {
    let icons = dir.join("icons");
    let manifest = minimap_gen::CatalogManifest::default();
    for (i, path) in manifest.structures.values().flat_map(|v| v.values()).enumerate() {
        write_icon(&icons.join(path), [i as u8 * 7, 100, 100, 255]);
    }
    write_icon(&icons.join(&manifest.buff_image), [0, 0, 255, 255]);
    write_icon(&icons.join(&manifest.red_badge), [255, 0, 0, 200]);
    write_icon(&icons.join(&manifest.blue_badge), [0, 0, 255, 200]);
    for i in 0..5 {
        write_icon(&icons.join(format!("jungle/camp_{i}.png")), [0, 200, 0, 255]);
    }
    for i in 0..pings {
        write_icon(&icons.join(format!("pings/ping_{i:02}.png")), [255, 255, 0, 255]);
    }

    let portraits_dir = dir.join("portraits");
    fs::create_dir_all(&portraits_dir).unwrap();
    for i in 0..portraits {
        write_icon(
            &portraits_dir.join(format!("square_Champion{i:02}.png")),
            [i as u8 * 10, 50, 200, 255],
        );
    }

    let mut slots = vec![slot("nex_blue", 20, 460, 32), slot("nex_red", 460, 20, 32)];
    slots.extend((0..11u32).map(|i| slot(&format!("tower_{i}"), 30 + i * 40, 250, 20)));
    slots.push(slot("inhib_blue", 60, 420, 18));
    slots.push(slot("inhib_red", 420, 60, 18));
    slots.push(slot("jungle_gromp", 120, 150, 24));
    slots.push(slot("jungle_krugs", 300, 350, 24));
    slots.push(slot("redblue_blue", 140, 200, 24));
    slots.push(slot("redblue_red", 350, 300, 24));
    let layout_file = dir.join("layout.json");
    fs::write(&layout_file, format!("[{}]", slots.join(",\n"))).unwrap();

    let base_map = dir.join("minimap.png");
    RgbaImage::from_pixel(MAP_SIZE, MAP_SIZE, Rgba([40, 110, 60, 255]))
        .save(&base_map)
        .unwrap();

    GeneratorConfig {
        base_map,
        layout_file,
        icons_dir: icons,
        portraits_dir,
        output_dir: dir.join("out"),
        scenes: 3,
        seed: Some(2024),
        progress_every: 1,
        ..GeneratorConfig::default()
    }
}

fn written_pairs(dir: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut stems: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .map(|path| path.file_stem().unwrap().to_string_lossy().to_string())
        .collect();
    stems.sort();
    stems
        .into_iter()
        .map(|stem| (dir.join(format!("{stem}.png")), dir.join(format!("{stem}.txt"))))
        .collect()
}

#[test]
fn test_batch_writes_labeled_pairs() {
    let dir = TempDir::new().unwrap();
    let config = asset_tree(dir.path(), 20, 25);
    let output_dir = config.output_dir.clone();

    let generator = Generator::new(config).unwrap();
    let summary = generator.run().unwrap();

    assert_eq!(summary.requested, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.labels, 45);

    let pairs = written_pairs(&output_dir);
    assert_eq!(pairs.len(), 3);
    for (image_path, label_path) in pairs {
        assert!(image_path.exists(), "{:?} has no image", label_path);
        let image = image::open(&image_path).unwrap();
        assert_eq!((image.width(), image.height()), (MAP_SIZE, MAP_SIZE));

        // 15 portraits, no structures, no pings
        let text = fs::read_to_string(&label_path).unwrap();
        let records: Vec<LabelRecord> =
            text.lines().map(|line| LabelRecord::parse(line).unwrap()).collect();
        assert_eq!(records.len(), 15);

        let classes: HashSet<u32> = records.iter().map(|record| record.class_id).collect();
        assert_eq!(classes.len(), 15);
        for record in &records {
            let name = generator.dictionary().name(record.class_id).unwrap();
            assert!(name.starts_with("Champion"));
            assert!((record.width - 45.0 / MAP_SIZE as f64).abs() < 1e-5);
        }
    }
}

#[test]
fn test_layout_slots_match_objects() {
    let dir = TempDir::new().unwrap();
    let generator = Generator::new(asset_tree(dir.path(), 20, 25)).unwrap();
    let composer = generator.composer().unwrap();

    let rendered = generator.render(&composer, &mut StdRng::seed_from_u64(1)).unwrap();

    for slot in generator.layout().iter() {
        let count = rendered
            .objects
            .iter()
            .filter(|o| (o.x, o.y, o.width, o.height) == (slot.x, slot.y, slot.width, slot.height))
            .count();
        assert_eq!(count, 1, "slot {}", slot.name);
    }

    let towers: Vec<_> = rendered.objects.with_label("tower").map(|o| o.variant.clone()).collect();
    assert_eq!(towers.len(), 11);
    assert_eq!(towers.iter().collect::<HashSet<_>>().len(), 11);
    assert_eq!(rendered.objects.with_label("ping").count(), 20);
}

#[test]
fn test_same_seed_reproduces_scene() {
    let dir = TempDir::new().unwrap();
    let generator = Generator::new(asset_tree(dir.path(), 20, 25)).unwrap();
    let composer = generator.composer().unwrap();

    let a = generator.render(&composer, &mut StdRng::seed_from_u64(77)).unwrap();
    let b = generator.render(&composer, &mut StdRng::seed_from_u64(77)).unwrap();
    let c = generator.render(&composer, &mut StdRng::seed_from_u64(78)).unwrap();

    assert_eq!(a.canvas, b.canvas);
    assert_eq!(a.label_text(), b.label_text());
    assert_ne!(a.objects.as_slice(), c.objects.as_slice());
}

#[test]
fn test_ignore_list_keeps_only_portraits() {
    let mut dictionary = ClassDictionary::new();
    dictionary.insert("structA");
    dictionary.insert("structB");

    let mut objects = SceneObjects::new();
    objects.push(PlacedObject::new("structA", 10, 10, 30, 30));
    objects.push(PlacedObject::new("structB", 60, 10, 30, 30));
    for i in 0..15u32 {
        let name = format!("Champion{i:02}");
        dictionary.insert(&name);
        objects.push(PlacedObject::new(name, 20 * i, 100, 45, 45));
    }

    let exporter = LabelExporter::new(&["structA", "structB"]);
    let text = exporter.render(&objects, MAP_SIZE, MAP_SIZE, &dictionary).unwrap();

    assert_eq!(text.lines().count(), 15);
    for line in text.lines() {
        let record = LabelRecord::parse(line).unwrap();
        assert!(record.class_id >= 2);
    }
}

#[test]
fn test_small_ping_pool_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let config = asset_tree(dir.path(), 20, 10);
    let output_dir = config.output_dir.clone();

    let err = Generator::new(config).unwrap().run().unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MinimapError>(),
        Some(MinimapError::PoolExhausted { requested: 20, available: 10, .. })
    ));
    assert!(written_pairs(&output_dir).is_empty());
}

#[test]
fn test_skip_policy_counts_failures() {
    let dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        error_policy: ErrorPolicy::Skip,
        ..asset_tree(dir.path(), 20, 10)
    };

    let summary = Generator::new(config).unwrap().run().unwrap();

    assert_eq!(summary.written, 0);
    assert_eq!(summary.skipped, 3);
}

#[test]
fn test_empty_portrait_dir_is_config_error() {
    let dir = TempDir::new().unwrap();
    let config = asset_tree(dir.path(), 0, 25);

    let err = Generator::new(config).err().expect("setup must fail");
    assert!(matches!(
        err.downcast_ref::<MinimapError>(),
        Some(MinimapError::EmptyDictionary)
    ));
}

#[test]
fn test_classes_file_written_at_startup() {
    let dir = TempDir::new().unwrap();
    let classes_file = dir.path().join("classes.json");
    let config = GeneratorConfig {
        classes_file: Some(classes_file.clone()),
        ..asset_tree(dir.path(), 16, 25)
    };

    let generator = Generator::new(config).unwrap();
    let saved = ClassDictionary::load_json(&classes_file).unwrap();

    assert_eq!(&saved, generator.dictionary());
    assert_eq!(saved.get("Champion00"), Some(0));
    assert_eq!(saved.get("Champion15"), Some(15));
}
