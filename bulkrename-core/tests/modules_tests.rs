use bulkrename_core::{
    rename_operation, ExecuteOptions, Mode, ModuleOptions, RenameOptions, RenameResult,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn targets(result: &RenameResult) -> Vec<String> {
    result
        .entries
        .iter()
        .map(|e| {
            e.target
                .as_ref()
                .and_then(|t| t.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}

fn dry_run(files: &[PathBuf], module: &str, options: ModuleOptions, format: &str) -> RenameResult {
    let options = RenameOptions {
        format: Some(format.to_string()),
        module: Some(module.to_string()),
        module_options: options,
        ..RenameOptions::default()
    };
    rename_operation(files, &options).unwrap().0
}

#[test]
fn test_hash_algorithms() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![write(temp_dir.path(), "a.txt", b"hello")];

    let md5 = dry_run(&files, "hash", ModuleOptions::new(), "{hash}{ext}");
    assert_eq!(targets(&md5), vec!["5d41402abc4b2a76b9719d911017c592.txt"]);

    let sha = dry_run(
        &files,
        "hash",
        ModuleOptions::new().with("algorithm", "sha256"),
        "{hash}",
    );
    assert_eq!(
        targets(&sha),
        vec!["2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"]
    );
}

#[test]
fn test_mime_fixes_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    let files = vec![
        write(temp_dir.path(), "picture.dat", &png),
        write(temp_dir.path(), "notes.dat", b"just some words"),
    ];

    let result = dry_run(&files, "mime", ModuleOptions::new(), "{name}{mime}");
    assert_eq!(targets(&result), vec!["picture.png", "notes"]);
}

#[test]
fn test_stat_size() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![write(temp_dir.path(), "blob", b"123456789")];

    let result = dry_run(&files, "stat", ModuleOptions::new(), "{name}-{size}");
    assert_eq!(targets(&result), vec!["blob-9"]);
}

#[test]
fn test_stat_time_format() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![write(temp_dir.path(), "log", b"x")];

    let result = dry_run(
        &files,
        "stat",
        ModuleOptions::new().with("time-format", "%Y"),
        "{mtime}-{name}",
    );
    let target = &targets(&result)[0];
    assert_eq!(target.len(), "2026-log".len());
    assert!(target.ends_with("-log"));
}

#[test]
fn test_image_dimensions() {
    let temp_dir = TempDir::new().unwrap();
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&640u16.to_le_bytes());
    gif.extend_from_slice(&480u16.to_le_bytes());
    gif.extend_from_slice(&[0u8; 22]);
    let files = vec![
        write(temp_dir.path(), "shot.gif", &gif),
        write(temp_dir.path(), "readme.txt", b"no pixels here at all"),
    ];

    let result = dry_run(
        &files,
        "image",
        ModuleOptions::new(),
        "{name}_{width}x{height}_{ratio}{ext}",
    );
    assert_eq!(targets(&result)[0], "shot_640x480_4:3.gif");
    assert_eq!(result.entries[1].outcome, "failed");
    assert!(result.entries[1]
        .reason
        .as_deref()
        .unwrap()
        .starts_with("unsupported image"));
}

#[test]
fn test_font_names_and_style() {
    let temp_dir = TempDir::new().unwrap();
    let font = include_bytes!("fixtures/bulk-sans.ttf");
    let files = vec![write(temp_dir.path(), "download.ttf", font)];

    let result = dry_run(
        &files,
        "font",
        ModuleOptions::new(),
        "{family} {subfamily} ({weight}, {style}){ext}",
    );
    assert!(result.success());
    assert_eq!(targets(&result), vec!["Bulk Sans Bold Italic (700, italic).ttf"]);
}

#[test]
fn test_font_failure_is_per_file() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![write(temp_dir.path(), "broken.ttf", b"\0\x01\0\0garbage")];

    let result = dry_run(&files, "font", ModuleOptions::new(), "{family}{ext}");
    assert!(!result.success());
    assert_eq!(result.summary.failed, 1);
}

#[test]
fn test_regex_groups_reorder_name() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![
        write(temp_dir.path(), "2019-holiday.jpg", b"x"),
        write(temp_dir.path(), "untitled.jpg", b"x"),
    ];

    let result = dry_run(
        &files,
        "regex",
        ModuleOptions::new().with("pattern", r"^(?P<year>\d{4})-(?P<title>.+)$"),
        "{title} ({year}){ext}",
    );
    assert_eq!(targets(&result)[0], "holiday (2019).jpg");
    assert_eq!(result.entries[1].outcome, "failed");
    assert_eq!(
        result.entries[1].reason.as_deref(),
        Some("pattern did not match 'untitled'")
    );
}

#[test]
fn test_number_padding_commit() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![
        write(temp_dir.path(), "a.jpg", b"a"),
        write(temp_dir.path(), "b.jpg", b"b"),
    ];
    let options = RenameOptions {
        format: Some("img_{number}{ext}".to_string()),
        module: Some("number".to_string()),
        module_options: ModuleOptions::new().with("start", "9").with("pad", "3"),
        execute: ExecuteOptions {
            mode: Mode::Commit,
            ..ExecuteOptions::default()
        },
        ..RenameOptions::default()
    };

    let (result, _) = rename_operation(&files, &options).unwrap();
    assert!(result.success());
    assert!(temp_dir.path().join("img_009.jpg").exists());
    assert!(temp_dir.path().join("img_010.jpg").exists());
}
