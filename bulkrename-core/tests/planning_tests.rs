use bulkrename_core::{
    build_plan, EntryError, EntryStatus, FieldModule, ModuleOptions, Plan, PlanOptions, Template,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, name).unwrap();
    path
}

fn plan_with(files: &[PathBuf], format: &str, module: &FieldModule) -> Plan {
    let template = Template::parse(format).unwrap();
    build_plan(files, &template, module, &PlanOptions::default()).unwrap()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

fn number_module(start: i64) -> FieldModule {
    FieldModule::from_name(
        Some("number"),
        &ModuleOptions::new().with("start", start.to_string()),
    )
    .unwrap()
}

#[test]
fn test_literal_text_with_name() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![touch(temp_dir.path(), "Foo"), touch(temp_dir.path(), "Bar")];

    let plan = plan_with(&files, "Cool Stuff {name}.jpg", &FieldModule::Default);
    let targets: Vec<_> = plan
        .entries
        .iter()
        .map(|e| file_name(e.target().unwrap()))
        .collect();
    assert_eq!(targets, vec!["Cool Stuff Foo.jpg", "Cool Stuff Bar.jpg"]);
}

#[test]
fn test_targets_stay_in_source_directory() {
    let temp_dir = TempDir::new().unwrap();
    let sub = temp_dir.path().join("nested");
    fs::create_dir(&sub).unwrap();
    let files = vec![touch(&sub, "a.txt"), touch(temp_dir.path(), "b.txt")];

    let plan = plan_with(&files, "x-{name}{ext}", &FieldModule::Default);
    assert_eq!(plan.entries[0].target().unwrap(), sub.join("x-a.txt"));
    assert_eq!(
        plan.entries[1].target().unwrap(),
        temp_dir.path().join("x-b.txt")
    );
}

#[test]
fn test_same_name_in_different_directories_does_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let one = temp_dir.path().join("one");
    let two = temp_dir.path().join("two");
    fs::create_dir(&one).unwrap();
    fs::create_dir(&two).unwrap();
    let files = vec![touch(&one, "a.txt"), touch(&two, "b.txt")];

    let plan = plan_with(&files, "same{ext}", &FieldModule::Default);
    assert_eq!(plan.ready_count(), 2);
    assert!(plan.collisions.is_empty());
}

#[test]
fn test_partial_collision_leaves_others_ready() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![
        touch(temp_dir.path(), "a.jpg"),
        touch(temp_dir.path(), "a.png"),
        touch(temp_dir.path(), "b.gif"),
    ];

    let plan = plan_with(&files, "{name}.img", &FieldModule::Default);
    assert!(matches!(
        plan.entries[0].status,
        EntryStatus::Failed(EntryError::Collision { .. })
    ));
    assert!(matches!(
        plan.entries[1].status,
        EntryStatus::Failed(EntryError::Collision { .. })
    ));
    assert!(plan.entries[2].is_ready());
    assert_eq!(plan.collisions.len(), 1);
}

#[test]
fn test_jobs_option_keeps_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let files: Vec<_> = (0..50)
        .map(|i| touch(temp_dir.path(), &format!("file-{:02}.dat", i)))
        .collect();
    let template = Template::parse("{number}-{name}{ext}").unwrap();

    for jobs in [1, 4] {
        let options = PlanOptions {
            truncate: None,
            jobs: Some(jobs),
        };
        let plan = build_plan(&files, &template, &number_module(0), &options).unwrap();
        for (i, entry) in plan.entries.iter().enumerate() {
            assert_eq!(entry.index, i);
            assert_eq!(
                file_name(entry.target().unwrap()),
                format!("{}-file-{:02}.dat", i, i)
            );
        }
    }
}

#[test]
fn test_unknown_module_fields_rejected_before_any_file() {
    let template = Template::parse("{width}").unwrap();
    let module = FieldModule::from_name(Some("hash"), &ModuleOptions::new()).unwrap();
    // Files don't exist: validation must fail first.
    let files = vec![PathBuf::from("/does/not/exist.png")];
    let err = build_plan(&files, &template, &module, &PlanOptions::default()).unwrap_err();
    assert!(err.to_string().contains("width"));
    assert!(err.to_string().contains("hash"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_default_format_reproduces_names(
        names in prop::collection::hash_set("[a-zA-Z0-9_-]{1,12}(\\.[a-z0-9]{1,4})?", 1..8)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let names: Vec<String> = names.into_iter().collect();
        // Skip sets that only differ by case; they'd alias on some filesystems.
        let folded: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        prop_assume!(folded.len() == names.len());

        let files: Vec<_> = names.iter().map(|n| touch(temp_dir.path(), n)).collect();
        let plan = plan_with(&files, "{name}{ext}", &FieldModule::Default);

        for entry in &plan.entries {
            let unchanged = matches!(entry.status, EntryStatus::Unchanged { .. });
            prop_assert!(unchanged, "{:?}", entry.status);
            prop_assert_eq!(entry.target().unwrap(), entry.source.as_path());
        }
    }

    #[test]
    fn prop_numbers_follow_input_positions(
        start in -50i64..50,
        present in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = present
            .iter()
            .enumerate()
            .map(|(i, exists)| {
                if *exists {
                    touch(temp_dir.path(), &format!("in-{}.txt", i))
                } else {
                    temp_dir.path().join(format!("missing-{}.txt", i))
                }
            })
            .collect();

        let plan = plan_with(&files, "out-{number}{ext}", &number_module(start));

        for (i, entry) in plan.entries.iter().enumerate() {
            if present[i] {
                let expected = format!("out-{}.txt", start + i64::try_from(i).unwrap());
                prop_assert_eq!(file_name(entry.target().unwrap()), expected);
            } else {
                prop_assert_eq!(&entry.status, &EntryStatus::Failed(EntryError::SourceMissing));
            }
        }
    }

    #[test]
    fn prop_no_two_ready_entries_share_a_target(
        stems in prop::collection::vec("[a-c]{1,2}", 2..10),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = stems
            .iter()
            .enumerate()
            .map(|(i, stem)| touch(temp_dir.path(), &format!("{}-{}.txt", stem, i)))
            .collect();
        // Dropping the counter makes repeated stems compete for one name.
        let module = FieldModule::from_name(
            Some("regex"),
            &ModuleOptions::new().with("pattern", r"^(?P<stem>[a-c]+)-\d+$"),
        )
        .unwrap();
        let plan = plan_with(&files, "{stem}{ext}", &module);

        let mut seen = HashSet::new();
        for entry in plan.ready() {
            prop_assert!(seen.insert(entry.target().unwrap().to_path_buf()));
        }
        for (i, entry) in plan.entries.iter().enumerate() {
            let repeated = stems.iter().filter(|s| **s == stems[i]).count() > 1;
            prop_assert_eq!(repeated, !entry.is_ready());
        }
    }
}
