use chrono::{TimeZone, Utc};
use radar::records::{EventRecord, TaskRecord};
use radar::storage::{init_project_store, load_store, locate_store, save_store, StoreScope};
use radar::{Category, NewItem, Priority, StoreError};
use std::fs;

#[test]
fn project_store_is_found_from_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let location = init_project_store(dir.path(), Some("home".into())).unwrap();
    assert_eq!(location.scope, StoreScope::Project);

    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    let found = locate_store(&nested).unwrap();
    assert_eq!(found.scope, StoreScope::Project);
    assert_eq!(found.path, location.path);

    let store = load_store(&found).unwrap();
    assert_eq!(store.name, "home");
    assert!(store.items().is_empty());
}

#[test]
fn saved_items_reload_and_normalize() {
    let dir = tempfile::tempdir().unwrap();
    let location = init_project_store(dir.path(), None).unwrap();
    let mut store = load_store(&location).unwrap();
    let when = Utc.with_ymd_and_hms(2026, 11, 3, 18, 30, 0).unwrap();

    store
        .add(NewItem {
            id: "abc123".into(),
            title: "Book club".into(),
            category: Category::Event,
            timestamp: Some(when),
            priority: Some(Priority::Medium),
        })
        .unwrap();
    store
        .add(NewItem {
            id: "def456".into(),
            title: "Renovation".into(),
            category: Category::Project,
            timestamp: None,
            priority: Some(Priority::High),
        })
        .unwrap();
    save_store(&location, &store).unwrap();

    let reloaded = load_store(&location).unwrap();
    assert_eq!(reloaded, store);
    let items = reloaded.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, Category::Project);
    assert_eq!(items[1].timestamp, Some(when));
}

#[test]
fn hand_written_yaml_with_bad_dates_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let location = init_project_store(dir.path(), None).unwrap();
    fs::write(
        &location.path,
        "name: scratch\n\
         tasks:\n  - id: t1\n    title: Taxes\n    due: 2026.04.15@23:59\n\
         \x20 - id: t2\n    title: Someday\n    due: whenever\n\
         events:\n  - id: e1\n    title: Lunch\n    starts_at: 2026-10-16T12:00:00Z\n    done: true\n",
    )
    .unwrap();

    let mut store = load_store(&location).unwrap();
    assert_eq!(
        store.tasks[1],
        TaskRecord {
            id: "t2".into(),
            title: "Someday".into(),
            due: Some("whenever".into()),
            priority: None,
            project: false,
            done: false,
        }
    );
    let items = store.items();
    assert_eq!(items.len(), 2);
    assert!(items[0].timestamp.is_some());
    assert_eq!(items[1].timestamp, None);

    assert!(matches!(store.events[0], EventRecord { done: true, .. }));
    assert_eq!(
        store.mark_done("missing"),
        Err(StoreError::ItemNotFound("missing".into()))
    );
}

#[test]
fn repeated_ids_in_yaml_load_as_distinct_blips() {
    let dir = tempfile::tempdir().unwrap();
    let location = init_project_store(dir.path(), None).unwrap();
    fs::write(
        &location.path,
        "name: scratch\n\
         tasks:\n  - id: ''\n    title: untitled task\n\
         notes:\n  - id: task#0\n    title: real note\n\
         \x20 - id: n1\n    title: first\n\
         \x20 - id: n1\n    title: second\n",
    )
    .unwrap();

    let store = load_store(&location).unwrap();
    assert_eq!(store.duplicate_ids(), vec!["n1"]);

    let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
    let blips = radar::compute_layout(&store.items(), now, &radar::DisplaySettings::default());
    let mut ids: Vec<&str> = blips.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&"task#0"));
    let real = blips.iter().find(|b| b.id == "task#0");
    assert_eq!(real.map(|b| b.title.as_str()), Some("real note"));
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}
