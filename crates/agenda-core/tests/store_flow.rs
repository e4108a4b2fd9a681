use std::collections::HashSet;
use std::fs;

use agenda_core::store::TaskStore;
use agenda_core::task::Status;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::tempdir;
use uuid::Uuid;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .expect("valid date")
}

#[test]
fn add_issues_unique_ids_and_appends_in_order() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let mut issued: HashSet<Uuid> = HashSet::new();
    for i in 0..20 {
        let task = store
            .add(format!("task {i}"), String::new(), at(1, 0))
            .expect("add task");
        assert_eq!(task.status, Status::NotStarted);
        assert!(issued.insert(task.id), "id issued twice: {}", task.id);
    }

    assert_eq!(store.tasks.len(), 20);
    assert_eq!(store.tasks[0].name, "task 0");
    assert_eq!(store.tasks[19].name, "task 19");
}

#[test]
fn toggle_three_times_returns_to_not_started() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let task = store
        .add("cycle".to_string(), String::new(), at(1, 0))
        .expect("add task");

    assert_eq!(
        store.toggle_status(task.id).expect("toggle"),
        Some(Status::InProgress)
    );
    assert_eq!(
        store.toggle_status(task.id).expect("toggle"),
        Some(Status::Completed)
    );
    assert_eq!(
        store.toggle_status(task.id).expect("toggle"),
        Some(Status::NotStarted)
    );
}

#[test]
fn toggle_unknown_id_is_a_no_op() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("only".to_string(), String::new(), at(1, 0))
        .expect("add task");

    let result = store.toggle_status(Uuid::new_v4()).expect("toggle");
    assert_eq!(result, None);
    assert_eq!(store.tasks[0].status, Status::NotStarted);
}

#[test]
fn sort_by_date_is_ascending_and_stable() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("b".to_string(), String::new(), at(2, 0))
        .expect("add b");
    store
        .add("a".to_string(), String::new(), at(1, 0))
        .expect("add a");
    store
        .add("c".to_string(), String::new(), at(3, 0))
        .expect("add c");
    // Same date as "a"; must stay behind it after sorting.
    store
        .add("a2".to_string(), String::new(), at(1, 0))
        .expect("add a2");

    store.sort_by_date().expect("sort by date");

    let names: Vec<&str> = store.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "a2", "b", "c"]);
}

#[test]
fn sort_by_status_ranks_not_started_first() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let done = store
        .add("done".to_string(), String::new(), at(1, 0))
        .expect("add done");
    store
        .add("fresh".to_string(), String::new(), at(1, 0))
        .expect("add fresh");
    let active = store
        .add("active".to_string(), String::new(), at(1, 0))
        .expect("add active");
    store
        .add("fresh2".to_string(), String::new(), at(1, 0))
        .expect("add fresh2");

    store.toggle_status(done.id).expect("toggle done");
    store.toggle_status(done.id).expect("toggle done");
    store.toggle_status(active.id).expect("toggle active");

    store.sort_by_status().expect("sort by status");

    let names: Vec<&str> = store.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["fresh", "fresh2", "active", "done"]);
    let ranks: Vec<u8> = store.tasks.iter().map(|t| t.status.rank()).collect();
    assert_eq!(ranks, [0, 0, 1, 2]);
}

#[test]
fn save_then_reopen_round_trips_every_field() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let task = store
        .add("Buy milk".to_string(), "2% milk".to_string(), at(10, 8))
        .expect("add task");
    store.toggle_status(task.id).expect("toggle");

    let reopened = TaskStore::open(temp.path()).expect("reopen store");
    assert_eq!(reopened.tasks.len(), 1);

    let loaded = &reopened.tasks[0];
    assert_eq!(loaded.id, task.id);
    assert_eq!(loaded.name, "Buy milk");
    assert_eq!(loaded.description, "2% milk");
    assert_eq!(loaded.date, at(10, 8));
    assert_eq!(loaded.status, Status::InProgress);
}

#[test]
fn delete_then_reopen_drops_the_record() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let keep = store
        .add("keep".to_string(), String::new(), at(1, 0))
        .expect("add keep");
    let doomed = store
        .add("drop".to_string(), String::new(), at(2, 0))
        .expect("add drop");

    let removed = store.delete_ids(&[doomed.id]).expect("delete");
    assert_eq!(removed, 1);

    let reopened = TaskStore::open(temp.path()).expect("reopen store");
    assert_eq!(reopened.tasks.len(), 1);
    assert_eq!(reopened.tasks[0].id, keep.id);
    assert!(reopened.get(doomed.id).is_none());
}

#[test]
fn delete_positions_skips_out_of_bounds() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    for name in ["first", "second", "third"] {
        store
            .add(name.to_string(), String::new(), at(1, 0))
            .expect("add task");
    }

    let removed = store.delete_positions(&[2, 0, 99]).expect("delete");
    assert_eq!(removed, 2);

    let names: Vec<&str> = store.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["second"]);
}

#[test]
fn delete_unknown_id_removes_nothing() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("only".to_string(), String::new(), at(1, 0))
        .expect("add task");

    let removed = store.delete_ids(&[Uuid::new_v4()]).expect("delete");
    assert_eq!(removed, 0);
    assert_eq!(store.tasks.len(), 1);
}

#[test]
fn open_on_malformed_file_is_an_error() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("tasks.json"), "{ not json").expect("write garbage");

    let result = TaskStore::open(temp.path());
    assert!(result.is_err());
    let message = format!("{:#}", result.expect_err("open must fail"));
    assert!(message.contains("tasks.json"), "got: {message}");
}

#[test]
fn reload_on_malformed_file_keeps_memory_untouched() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("survivor".to_string(), String::new(), at(1, 0))
        .expect("add task");

    fs::write(store.backing_path(), "]]]").expect("corrupt file");

    assert!(store.reload().is_err());
    assert_eq!(store.tasks.len(), 1);
    assert_eq!(store.tasks[0].name, "survivor");
}

#[test]
fn sorted_order_survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("late".to_string(), String::new(), at(20, 0))
        .expect("add late");
    store
        .add("early".to_string(), String::new(), at(5, 0))
        .expect("add early");

    store.sort_by_date().expect("sort");

    let reopened = TaskStore::open(temp.path()).expect("reopen store");
    let names: Vec<&str> = reopened.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["early", "late"]);
}

#[test]
fn backing_file_uses_the_documented_wire_format() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    store
        .add("wire".to_string(), "check".to_string(), at(10, 8))
        .expect("add task");

    let raw = fs::read_to_string(store.backing_path()).expect("read backing file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

    let entries = value.as_array().expect("top-level array");
    assert_eq!(entries.len(), 1);

    let entry = entries[0].as_object().expect("task object");
    let id = entry["id"].as_str().expect("id string");
    assert!(id.parse::<Uuid>().is_ok(), "id is not a uuid: {id}");
    assert_eq!(entry["name"], "wire");
    assert_eq!(entry["description"], "check");
    assert_eq!(entry["status"], "Not Started");

    let date = entry["date"].as_str().expect("date string");
    assert!(
        DateTime::parse_from_rfc3339(date).is_ok(),
        "date is not ISO-8601: {date}"
    );
}

#[test]
fn resolve_handle_accepts_prefix_and_name() {
    let temp = tempdir().expect("tempdir");
    let mut store = TaskStore::open(temp.path()).expect("open store");

    let task = store
        .add("Unique name".to_string(), String::new(), at(1, 0))
        .expect("add task");
    store
        .add("Twin".to_string(), String::new(), at(1, 0))
        .expect("add twin");
    store
        .add("Twin".to_string(), String::new(), at(1, 0))
        .expect("add twin");

    let prefix: String = task.id.to_string().chars().take(8).collect();
    assert_eq!(store.resolve_handle(&prefix).expect("by prefix"), task.id);
    assert_eq!(
        store.resolve_handle("unique name").expect("by name"),
        task.id
    );

    assert!(store.resolve_handle("Twin").is_err());
    assert!(store.resolve_handle("no such task").is_err());
}
