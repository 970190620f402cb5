//! Open-table registry: one reader pair per table id, closed exactly once.

mod common;

use tempfile::tempdir;

use common::*;
use gdbread::{ReaderConfig, StorageKind, TableRegistry, Value};

fn fixture(value: i32) -> TableFixture {
    TableFixture::new()
        .field(object_id_field("OBJECTID"))
        .field(int32_field("V", false))
        .row(0, RowBlob::new(&[]).i32(value))
}

#[test]
fn open_reuses_the_registered_table() {
    let dir = tempdir().unwrap();
    fixture(10).write(dir.path(), 1);
    let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());

    let first = registry.open(1).unwrap().unwrap() as *const _;
    let second = registry.open(1).unwrap().unwrap() as *const _;

    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(1));
}

#[test]
fn tables_are_independent() {
    let dir = tempdir().unwrap();
    fixture(10).write(dir.path(), 1);
    fixture(20).write(dir.path(), 2);
    let mut registry = TableRegistry::new(
        dir.path(),
        ReaderConfig::new().with_storage(StorageKind::Buffered),
    );

    registry.open(1).unwrap();
    registry.open(2).unwrap();

    let one = registry.get(1).unwrap().get_row(1).unwrap().unwrap();
    let two = registry.get(2).unwrap().get_row(1).unwrap().unwrap();
    assert_eq!(one.values(), &[Value::Int32(10)]);
    assert_eq!(two.values(), &[Value::Int32(20)]);

    let mut ids: Vec<u32> = registry.open_ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, [1, 2]);
}

#[test]
fn close_removes_exactly_once() {
    let dir = tempdir().unwrap();
    fixture(10).write(dir.path(), 1);
    let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());
    registry.open(1).unwrap();

    assert!(registry.close(1));
    assert!(!registry.close(1));
    assert!(registry.get(1).is_none());
    assert!(registry.exists(1));

    // reopening after close yields a fresh reader pair
    assert!(registry.open(1).unwrap().is_some());
}

#[test]
fn close_all_empties_the_registry() {
    let dir = tempdir().unwrap();
    fixture(10).write(dir.path(), 1);
    fixture(20).write(dir.path(), 2);
    let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());
    registry.open(1).unwrap();
    registry.open(2).unwrap();

    registry.close_all();

    assert!(registry.is_empty());
}

#[test]
fn failed_open_leaves_nothing_registered() {
    let dir = tempdir().unwrap();
    fixture(10).write(dir.path(), 1);
    std::fs::remove_file(dir.path().join("a00000001.gdbtablx")).unwrap();
    let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());

    assert!(registry.open(1).is_err());
    assert!(!registry.contains(1));
}
