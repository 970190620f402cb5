//! Scan invariants over randomly populated tables: ascending feature ids,
//! full-width rows, no more rows than the header declares, and agreement
//! between scanning and point lookups.

mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;
use tempfile::tempdir;

use common::*;
use gdbread::{ReaderConfig, Table, Value};

fn populated(ids: &BTreeSet<u64>, extra_rows: u64) -> TableFixture {
    let last = ids.iter().next_back().map_or(0, |id| id + 1);
    let mut fixture = TableFixture::new()
        .field(object_id_field("OBJECTID"))
        .field(int32_field("ID", false))
        .field(string_field("TAG", true))
        .row_count(last + extra_rows);

    for &id in ids {
        let blob = if id % 3 == 0 {
            RowBlob::new(&[1]).i32(id as i32)
        } else {
            RowBlob::new(&[0]).i32(id as i32).string("x")
        };
        fixture = fixture.row(id, blob);
    }
    fixture
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn scan_is_ascending_and_complete(
        ids in prop::collection::btree_set(0u64..5000, 1..60),
        extra_rows in 0u64..3,
    ) {
        let dir = tempdir().unwrap();
        populated(&ids, extra_rows).write(dir.path(), 1);
        let table = Table::open(dir.path(), 1, ReaderConfig::default()).unwrap();
        let width = table.fields().unwrap().len();

        let mut fids = Vec::new();
        table.scan(|row| {
            assert_eq!(row.len(), width);
            assert_eq!(row.value(0), Some(&Value::Int32(row.feature_id() as i32 - 1)));
            fids.push(row.feature_id());
            Ok(())
        }).unwrap();

        prop_assert!(fids.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(fids.len() as u64 <= table.feature_count().unwrap());
        let expected: Vec<u64> = ids.iter().map(|id| id + 1).collect();
        prop_assert_eq!(&fids, &expected);
    }

    #[test]
    fn lookups_agree_with_scan(
        ids in prop::collection::btree_set(0u64..3000, 1..40),
        probes in prop::collection::vec(0u64..3100, 1..20),
    ) {
        let dir = tempdir().unwrap();
        populated(&ids, 0).write(dir.path(), 1);
        let table = Table::open(dir.path(), 1, ReaderConfig::default()).unwrap();

        for fid in probes {
            let row = table.get_row(fid).unwrap();
            let present = fid > 0 && ids.contains(&(fid - 1));
            prop_assert_eq!(row.is_some(), present);
        }
    }
}
