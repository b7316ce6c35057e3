// Property-based tests for the merge engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sheetmerge_dedup::{fingerprint_row, run, MergeConfig};
use sheetmerge_engine::{Table, Value, Workbook};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        (-5i64..5).prop_map(Value::int),
        (-5i64..5).prop_map(|i| Value::float(i as f64)),
        (-20i64..20).prop_map(|i| Value::float(i as f64 / 4.0)),
        prop::sample::select(vec!["", "a", "A", " a", "b"]).prop_map(Value::text),
    ]
}

/// Small value domain so duplicates are common.
fn rows_strategy(width: usize, max_rows: usize) -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(prop::collection::vec(value_strategy(), width), 0..=max_rows)
}

fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
    Table::with_rows(columns.iter().copied(), rows).unwrap()
}

fn single(table: Table) -> Workbook {
    Workbook::from_sheets([("Data", table)]).unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn merging_with_itself_adds_nothing(rows in rows_strategy(3, 20)) {
        let wb = single(table(&["a", "b", "c"], rows));
        let out = run(&MergeConfig::default(), &wb, &wb).unwrap();
        for sheet in &out.report.sheets {
            prop_assert_eq!(sheet.rows_added, 0);
        }
        prop_assert_eq!(out.workbook.sheet("Data"), wb.sheet("Data"));
    }

    #[test]
    fn count_invariants_hold(
        a in rows_strategy(2, 15),
        b in rows_strategy(2, 15),
    ) {
        let secondary_rows = b.len();
        let primary = single(table(&["x", "y"], a));
        let secondary = single(table(&["y", "z"], b));
        let out = run(&MergeConfig::default(), &primary, &secondary).unwrap();

        let s = out.report.sheet("Data").unwrap();
        prop_assert_eq!(s.rows_before + s.rows_added, s.final_row_count);
        prop_assert_eq!(s.rows_added + s.rows_skipped_as_duplicate, secondary_rows);
        prop_assert!(s.duplicates_within_secondary <= s.rows_skipped_as_duplicate);
        prop_assert_eq!(out.workbook.sheet("Data").unwrap().row_count(), s.final_row_count);
    }

    #[test]
    fn primary_rows_keep_order_and_new_rows_follow(
        a in rows_strategy(2, 15),
        b in rows_strategy(2, 15),
    ) {
        let primary = single(table(&["x", "y"], a.clone()));
        let secondary = single(table(&["x", "y"], b.clone()));
        let out = run(&MergeConfig::default(), &primary, &secondary).unwrap();
        let merged = out.workbook.sheet("Data").unwrap().rows();

        prop_assert_eq!(&merged[..a.len()], a.as_slice());

        // Added rows are a subsequence of the secondary, in order
        let mut cursor = b.iter();
        for added in &merged[a.len()..] {
            prop_assert!(cursor.any(|r| r == added));
        }
    }

    #[test]
    fn aligned_schema_is_the_union(
        a in rows_strategy(2, 5),
        b in rows_strategy(2, 5),
    ) {
        let primary = single(table(&["id", "name"], a));
        let secondary = single(table(&["email", "id"], b));
        let out = run(&MergeConfig::default(), &primary, &secondary).unwrap();
        let data = out.workbook.sheet("Data").unwrap();
        prop_assert_eq!(data.columns(), &["id", "name", "email"]);
        prop_assert!(data.rows().iter().all(|r| r.len() == 3));
    }

    #[test]
    fn integer_and_integral_float_fingerprint_alike(
        ints in prop::collection::vec(-1_000_000i64..1_000_000, 1..6),
    ) {
        let columns: Vec<String> = (0..ints.len()).map(|i| format!("c{i}")).collect();
        let as_int: Vec<Value> = ints.iter().map(|&i| Value::int(i)).collect();
        let as_float: Vec<Value> = ints.iter().map(|&i| Value::float(i as f64)).collect();
        prop_assert_eq!(
            fingerprint_row(&as_int, &columns).unwrap(),
            fingerprint_row(&as_float, &columns).unwrap()
        );
    }

    #[test]
    fn parallel_equals_sequential(
        a in rows_strategy(2, 10),
        b in rows_strategy(2, 10),
        c in rows_strategy(2, 10),
    ) {
        let primary = Workbook::from_sheets([
            ("One", table(&["x", "y"], a.clone())),
            ("Two", table(&["x", "y"], b.clone())),
        ]).unwrap();
        let secondary = Workbook::from_sheets([
            ("Two", table(&["x", "y"], c.clone())),
            ("One", table(&["x", "y"], b)),
            ("Three", table(&["x", "y"], c)),
        ]).unwrap();

        let seq = run(&MergeConfig::default(), &primary, &secondary).unwrap();
        let par = run(&MergeConfig { parallel: true, ..MergeConfig::default() }, &primary, &secondary).unwrap();

        prop_assert_eq!(&seq.report.sheets, &par.report.sheets);
        for (name, sheet) in seq.workbook.iter() {
            prop_assert_eq!(par.workbook.sheet(name), Some(sheet));
        }
    }
}
