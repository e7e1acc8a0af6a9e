// ============================================================================
// Tests de propriétés - Normaliseur de colonnes
// ============================================================================
// Propriétés vérifiées avec proptest :
// 1. La longueur réconciliée vaut toujours le nombre de lignes attendu
// 2. Lois de diffusion, troncature et remplissage
// 3. Un bloc 2-D emballé dans la première cellule est reconnu comme tel
// 4. La coercition numérique est idempotente
// 5. Le format des dates suit la granularité de l'intervalle
// 6. Un tableau assemblé a exactement une ligne par ligne brute
// ============================================================================

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use sahamdata::models::{FetchRequest, Interval, Period, RawColumn, RawTable, RawValue};
use sahamdata::normalize::{classify, coerce_dates, coerce_numeric, normalize_table, reconcile, Shape};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_number() -> impl Strategy<Value = RawValue> {
    (-1.0e6..1.0e6_f64).prop_map(|v| RawValue::Number((v * 100.0).round() / 100.0))
}

fn arb_cell() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        4 => arb_number(),
        1 => Just(RawValue::Missing),
        1 => (0u32..10_000).prop_map(|v| RawValue::Text(v.to_string())),
    ]
}

/// Any of the column shapes a provider can hand back
fn arb_column() -> impl Strategy<Value = RawColumn> {
    prop_oneof![
        // 1-D sequence
        prop::collection::vec(arb_cell(), 0..30).prop_map(RawColumn::Sequence),
        // Nested per cell
        prop::collection::vec(prop::collection::vec(arb_number(), 1..3), 0..30)
            .prop_map(|cells| RawColumn::Sequence(cells.into_iter().map(RawValue::Array).collect())),
        // Packed 2-D block in the first cell, any height
        (1usize..30).prop_flat_map(arb_packed),
        // Matrix
        (1usize..4, 1usize..10).prop_flat_map(|(cols, rows)| {
            prop::collection::vec(prop::collection::vec(arb_number(), cols), rows).prop_map(RawColumn::Matrix)
        }),
        // Bare scalar
        arb_cell().prop_map(RawColumn::Scalar),
    ]
}

/// First cell holds an n-row block of one-element rows, the other n-1 cells are noise
fn arb_packed(n: usize) -> impl Strategy<Value = RawColumn> {
    (
        prop::collection::vec(arb_number(), n),
        prop::collection::vec(arb_number(), n.saturating_sub(1)),
    )
        .prop_map(|(values, noise)| packed(values, noise))
}

fn packed(values: Vec<RawValue>, noise: Vec<RawValue>) -> RawColumn {
    let block = values.into_iter().map(|v| RawValue::Array(vec![v])).collect();
    let mut cells = vec![RawValue::Array(block)];
    cells.extend(noise);
    RawColumn::Sequence(cells)
}

fn index(n: usize) -> Vec<RawValue> {
    (0..n).map(|i| RawValue::Number(i as f64)).collect()
}

// ── 1. Length ────────────────────────────────────────────────────────

proptest! {
    /// Whatever the shape, the reconciled column has exactly N values.
    #[test]
    fn reconciled_length_matches_expected(column in arb_column(), n in 1usize..40) {
        let classified = classify(&column, Some(n));
        let reconciled = reconcile(classified.values, n);
        prop_assert_eq!(reconciled.len(), n);
    }
}

// ── 2. Reconciler laws ───────────────────────────────────────────────

proptest! {
    /// A single value fills every position.
    #[test]
    fn broadcast_law(value in arb_number(), n in 1usize..40) {
        let reconciled = reconcile(vec![value.clone()], n);
        prop_assert!(reconciled.iter().all(|v| *v == value));
    }

    /// A longer sequence keeps its first N values, in order.
    #[test]
    fn truncation_law(values in prop::collection::vec(arb_number(), 2..40), cut in 1usize..40) {
        prop_assume!(cut < values.len());
        let reconciled = reconcile(values.clone(), cut);
        prop_assert_eq!(&reconciled[..], &values[..cut]);
    }

    /// A shorter sequence keeps its values and is padded with missing markers.
    #[test]
    fn padding_law(values in prop::collection::vec(arb_number(), 2..20), extra in 1usize..20) {
        let n = values.len() + extra;
        let reconciled = reconcile(values.clone(), n);
        prop_assert_eq!(&reconciled[..values.len()], &values[..]);
        prop_assert!(reconciled[values.len()..].iter().all(RawValue::is_missing));
    }
}

// ── 3. Packed block ──────────────────────────────────────────────────

proptest! {
    /// A block whose height matches the row count is unpacked, noise ignored.
    #[test]
    fn packed_block_is_recognised(
        (values, noise) in (2usize..30).prop_flat_map(|n| {
            (
                prop::collection::vec(arb_number(), n),
                prop::collection::vec(arb_number(), n - 1),
            )
        }),
    ) {
        let n = values.len();
        let classified = classify(&packed(values.clone(), noise), Some(n));
        prop_assert_eq!(classified.shape, Shape::PackedWholeColumn);
        prop_assert_eq!(classified.values, values);
    }

    /// The packed values land in the assembled rows, in order.
    #[test]
    fn packed_close_fills_every_row(
        (values, noise) in (2usize..30).prop_flat_map(|n| {
            (
                prop::collection::vec(arb_number(), n),
                prop::collection::vec(arb_number(), n - 1),
            )
        }),
    ) {
        let n = values.len();
        let expected = coerce_numeric(&values);
        let raw = RawTable::new(index(n))
            .with_column("Date", RawColumn::Sequence(index(n)))
            .with_column("Close", packed(values, noise));
        let request = FetchRequest::new("BBCA.JK", Interval::D1, Period::Mo1);

        let table = normalize_table(&raw, &request).unwrap().table;
        let closes: Vec<Option<f64>> = table.rows.iter().map(|r| r.close).collect();
        prop_assert_eq!(closes, expected);
    }
}

// ── 4. Numeric idempotence ───────────────────────────────────────────

proptest! {
    /// Coercing already-numeric values gives the same values back.
    #[test]
    fn numeric_coercion_is_idempotent(cells in prop::collection::vec(arb_cell(), 0..30)) {
        let once = coerce_numeric(&cells);
        let back: Vec<RawValue> = once.iter().map(|v| RawValue::from(*v)).collect();
        let twice = coerce_numeric(&back);
        prop_assert_eq!(once, twice);
    }
}

// ── 5. Date formatting ───────────────────────────────────────────────

proptest! {
    /// Intraday dates carry minutes, daily dates do not.
    #[test]
    fn date_format_follows_interval(seconds in 0i64..4_000_000_000) {
        let values = vec![RawValue::Number(seconds as f64)];

        let intraday = coerce_dates(&values, Interval::M5.granularity());
        let text = intraday[0].clone().unwrap_or_default();
        prop_assert_eq!(text.len(), 16);
        prop_assert!(NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M").is_ok());

        let daily = coerce_dates(&values, Interval::D1.granularity());
        let text = daily[0].clone().unwrap_or_default();
        prop_assert_eq!(text.len(), 10);
        prop_assert!(NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok());
    }
}

// ── 6. Row assembly ──────────────────────────────────────────────────

proptest! {
    /// One row per raw row, whatever the column shapes.
    #[test]
    fn one_row_per_raw_row(
        n in 1usize..40,
        open in arb_column(),
        close in arb_column(),
        volume in arb_column(),
    ) {
        let raw = RawTable::new(index(n))
            .with_column("Open", open)
            .with_column("Close", close)
            .with_column("Volume", volume);
        let request = FetchRequest::new("BBCA.JK", Interval::D1, Period::Mo1);

        let table = normalize_table(&raw, &request).unwrap().table;
        prop_assert_eq!(table.len(), n);
        prop_assert!(table.rows.iter().all(|r| r.value == "-" && r.frequency == "-" && r.market_cap == "-"));
    }
}

// ── End-to-end scenarios ─────────────────────────────────────────────

#[test]
fn nested_open_column_is_flattened() {
    let raw = RawTable::new(index(3)).with_column(
        "Open",
        RawColumn::Sequence(vec![
            RawValue::from(vec![10.5]),
            RawValue::from(vec![11.0]),
            RawValue::from(vec![9.8]),
        ]),
    );
    let request = FetchRequest::new("MDKA.JK", Interval::D1, Period::Mo1);

    let table = normalize_table(&raw, &request).unwrap().table;
    let opens: Vec<Option<f64>> = table.rows.iter().map(|r| r.open).collect();
    assert_eq!(opens, vec![Some(10.5), Some(11.0), Some(9.8)]);
}

#[test]
fn scalar_volume_is_broadcast() {
    let raw = RawTable::new(index(5)).with_column("Volume", RawColumn::Scalar(RawValue::Number(1_000_000.0)));
    let request = FetchRequest::new("MDKA.JK", Interval::D1, Period::Mo1);

    let table = normalize_table(&raw, &request).unwrap().table;
    let volumes: Vec<Option<f64>> = table.rows.iter().map(|r| r.volume).collect();
    assert_eq!(volumes, vec![Some(1_000_000.0); 5]);
}
