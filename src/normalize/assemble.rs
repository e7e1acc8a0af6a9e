// ============================================================================
// Assemblage des lignes et pipeline complet
// ============================================================================
// RawTable → (classification → réconciliation → coercition) par colonne
//          → zip des colonnes en Row → Table
// ============================================================================

use tracing::{debug, instrument, warn};

use crate::error::NormalizeError;
use crate::models::{FetchRequest, RawColumn, RawTable, RawValue, Row, Table};
use crate::normalize::coerce::{coerce_dates, coerce_numeric};
use crate::normalize::reconcile::reconcile;
use crate::normalize::select::select_date_column;
use crate::normalize::shape::classify;
use crate::normalize::ShapeAnomaly;

/// Nombre de valeurs inspectées pour détecter une imbrication résiduelle
const ANOMALY_SAMPLE: usize = 5;

/// Colonnes normalisées, toutes de la même longueur
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedColumns {
    pub date: Vec<Option<String>>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

/// Résultat du pipeline : le tableau et les diagnostics non bloquants
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: Table,
    pub anomalies: Vec<ShapeAnomaly>,
}

/// Zippe les colonnes normalisées en lignes
///
/// Toutes les colonnes doivent avoir `expected_len` valeurs. Les étapes
/// précédentes le garantissent ; une violation est une erreur interne.
pub fn assemble_rows(
    columns: NormalizedColumns,
    expected_len: usize,
) -> Result<Vec<Row>, NormalizeError> {
    let lengths = [
        ("Date", columns.date.len()),
        ("Open", columns.open.len()),
        ("High", columns.high.len()),
        ("Low", columns.low.len()),
        ("Close", columns.close.len()),
        ("Volume", columns.volume.len()),
    ];
    if let Some(&(column, actual)) = lengths.iter().find(|(_, len)| *len != expected_len) {
        return Err(NormalizeError::ColumnLengthMismatch {
            column,
            expected: expected_len,
            actual,
        });
    }

    let NormalizedColumns {
        date,
        open,
        high,
        low,
        close,
        volume,
    } = columns;

    let rows = date
        .into_iter()
        .zip(open)
        .zip(high)
        .zip(low)
        .zip(close)
        .zip(volume)
        .map(|(((((date, open), high), low), close), volume)| {
            Row::new(date, open, high, low, close, volume)
        })
        .collect();

    Ok(rows)
}

/// Classe, réconcilie et contrôle une colonne brute
///
/// Retourne exactement `expected_len` valeurs brutes ; une imbrication
/// résiduelle dans les premières valeurs est signalée dans `anomalies`,
/// une seule fois par colonne (la colonne Date peut être aussi une colonne
/// de prix et passer deux fois).
pub fn flatten_column(
    name: &str,
    column: &RawColumn,
    len_hint: Option<usize>,
    expected_len: usize,
    anomalies: &mut Vec<ShapeAnomaly>,
) -> Vec<RawValue> {
    let classified = classify(column, len_hint);
    debug!(
        column = name,
        shape = ?classified.shape,
        classified_len = classified.values.len(),
        expected_len,
        "Classified column"
    );

    let values = reconcile(classified.values, expected_len);

    let already_reported = anomalies.iter().any(|a| a.column == name);
    let nested = values
        .iter()
        .take(ANOMALY_SAMPLE)
        .find(|v| v.is_array())
        .filter(|_| !already_reported);
    if let Some(nested) = nested {
        let anomaly = ShapeAnomaly {
            column: name.to_string(),
            shape: classified.shape,
            sample: nested.to_string(),
        };
        warn!(%anomaly, "Nested values left after flattening");
        anomalies.push(anomaly);
    }

    values
}

/// Colonne numérique : absente → entièrement manquante
fn numeric_column(
    raw: &RawTable,
    name: &str,
    expected_len: usize,
    anomalies: &mut Vec<ShapeAnomaly>,
) -> Vec<Option<f64>> {
    match raw.column(name) {
        Some(column) => {
            let values = flatten_column(name, column, Some(expected_len), expected_len, anomalies);
            coerce_numeric(&values)
        }
        None => {
            debug!(column = name, "Column absent from raw table, filling with missing");
            vec![None; expected_len]
        }
    }
}

/// Pipeline complet : RawTable → Table
///
/// Erreur `EmptyResult` si le fournisseur n'a renvoyé aucune ligne.
#[instrument(skip(raw), fields(symbol = %request.symbol, rows = raw.row_count()))]
pub fn normalize_table(raw: &RawTable, request: &FetchRequest) -> Result<Normalized, NormalizeError> {
    let expected_len = raw.row_count();
    if expected_len == 0 {
        warn!("Provider returned zero rows");
        return Err(NormalizeError::EmptyResult {
            symbol: request.symbol.clone(),
        });
    }

    let mut anomalies = Vec::new();

    // La colonne Date passe sans indication de longueur (premier passage)
    let date = match select_date_column(raw) {
        Some((name, column)) => {
            debug!(column = name, "Selected date column");
            let values = flatten_column(name, column, None, expected_len, &mut anomalies);
            coerce_dates(&values, request.interval.granularity())
        }
        None => vec![None; expected_len],
    };

    let columns = NormalizedColumns {
        date,
        open: numeric_column(raw, "Open", expected_len, &mut anomalies),
        high: numeric_column(raw, "High", expected_len, &mut anomalies),
        low: numeric_column(raw, "Low", expected_len, &mut anomalies),
        close: numeric_column(raw, "Close", expected_len, &mut anomalies),
        volume: numeric_column(raw, "Volume", expected_len, &mut anomalies),
    };

    let rows = assemble_rows(columns, expected_len)?;
    debug!(rows = rows.len(), anomalies = anomalies.len(), "Assembled normalized table");

    Ok(Normalized {
        table: Table::new(request.symbol.clone(), request.interval, request.period, rows),
        anomalies,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================
