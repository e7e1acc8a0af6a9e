// ============================================================================
// Coercition numérique et coercition de dates
// ============================================================================
// Transforme une séquence réconciliée de RawValue en valeurs typées.
//
// CONCEPT : Pas d'exception, un marqueur explicite
// - Chaque élément est converti indépendamment
// - Un élément non convertible devient None ("manquant"), la colonne continue
// ============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{Granularity, RawValue};
use crate::normalize::shape::extract_scalar;

/// Formats texte acceptés après RFC 3339, dans l'ordre d'essai
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Au-delà, un nombre est un timestamp en millisecondes plutôt qu'en secondes
const MILLIS_THRESHOLD: f64 = 1e11;

// ============================================================================
// Numérique
// ============================================================================

/// Convertit une valeur en nombre
///
/// - Number → lui-même (NaN → None)
/// - Text → parse f64 après trim
/// - Array → premier élément, puis conversion
pub fn to_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Missing => None,
        RawValue::Number(v) => Some(*v).filter(|v| !v.is_nan()),
        RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        RawValue::Array(_) => to_number(&extract_scalar(value)),
    }
}

/// Convertit une séquence en nombres, élément par élément
pub fn coerce_numeric(values: &[RawValue]) -> Vec<Option<f64>> {
    values.iter().map(to_number).collect()
}

// ============================================================================
// Dates
// ============================================================================

/// Convertit une valeur en date/heure
///
/// - Number → timestamp Unix (secondes, ou millisecondes si très grand)
/// - Text → RFC 3339 (heure locale de l'offset conservée), puis formats usuels
/// - Array → premier élément, puis conversion
pub fn to_datetime(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Missing => None,
        RawValue::Number(v) if v.is_finite() => {
            let parsed = if v.abs() >= MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(v.trunc() as i64)
            } else {
                DateTime::from_timestamp(v.trunc() as i64, 0)
            };
            parsed.map(|dt| dt.naive_utc())
        }
        RawValue::Number(_) => None,
        RawValue::Text(s) => parse_datetime_text(s.trim()),
        RawValue::Array(_) => to_datetime(&extract_scalar(value)),
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Convertit une séquence en dates formatées selon la granularité
///
/// - Intraday → "YYYY-MM-DD HH:MM"
/// - Journalier ou plus → "YYYY-MM-DD"
///
/// Repli : si aucun élément non manquant ne se parse, chaque élément est
/// rendu par sa représentation textuelle (les manquants restent None).
pub fn coerce_dates(values: &[RawValue], granularity: Granularity) -> Vec<Option<String>> {
    let parsed: Vec<Option<NaiveDateTime>> = values.iter().map(to_datetime).collect();

    let present = values
        .iter()
        .filter(|value| !extract_scalar(value).is_missing())
        .count();
    let succeeded = parsed.iter().filter(|dt| dt.is_some()).count();

    if present > 0 && succeeded == 0 {
        return values
            .iter()
            .map(|value| match extract_scalar(value) {
                RawValue::Missing => None,
                _ => Some(value.to_string()),
            })
            .collect();
    }

    let format = granularity.date_format();
    parsed
        .into_iter()
        .map(|dt| dt.map(|dt| dt.format(format).to_string()))
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
