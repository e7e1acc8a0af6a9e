// ============================================================================
// Export CSV
// ============================================================================
// Sérialise le tableau normalisé pour le téléchargement.
//
// Schéma exact (ordre des colonnes) :
//   Date, Open, High, Low, Close, Volume (Lembar), Value (Rp), Frequency,
//   Market Cap (Rp)
// Une valeur numérique manquante devient un champ vide.
// ============================================================================

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ExportError;
use crate::models::{Interval, Period, Table};

/// En-tête CSV, dans l'ordre exact
pub const CSV_HEADER: [&str; 9] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume (Lembar)",
    "Value (Rp)",
    "Frequency",
    "Market Cap (Rp)",
];

/// Nom du fichier exporté : `{symbole avec '.'→'_'}_{period}_{interval}.csv`
///
/// Exemple : ("MDKA.JK", 1mo, 1d) → "MDKA_JK_1mo_1d.csv"
pub fn export_filename(symbol: &str, period: Period, interval: Interval) -> String {
    format!("{}_{}_{}.csv", symbol.replace('.', "_"), period.label(), interval.label())
}

/// Formate une valeur numérique optionnelle (None → champ vide)
fn number_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Sérialise le tableau en CSV (UTF-8)
pub fn to_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;

    for row in &table.rows {
        wtr.write_record([
            row.date.clone().unwrap_or_default(),
            number_field(row.open),
            number_field(row.high),
            number_field(row.low),
            number_field(row.close),
            number_field(row.volume),
            row.value.to_string(),
            row.frequency.to_string(),
            row.market_cap.to_string(),
        ])?;
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}

/// Répertoire de destination : le dossier de téléchargement de l'utilisateur,
/// sinon le répertoire courant
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Écrit le CSV du tableau dans `dir` et retourne le chemin du fichier
pub fn write_csv(table: &Table, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = to_csv(table)?;
    let path = dir.join(export_filename(&table.symbol, table.period, table.interval));
    debug!(path = %path.display(), bytes = bytes.len(), "Writing CSV export");

    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), rows = table.len(), "CSV exported");
    Ok(path)
}

// ============================================================================
// Tests unitaires
// ============================================================================
