// ============================================================================
// Structure : Row et Table
// ============================================================================
// Le tableau normalisé, prêt pour l'affichage, le graphique et l'export CSV.
//
// CONCEPT : Immutabilité
// - Une Table est construite une fois par fetch et jamais modifiée
// - Un nouveau fetch produit une nouvelle Table qui remplace l'ancienne
// ============================================================================

use serde::Serialize;

use crate::models::{Interval, Period};

/// Valeur fixe des colonnes non alimentées (Value, Frequency, Market Cap)
pub const PLACEHOLDER: &str = "-";

/// Une ligne du tableau normalisé
///
/// CONCEPT RUST : Option<f64> comme marqueur "manquant"
/// - None : valeur absente ou non convertible (distinct de 0.0)
/// - Some(v) : valeur numérique
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub date: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub value: &'static str,
    pub frequency: &'static str,
    pub market_cap: &'static str,
}

impl Row {
    /// Constructeur : les trois colonnes de remplissage valent toujours "-"
    pub fn new(
        date: Option<String>,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            value: PLACEHOLDER,
            frequency: PLACEHOLDER,
            market_cap: PLACEHOLDER,
        }
    }
}

/// Tableau normalisé pour un symbole
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Symbole demandé (ex: "MDKA.JK")
    pub symbol: String,
    pub interval: Interval,
    pub period: Period,

    /// Une ligne par observation, dans l'ordre du fournisseur
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(symbol: String, interval: Interval, period: Period, rows: Vec<Row>) -> Self {
        Self {
            symbol,
            interval,
            period,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Retourne true si au moins un Close est numérique
    ///
    /// Sans ça, le graphique n'a rien à tracer.
    pub fn has_numeric_close(&self) -> bool {
        self.rows.iter().any(|row| row.close.is_some())
    }

    /// Points (date, close) pour le graphique, en sautant les Close manquants
    ///
    /// CONCEPT RUST : filter_map
    /// - Combine filtre + transformation en un seul passage
    pub fn close_series(&self) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .filter_map(|row| {
                let close = row.close?;
                let date = row.date.clone().unwrap_or_default();
                Some((date, close))
            })
            .collect()
    }

    /// Dernier Close connu
    pub fn last_close(&self) -> Option<f64> {
        self.rows.iter().rev().find_map(|row| row.close)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
