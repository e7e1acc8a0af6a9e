// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application :
// - raw : ce que renvoie le fournisseur, forme inconnue
// - market : paramètres de requête (intervalle, période)
// - table : tableau normalisé, prêt pour l'affichage
// ============================================================================

pub mod market; // Interval, Period, Granularity, FetchRequest
pub mod raw;    // RawValue, RawColumn, RawTable
pub mod table;  // Row, Table

// Re-export des structures principales pour simplifier les imports
// On peut faire : use sahamdata::models::Table;
pub use market::{FetchRequest, Granularity, Interval, Period};
pub use raw::{RawColumn, RawTable, RawValue};
pub use table::{Row, Table, PLACEHOLDER};
