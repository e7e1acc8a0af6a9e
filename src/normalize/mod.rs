// ============================================================================
// Module : normalize
// ============================================================================
// Normaliseur de colonnes : réduit chaque colonne brute, quelle que soit sa
// forme, à une séquence 1-D de longueur connue, puis la convertit en valeurs
// typées et assemble le tableau final.
//
// Étapes, dans l'ordre :
// 1. select   : choisir la colonne qui porte l'axe du temps
// 2. shape    : classer la forme de chaque colonne et l'aplatir
// 3. reconcile: forcer la longueur exacte (diffusion, troncature, remplissage)
// 4. coerce   : nombres ou dates, un élément invalide devient "manquant"
// 5. assemble : zipper les colonnes en lignes
// ============================================================================

pub mod assemble;
pub mod coerce;
pub mod reconcile;
pub mod select;
pub mod shape;

use std::fmt;

pub use assemble::{assemble_rows, normalize_table, Normalized, NormalizedColumns};
pub use coerce::{coerce_dates, coerce_numeric};
pub use reconcile::{reconcile, MissingMarker};
pub use select::{select_date_column, DATE_COLUMN_CANDIDATES};
pub use shape::{classify, extract_scalar, Classified, Shape};

/// Diagnostic non bloquant : une colonne contient encore des structures
/// imbriquées après aplatissement
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAnomaly {
    /// Nom de la colonne brute
    pub column: String,
    /// Forme détectée par le classifieur
    pub shape: Shape,
    /// Première valeur imbriquée trouvée dans l'échantillon
    pub sample: String,
}

impl fmt::Display for ShapeAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column {} still holds nested values after flattening ({:?}): {}",
            self.column, self.shape, self.sample
        )
    }
}
