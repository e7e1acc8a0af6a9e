// ============================================================================
// Sélection de la colonne Date
// ============================================================================
// Liste de priorité fixe, le premier nom présent gagne.
// Si aucun n'est présent : première colonne du tableau (défaut positionnel).
// ============================================================================

use crate::models::{RawColumn, RawTable};

/// Noms candidats pour l'axe du temps, par ordre de priorité
pub const DATE_COLUMN_CANDIDATES: &[&str] = &["Datetime", "Date", "timestamp", "Index", "index"];

/// Retourne le nom et la colonne qui portent l'axe du temps
///
/// None seulement si le tableau n'a aucune colonne.
pub fn select_date_column(table: &RawTable) -> Option<(&str, &RawColumn)> {
    DATE_COLUMN_CANDIDATES
        .iter()
        .find_map(|candidate| {
            table
                .columns
                .iter()
                .find(|(name, _)| name == candidate)
        })
        .or_else(|| table.columns.first())
        .map(|(name, column)| (name.as_str(), column))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    fn column() -> RawColumn {
        RawColumn::Sequence(vec![RawValue::Missing])
    }

    #[test]
    fn test_priority_order() {
        let table = RawTable::new(vec![RawValue::Missing])
            .with_column("index", column())
            .with_column("Date", column())
            .with_column("Datetime", column());

        let (name, _) = select_date_column(&table).unwrap();
        assert_eq!(name, "Datetime");
    }

    #[test]
    fn test_lower_priority_match() {
        let table = RawTable::new(vec![RawValue::Missing])
            .with_column("Open", column())
            .with_column("timestamp", column());

        assert_eq!(select_date_column(&table).unwrap().0, "timestamp");
    }

    #[test]
    fn test_falls_back_to_first_column() {
        let table = RawTable::new(vec![RawValue::Missing])
            .with_column("When", column())
            .with_column("Open", column());

        assert_eq!(select_date_column(&table).unwrap().0, "When");
    }

    #[test]
    fn test_no_columns() {
        let table = RawTable::new(vec![RawValue::Missing]);
        assert!(select_date_column(&table).is_none());
    }
}
