// ============================================================================
// Classifieur de forme
// ============================================================================
// Décide quelle forme a une colonne brute et la réduit en une séquence 1-D
// (de longueur encore inconnue, la réconciliation vient après).
//
// Règles, dans l'ordre de priorité :
// 1. Sequence dont chaque cellule non manquante est un tableau → une valeur
//    par cellule, le premier élément gagne (un null reste manquant)
// 2. Sequence dont la 1ère cellule est un bloc 2-D de hauteur = nombre de
//    lignes → ce bloc est la colonne entière (le reste est ignoré)
// 3. Matrix → squeeze si une dimension vaut 1, sinon aplatie ligne par ligne
// 4. Sequence → telle quelle
// 5. Scalar ou structure vide → séquence à un élément
//
// Aucune de ces fonctions ne panique : une extraction impossible donne Missing.
// ============================================================================

use crate::models::{RawColumn, RawValue};

/// Forme détectée pour une colonne brute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Une séquence de tableaux, un par cellule
    NestedPerCell,
    /// Un bloc 2-D emballé dans la première cellule
    PackedWholeColumn,
    /// Un vrai bloc 2-D
    Matrix,
    /// Déjà 1-D
    Flat,
    /// Une valeur unique (ou une structure vide)
    Scalar,
}

/// Résultat de la classification : la forme et la séquence 1-D obtenue
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub shape: Shape,
    pub values: Vec<RawValue>,
}

/// Classe une colonne brute et la réduit en séquence 1-D
///
/// `expected_len` est le nombre de lignes du tableau ; il peut être absent
/// (premier passage de la colonne Date), on prend alors la longueur de la
/// séquence elle-même pour reconnaître un bloc emballé.
pub fn classify(column: &RawColumn, expected_len: Option<usize>) -> Classified {
    match column {
        RawColumn::Sequence(cells) if cells.is_empty() => scalar(RawValue::Missing),

        // Règle 1 : chaque cellule non manquante est un tableau
        RawColumn::Sequence(cells) if is_nested_per_cell(cells) => Classified {
            shape: Shape::NestedPerCell,
            values: cells.iter().map(extract_scalar).collect(),
        },

        RawColumn::Sequence(cells) => {
            let rows = expected_len.unwrap_or(cells.len());
            match packed_block(&cells[0], rows) {
                // Règle 2 : bloc 2-D emballé dans la première cellule
                Some(block) => Classified {
                    shape: Shape::PackedWholeColumn,
                    values: squeeze_matrix(block),
                },
                // Règle 4 : déjà 1-D
                None => Classified {
                    shape: Shape::Flat,
                    values: cells.clone(),
                },
            }
        }

        // Règle 3 : vrai bloc 2-D
        RawColumn::Matrix(rows) => {
            let values = squeeze_matrix(rows.clone());
            if values.is_empty() {
                scalar(RawValue::Missing)
            } else {
                Classified {
                    shape: Shape::Matrix,
                    values,
                }
            }
        }

        // Règle 5 : scalaire
        RawColumn::Scalar(value) => scalar(value.clone()),
    }
}

/// Au moins un tableau, et aucune cellule présente qui n'en soit pas un
fn is_nested_per_cell(cells: &[RawValue]) -> bool {
    cells.iter().any(RawValue::is_array)
        && cells.iter().all(|cell| cell.is_array() || cell.is_missing())
}

fn scalar(value: RawValue) -> Classified {
    Classified {
        shape: Shape::Scalar,
        values: vec![value],
    }
}

/// Reconnaît un bloc 2-D dont la hauteur vaut `rows`
fn packed_block(cell: &RawValue, rows: usize) -> Option<Vec<Vec<RawValue>>> {
    match cell {
        RawValue::Array(items) if cell.is_two_dimensional() && items.len() == rows => Some(
            items
                .iter()
                .map(|item| match item {
                    RawValue::Array(inner) => inner.clone(),
                    other => vec![other.clone()],
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Réduit un bloc 2-D en séquence 1-D
///
/// - une seule colonne (N×1) → la colonne
/// - une seule ligne (1×M) → la ligne
/// - sinon → aplati ligne par ligne (row-major)
///
/// Chaque valeur perd ensuite ses dimensions singleton ([[x]] → x).
fn squeeze_matrix(rows: Vec<Vec<RawValue>>) -> Vec<RawValue> {
    let values: Vec<RawValue> = if rows.len() == 1 {
        rows.into_iter().flatten().collect()
    } else if rows.iter().all(|row| row.len() == 1) {
        rows.into_iter().filter_map(|row| row.into_iter().next()).collect()
    } else {
        rows.into_iter().flatten().collect()
    };

    values.into_iter().map(squeeze).collect()
}

/// Retire les dimensions singleton : [[x]] → x, [] → Missing
fn squeeze(value: RawValue) -> RawValue {
    let mut current = value;
    loop {
        match current {
            RawValue::Array(mut items) if items.len() == 1 => {
                current = items.remove(0);
            }
            RawValue::Array(items) if items.is_empty() => return RawValue::Missing,
            other => return other,
        }
    }
}

/// Extrait une valeur scalaire d'une cellule
///
/// CONCEPT : Premier élément gagne
/// - Une structure imbriquée est aplatie et seul son premier élément est
///   gardé ; les autres sous-valeurs sont perdues
/// - Une valeur non imbriquée est retournée inchangée
/// - Une structure vide donne Missing
pub fn extract_scalar(value: &RawValue) -> RawValue {
    match value {
        RawValue::Array(items) => first_leaf(items).unwrap_or(RawValue::Missing),
        other => other.clone(),
    }
}

/// Premier élément non-tableau dans l'ordre d'aplatissement
fn first_leaf(items: &[RawValue]) -> Option<RawValue> {
    items.iter().find_map(|item| match item {
        RawValue::Array(inner) => first_leaf(inner),
        leaf => Some(leaf.clone()),
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> RawValue {
        RawValue::Number(v)
    }

    #[test]
    fn test_nested_per_cell_first_element_wins() {
        let column = RawColumn::Sequence(vec![
            RawValue::from(vec![10.5]),
            RawValue::from(vec![11.0, 99.0]),
            RawValue::from(vec![vec![9.8]]),
        ]);

        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::NestedPerCell);
        assert_eq!(classified.values, vec![n(10.5), n(11.0), n(9.8)]);
    }

    #[test]
    fn test_nested_with_null_cell() {
        let column = RawColumn::Sequence(vec![
            RawValue::from(vec![1.0]),
            RawValue::from(vec![2.0]),
            RawValue::Missing,
        ]);

        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::NestedPerCell);
        assert_eq!(classified.values, vec![n(1.0), n(2.0), RawValue::Missing]);
    }

    #[test]
    fn test_all_missing_sequence_is_flat() {
        let column = RawColumn::Sequence(vec![RawValue::Missing, RawValue::Missing]);
        assert_eq!(classify(&column, Some(2)).shape, Shape::Flat);
    }

    #[test]
    fn test_nested_empty_cell_is_missing() {
        let column = RawColumn::Sequence(vec![RawValue::Array(vec![]), RawValue::from(vec![2.0])]);
        let classified = classify(&column, Some(2));
        assert_eq!(classified.values, vec![RawValue::Missing, n(2.0)]);
    }

    #[test]
    fn test_packed_whole_column() {
        // Bloc 3x1 dans la première cellule, le reste de la colonne est du bruit
        let column = RawColumn::Sequence(vec![
            RawValue::from(vec![vec![1.0], vec![2.0], vec![3.0]]),
            n(0.0),
            n(0.0),
        ]);

        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::PackedWholeColumn);
        assert_eq!(classified.values, vec![n(1.0), n(2.0), n(3.0)]);
    }

    #[test]
    fn test_packed_requires_matching_height() {
        let column = RawColumn::Sequence(vec![
            RawValue::from(vec![vec![1.0], vec![2.0]]),
            n(5.0),
            n(6.0),
        ]);

        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::Flat);
        assert_eq!(classified.values.len(), 3);
    }

    #[test]
    fn test_packed_without_expected_len_uses_column_length() {
        let column = RawColumn::Sequence(vec![
            RawValue::from(vec![vec!["2024-01-02"], vec!["2024-01-03"]]),
            RawValue::from("x"),
        ]);

        let classified = classify(&column, None);
        assert_eq!(classified.shape, Shape::PackedWholeColumn);
        assert_eq!(
            classified.values,
            vec![RawValue::from("2024-01-02"), RawValue::from("2024-01-03")]
        );
    }

    #[test]
    fn test_matrix_single_column_is_squeezed() {
        let column = RawColumn::Matrix(vec![vec![n(1.0)], vec![n(2.0)], vec![n(3.0)]]);
        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::Matrix);
        assert_eq!(classified.values, vec![n(1.0), n(2.0), n(3.0)]);
    }

    #[test]
    fn test_matrix_single_row_is_squeezed() {
        let column = RawColumn::Matrix(vec![vec![n(1.0), n(2.0)]]);
        assert_eq!(classify(&column, Some(2)).values, vec![n(1.0), n(2.0)]);
    }

    #[test]
    fn test_matrix_is_flattened_row_major() {
        let column = RawColumn::Matrix(vec![vec![n(1.0), n(2.0)], vec![n(3.0), n(4.0)]]);
        assert_eq!(
            classify(&column, Some(4)).values,
            vec![n(1.0), n(2.0), n(3.0), n(4.0)]
        );
    }

    #[test]
    fn test_flat_sequence_is_kept() {
        let column = RawColumn::Sequence(vec![n(1.0), RawValue::from("2"), RawValue::Missing]);
        let classified = classify(&column, Some(3));
        assert_eq!(classified.shape, Shape::Flat);
        assert_eq!(classified.values, vec![n(1.0), RawValue::from("2"), RawValue::Missing]);
    }

    #[test]
    fn test_scalar_and_degenerate() {
        let scalar = classify(&RawColumn::Scalar(n(1000000.0)), Some(5));
        assert_eq!(scalar.shape, Shape::Scalar);
        assert_eq!(scalar.values, vec![n(1000000.0)]);

        let empty = classify(&RawColumn::Sequence(vec![]), Some(5));
        assert_eq!(empty.shape, Shape::Scalar);
        assert_eq!(empty.values, vec![RawValue::Missing]);

        let empty_matrix = classify(&RawColumn::Matrix(vec![]), Some(5));
        assert_eq!(empty_matrix.values, vec![RawValue::Missing]);
    }

    #[test]
    fn test_extract_scalar() {
        assert_eq!(extract_scalar(&n(3.0)), n(3.0));
        assert_eq!(extract_scalar(&RawValue::from(vec![vec![7.0, 8.0]])), n(7.0));
        assert_eq!(extract_scalar(&RawValue::Array(vec![])), RawValue::Missing);
        assert_eq!(
            extract_scalar(&RawValue::Array(vec![RawValue::Array(vec![]), n(4.0)])),
            n(4.0)
        );
    }
}
