// ============================================================================
// Réconciliation de longueur
// ============================================================================
// Force une séquence 1-D à une longueur exacte N :
// - L == N : inchangée
// - L == 1 : la valeur est diffusée sur les N positions
// - L > N : tronquée aux N premiers éléments
// - L < N : complétée à la fin par des marqueurs "manquant"
//
// Garantie : la sortie a toujours exactement N éléments.
// ============================================================================

use crate::models::RawValue;

/// Type qui possède un marqueur "valeur manquante"
///
/// CONCEPT RUST : Trait avec fonction associée
/// - Pas de &self : le marqueur se construit sans instance existante
pub trait MissingMarker: Clone {
    fn missing() -> Self;
}

impl MissingMarker for RawValue {
    fn missing() -> Self {
        RawValue::Missing
    }
}

impl<T: Clone> MissingMarker for Option<T> {
    fn missing() -> Self {
        None
    }
}

/// Ramène `values` à exactement `expected_len` éléments
///
/// Pas d'interpolation : le remplissage est une garantie de longueur,
/// pas une politique de complétion des données.
pub fn reconcile<T: MissingMarker>(mut values: Vec<T>, expected_len: usize) -> Vec<T> {
    match values.len() {
        len if len == expected_len => values,
        1 => vec![values.remove(0); expected_len],
        len if len > expected_len => {
            values.truncate(expected_len);
            values
        }
        _ => {
            values.resize(expected_len, T::missing());
            values
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_length_is_unchanged() {
        assert_eq!(reconcile(vec![Some(1.0), Some(2.0)], 2), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_single_value_is_broadcast() {
        assert_eq!(reconcile(vec![Some(1000000.0)], 5), vec![Some(1000000.0); 5]);
    }

    #[test]
    fn test_longer_is_truncated() {
        assert_eq!(reconcile(vec![Some(1), Some(2), Some(3), Some(4)], 2), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_shorter_is_padded() {
        assert_eq!(
            reconcile(vec![RawValue::Number(1.0), RawValue::Number(2.0)], 4),
            vec![
                RawValue::Number(1.0),
                RawValue::Number(2.0),
                RawValue::Missing,
                RawValue::Missing
            ]
        );
    }

    #[test]
    fn test_empty_is_padded() {
        let values: Vec<Option<f64>> = Vec::new();
        assert_eq!(reconcile(values, 3), vec![None, None, None]);
    }

    #[test]
    fn test_single_value_with_single_row() {
        assert_eq!(reconcile(vec![Some(7)], 1), vec![Some(7)]);
    }
}
