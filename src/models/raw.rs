// ============================================================================
// Données brutes : RawValue, RawColumn, RawTable
// ============================================================================
// Ce que le fournisseur renvoie, avant toute normalisation.
//
// CONCEPT RUST : Tagged union (enum avec données)
// - Une colonne peut arriver sous plusieurs formes (1-D, cellules imbriquées,
//   bloc 2-D, scalaire seul)
// - Plutôt que d'inspecter des types au runtime partout, on encode les formes
//   dans un enum et le classifieur (normalize::shape) décide une seule fois
// ============================================================================

use std::fmt;

use serde_json::Value;

/// Une valeur brute, de type inconnu à l'avance
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Valeur absente (null JSON, NaN, cellule vide)
    Missing,
    /// Nombre
    Number(f64),
    /// Texte (date ISO, nombre sous forme de texte, ...)
    Text(String),
    /// Structure imbriquée (liste, tableau, série)
    Array(Vec<RawValue>),
}

impl RawValue {
    pub fn is_array(&self) -> bool {
        matches!(self, RawValue::Array(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    /// Retourne true si la valeur est un tableau de tableaux (2-D)
    pub fn is_two_dimensional(&self) -> bool {
        match self {
            RawValue::Array(items) => !items.is_empty() && items.iter().all(RawValue::is_array),
            _ => false,
        }
    }

    /// Nom court du type, pour l'introspection des colonnes en cas d'erreur
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Missing => "missing",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "text",
            RawValue::Array(_) => "array",
        }
    }
}

impl From<&Value> for RawValue {
    /// Convertit une valeur JSON en RawValue
    ///
    /// CONCEPT : Conversion totale
    /// - Aucun cas ne peut échouer : un objet JSON devient son texte
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawValue::Missing,
            Value::Bool(b) => RawValue::Number(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Missing),
            Value::String(s) => RawValue::Text(s.clone()),
            Value::Array(items) => RawValue::Array(items.iter().map(RawValue::from).collect()),
            Value::Object(_) => RawValue::Text(value.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map(RawValue::Number).unwrap_or(RawValue::Missing)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        RawValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for RawValue {
    /// Représentation textuelle, utilisée par le repli de la colonne Date
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Missing => f.write_str("NaN"),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Une colonne brute
///
/// CONCEPT : Formes possibles d'une colonne
/// - Scalar : une seule valeur pour toute la colonne
/// - Sequence : une valeur par ligne ; chaque cellule peut elle-même être
///   imbriquée (cellules-tableaux, bloc 2-D emballé dans la 1ère cellule)
/// - Matrix : un vrai bloc 2-D, ligne par ligne
#[derive(Debug, Clone, PartialEq)]
pub enum RawColumn {
    Scalar(RawValue),
    Sequence(Vec<RawValue>),
    Matrix(Vec<Vec<RawValue>>),
}

impl RawColumn {
    /// Construit une colonne depuis une valeur JSON
    ///
    /// - Tableau → Sequence (les cellules gardent leur imbrication)
    /// - Tout le reste → Scalar
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => RawColumn::Sequence(items.iter().map(RawValue::from).collect()),
            other => RawColumn::Scalar(RawValue::from(other)),
        }
    }

    /// Nombre de cellules au premier niveau
    pub fn len(&self) -> usize {
        match self {
            RawColumn::Scalar(_) => 1,
            RawColumn::Sequence(cells) => cells.len(),
            RawColumn::Matrix(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Description du type de la colonne, ex: "sequence[3] of array"
    pub fn describe(&self) -> String {
        match self {
            RawColumn::Scalar(value) => format!("scalar {}", value.kind()),
            RawColumn::Sequence(cells) => match cells.first() {
                Some(first) => format!("sequence[{}] of {}", cells.len(), first.kind()),
                None => "sequence[0]".to_string(),
            },
            RawColumn::Matrix(rows) => {
                let width = rows.first().map(Vec::len).unwrap_or(0);
                format!("matrix[{}x{}]", rows.len(), width)
            }
        }
    }
}

/// Tableau brut renvoyé par le Fetch Adapter
///
/// CONCEPT : Colonnes ordonnées
/// - Vec<(String, RawColumn)> plutôt que HashMap : l'ordre compte
///   (la sélection de la colonne Date retombe sur la première colonne)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Index de lignes ; sa longueur est le nombre de lignes du tableau
    pub index: Vec<RawValue>,

    /// Colonnes nommées, dans l'ordre du fournisseur
    pub columns: Vec<(String, RawColumn)>,
}

impl RawTable {
    pub fn new(index: Vec<RawValue>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Ajoute une colonne à la fin (remplace une colonne de même nom)
    pub fn push_column(&mut self, name: &str, column: RawColumn) {
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| n == name) {
            slot.1 = column;
        } else {
            self.columns.push((name.to_string(), column));
        }
    }

    /// Builder : ajoute une colonne et retourne self
    pub fn with_column(mut self, name: &str, column: RawColumn) -> Self {
        self.push_column(name, column);
        self
    }

    /// Nombre de lignes (longueur de l'index)
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Introspection par colonne pour les diagnostics d'erreur
    pub fn describe_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|(name, column)| format!("{}: {}", name, column.describe()))
            .collect()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
