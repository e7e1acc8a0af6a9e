// ============================================================================
// Paramètres de requête : Interval, Period, Granularity
// ============================================================================
// Décrit ce que l'utilisateur demande au fournisseur de données :
// - Interval : écart entre deux observations (1m, 5m, ..., 1mo)
// - Period : profondeur d'historique (1d, 5d, ..., max)
// - Granularity : intraday ou journalier, décide du format de la colonne Date
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Intervalle entre deux observations
///
/// CONCEPT : Ensemble fermé
/// - Yahoo n'accepte qu'une liste fixe d'intervalles
/// - Un enum rend les valeurs invalides impossibles à construire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    M1,
    /// 5 minutes
    M5,
    /// 15 minutes
    M15,
    /// 30 minutes
    M30,
    /// 60 minutes
    M60,
    /// 1 jour
    D1,
    /// 1 semaine
    W1,
    /// 1 mois
    Mo1,
}

/// Granularité d'un intervalle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Plusieurs observations par jour (niveau minute)
    Intraday,
    /// Une observation par jour ou moins
    Daily,
}

impl Granularity {
    /// Format chrono utilisé pour rendre la colonne Date
    pub fn date_format(&self) -> &'static str {
        match self {
            Granularity::Intraday => "%Y-%m-%d %H:%M",
            Granularity::Daily => "%Y-%m-%d",
        }
    }
}

impl Interval {
    /// Convertit l'intervalle en paramètre `interval` de l'API Yahoo
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::M60 => "60m",
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
            Interval::Mo1 => "1mo",
        }
    }

    /// Label court pour l'affichage et les noms de fichiers
    pub fn label(&self) -> &'static str {
        self.to_yahoo_string()
    }

    /// Retourne true si l'intervalle est intraday (niveau minute)
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Interval::M1 | Interval::M5 | Interval::M15 | Interval::M30 | Interval::M60
        )
    }

    pub fn granularity(&self) -> Granularity {
        if self.is_intraday() {
            Granularity::Intraday
        } else {
            Granularity::Daily
        }
    }

    /// Retourne tous les intervalles disponibles (pour le sélecteur)
    pub fn all() -> Vec<Interval> {
        vec![
            Interval::M1,
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::M60,
            Interval::D1,
            Interval::W1,
            Interval::Mo1,
        ]
    }

    /// Retourne l'intervalle suivant (cycle)
    pub fn next(&self) -> Interval {
        match self {
            Interval::M1 => Interval::M5,
            Interval::M5 => Interval::M15,
            Interval::M15 => Interval::M30,
            Interval::M30 => Interval::M60,
            Interval::M60 => Interval::D1,
            Interval::D1 => Interval::W1,
            Interval::W1 => Interval::Mo1,
            Interval::Mo1 => Interval::M1, // Boucle
        }
    }

    /// Retourne l'intervalle précédent (cycle)
    pub fn previous(&self) -> Interval {
        match self {
            Interval::M1 => Interval::Mo1, // Boucle
            Interval::M5 => Interval::M1,
            Interval::M15 => Interval::M5,
            Interval::M30 => Interval::M15,
            Interval::M60 => Interval::M30,
            Interval::D1 => Interval::M60,
            Interval::W1 => Interval::D1,
            Interval::Mo1 => Interval::W1,
        }
    }
}

impl Default for Interval {
    /// Intervalle par défaut : journalier
    fn default() -> Self {
        Interval::D1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Profondeur d'historique demandée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    D1,
    D5,
    W1,
    Mo1,
    Mo3,
    Mo6,
    Y1,
    Y5,
    Max,
}

/// Périodes proposées quand l'intervalle est intraday
const INTRADAY_PERIODS: &[Period] = &[
    Period::D1,
    Period::D5,
    Period::Mo1,
    Period::Mo3,
    Period::Mo6,
    Period::Y1,
    Period::Y5,
    Period::Max,
];

/// Périodes proposées quand l'intervalle est journalier ou plus large
const DAILY_PERIODS: &[Period] = &[
    Period::W1,
    Period::Mo1,
    Period::Mo3,
    Period::Mo6,
    Period::Y1,
    Period::Y5,
    Period::Max,
];

impl Period {
    pub fn label(&self) -> &'static str {
        match self {
            Period::D1 => "1d",
            Period::D5 => "5d",
            Period::W1 => "1wk",
            Period::Mo1 => "1mo",
            Period::Mo3 => "3mo",
            Period::Mo6 => "6mo",
            Period::Y1 => "1y",
            Period::Y5 => "5y",
            Period::Max => "max",
        }
    }

    /// Paramètre `range` de l'API chart
    ///
    /// Yahoo ne connaît pas de range "1wk" : None signifie qu'il faut
    /// passer par period1/period2 (voir `to_days`).
    pub fn yahoo_range(&self) -> Option<&'static str> {
        match self {
            Period::W1 => None,
            other => Some(other.label()),
        }
    }

    /// Nombre de jours couverts, pour les périodes sans range Yahoo
    pub fn to_days(&self) -> u32 {
        match self {
            Period::D1 => 1,
            Period::D5 => 5,
            Period::W1 => 7,
            Period::Mo1 => 30,
            Period::Mo3 => 90,
            Period::Mo6 => 180,
            Period::Y1 => 365,
            Period::Y5 => 1825,
            Period::Max => 36500,
        }
    }

    /// Périodes proposées pour un intervalle donné
    pub fn choices_for(interval: Interval) -> &'static [Period] {
        if interval.is_intraday() {
            INTRADAY_PERIODS
        } else {
            DAILY_PERIODS
        }
    }

    /// Ramène la période dans la liste autorisée pour l'intervalle
    ///
    /// Garde la période si elle est proposée, sinon prend la première choix.
    pub fn clamp_to(self, interval: Interval) -> Period {
        let choices = Period::choices_for(interval);
        if choices.contains(&self) {
            self
        } else {
            choices[0]
        }
    }

    /// Période suivante dans la liste de l'intervalle (cycle)
    pub fn next_in(self, interval: Interval) -> Period {
        let choices = Period::choices_for(interval);
        match choices.iter().position(|p| *p == self) {
            Some(i) => choices[(i + 1) % choices.len()],
            None => choices[0],
        }
    }

    /// Période précédente dans la liste de l'intervalle (cycle)
    pub fn previous_in(self, interval: Interval) -> Period {
        let choices = Period::choices_for(interval);
        match choices.iter().position(|p| *p == self) {
            Some(i) => choices[(i + choices.len() - 1) % choices.len()],
            None => choices[0],
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Mo1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Une demande de données historiques : (symbol, interval, period)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Symbole Yahoo (ex: "MDKA.JK", "BBCA.JK", "AAPL")
    pub symbol: String,
    pub interval: Interval,
    pub period: Period,
}

impl FetchRequest {
    /// Crée une requête, la période étant ramenée dans la liste de l'intervalle
    pub fn new(symbol: &str, interval: Interval, period: Period) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            interval,
            period: period.clamp_to(interval),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
