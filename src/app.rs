// ============================================================================
// Structure : App
// ============================================================================
// État de la session : formulaire (symbole, intervalle, période), tableau
// courant, diagnostics et écran affiché.
//
// CONCEPTS RUST :
// 1. State Management : tout l'état de la session dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Frontière d'erreur : apply_outcome() absorbe toutes les erreurs d'une
//    action, la session reste utilisable
//
// Un nouveau fetch remplace le tableau en entier ; aucun tableau partiel
// n'est jamais affiché.
// ============================================================================

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::api::fetch_history;
use crate::error::{ExportError, FetchError, NormalizeError};
use crate::export::write_csv;
use crate::models::{FetchRequest, Interval, Period, RawTable, Table};
use crate::normalize::{normalize_table, Normalized, ShapeAnomaly};

/// Symbole proposé au démarrage
pub const DEFAULT_SYMBOL: &str = "MDKA.JK";

// ============================================================================
// Enums : Screen et FormField
// ============================================================================

/// Vue affichée sous le formulaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Tableau des lignes normalisées
    Table,

    /// Graphique ligne du Close
    Chart,
}

/// Champ du formulaire qui reçoit les touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Symbol,
    Interval,
    Period,
}

impl FormField {
    /// Champ suivant (cycle) : Symbol → Interval → Period → Symbol
    pub fn next(&self) -> FormField {
        match self {
            FormField::Symbol => FormField::Interval,
            FormField::Interval => FormField::Period,
            FormField::Period => FormField::Symbol,
        }
    }

    /// Champ précédent (cycle inverse)
    pub fn previous(&self) -> FormField {
        match self {
            FormField::Symbol => FormField::Period,
            FormField::Interval => FormField::Symbol,
            FormField::Period => FormField::Interval,
        }
    }
}

// ============================================================================
// Status : message de la barre d'état
// ============================================================================

/// Gravité d'un message de statut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Message de la barre d'état, avec détails optionnels
///
/// Pour une erreur, `details` contient la chaîne des causes puis,
/// si un tableau brut existe, le type de chaque colonne brute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
    pub details: Vec<String>,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
            details,
        }
    }
}

// ============================================================================
// ActionOutcome : résultat d'une action "fetch + normalisation"
// ============================================================================

/// Résultat complet d'une action, consommé par `App::apply_outcome`
///
/// `raw` est gardé même en cas d'échec de la normalisation, pour
/// l'introspection des colonnes.
#[derive(Debug)]
pub struct ActionOutcome {
    pub request: FetchRequest,
    pub raw: Option<RawTable>,
    pub result: anyhow::Result<Normalized>,
}

/// Normalise le résultat d'un fetch (partie synchrone de l'action)
pub fn normalize_outcome(request: FetchRequest, fetched: Result<RawTable, FetchError>) -> ActionOutcome {
    match fetched {
        Ok(raw) => {
            let result = normalize_table(&raw, &request)
                .map_err(|e| anyhow::Error::new(e).context(format!("normalizing {}", request.symbol)));
            ActionOutcome {
                request,
                raw: Some(raw),
                result,
            }
        }
        Err(e) => {
            let result = Err(anyhow::Error::new(e).context(format!("fetching {}", request.symbol)));
            ActionOutcome {
                request,
                raw: None,
                result,
            }
        }
    }
}

/// Action complète : fetch puis normalisation
pub async fn fetch_and_normalize(request: FetchRequest) -> ActionOutcome {
    let fetched = fetch_history(&request).await;
    normalize_outcome(request, fetched)
}

// ============================================================================
// App
// ============================================================================

/// État principal de la session
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Texte saisi dans le champ symbole
    pub symbol_input: String,

    pub interval: Interval,

    /// Toujours dans `Period::choices_for(interval)`
    pub period: Period,

    /// Champ du formulaire actif
    pub focus: FormField,

    /// Vue actuellement affichée
    pub screen: Screen,

    /// Tableau courant (None avant le premier fetch réussi ou après un échec)
    pub table: Option<Table>,

    /// Diagnostics non bloquants du dernier fetch
    pub anomalies: Vec<ShapeAnomaly>,

    /// Message de la barre d'état
    pub status: Option<Status>,

    /// Première ligne visible du tableau
    pub scroll: usize,

    /// Two-step quit : première pression d'Échap → confirmation
    pub confirm_quit: bool,
}

impl App {
    /// Crée une session avec les valeurs par défaut (MDKA.JK, 1d, 1mo)
    pub fn new() -> Self {
        Self {
            running: true,
            symbol_input: DEFAULT_SYMBOL.to_string(),
            interval: Interval::default(),
            period: Period::default(),
            focus: FormField::Symbol,
            screen: Screen::Table,
            table: None,
            anomalies: Vec::new(),
            status: None,
            scroll: 0,
            confirm_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Formulaire
    // ========================================================================

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Ajoute un caractère au symbole (seulement si le champ symbole est actif)
    pub fn append_char(&mut self, c: char) {
        if self.focus == FormField::Symbol {
            self.symbol_input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == FormField::Symbol {
            self.symbol_input.pop();
        }
    }

    /// Change l'intervalle et ramène la période dans la liste autorisée
    pub fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
        self.period = self.period.clamp_to(interval);
    }

    /// Valeur suivante du sélecteur actif (intervalle ou période)
    pub fn select_next(&mut self) {
        match self.focus {
            FormField::Interval => self.set_interval(self.interval.next()),
            FormField::Period => self.period = self.period.next_in(self.interval),
            FormField::Symbol => {}
        }
    }

    /// Valeur précédente du sélecteur actif
    pub fn select_previous(&mut self) {
        match self.focus {
            FormField::Interval => self.set_interval(self.interval.previous()),
            FormField::Period => self.period = self.period.previous_in(self.interval),
            FormField::Symbol => {}
        }
    }

    /// Requête correspondant au formulaire
    ///
    /// None si le symbole est vide : un warning est affiché et rien n'est
    /// demandé au fournisseur.
    pub fn pending_request(&mut self) -> Option<FetchRequest> {
        let request = FetchRequest::new(&self.symbol_input, self.interval, self.period);
        if request.symbol.is_empty() {
            self.status = Some(Status::warning("Enter a symbol first"));
            return None;
        }
        Some(request)
    }

    /// Affiche le message de chargement avant un fetch bloquant
    pub fn start_loading(&mut self, request: &FetchRequest) {
        self.status = Some(Status::info(format!(
            "Loading {} ({}, {})...",
            request.symbol, request.period, request.interval
        )));
    }

    // ========================================================================
    // Frontière : application du résultat d'une action
    // ========================================================================

    /// Applique le résultat d'un fetch à la session
    ///
    /// - Succès : le tableau remplace l'ancien en entier
    /// - Résultat vide : warning, aucun tableau
    /// - Autre échec : erreur avec la chaîne des causes et l'introspection
    ///   des colonnes brutes, aucun tableau
    pub fn apply_outcome(&mut self, outcome: ActionOutcome) {
        let ActionOutcome {
            request,
            raw,
            result,
        } = outcome;

        self.scroll = 0;

        match result {
            Ok(Normalized { table, anomalies }) => {
                info!(
                    symbol = %request.symbol,
                    rows = table.len(),
                    anomalies = anomalies.len(),
                    "Table loaded"
                );

                let message = format!(
                    "Loaded {} rows for {} ({}, {})",
                    table.len(),
                    request.symbol,
                    request.period,
                    request.interval
                );
                self.status = Some(if anomalies.is_empty() {
                    Status::info(message)
                } else {
                    Status {
                        level: StatusLevel::Warning,
                        message,
                        details: anomalies.iter().map(|a| a.to_string()).collect(),
                    }
                });

                self.table = Some(table);
                self.anomalies = anomalies;
            }
            Err(err) => {
                self.table = None;
                self.anomalies.clear();
                self.screen = Screen::Table;

                if let Some(NormalizeError::EmptyResult { symbol }) = err.downcast_ref::<NormalizeError>() {
                    warn!(symbol = %symbol, "No data returned");
                    self.status = Some(Status::warning(format!(
                        "No data for {} with period {} and interval {}",
                        symbol, request.period, request.interval
                    )));
                    return;
                }

                error!(symbol = %request.symbol, error = ?err, "Fetch action failed");

                let mut details: Vec<String> = err.chain().skip(1).map(|cause| cause.to_string()).collect();
                if let Some(raw) = &raw {
                    details.push("Raw columns:".to_string());
                    details.extend(raw.describe_columns());
                }
                self.status = Some(Status::error(err.to_string(), details));
            }
        }
    }

    // ========================================================================
    // Vues : tableau et graphique
    // ========================================================================

    pub fn scroll_down(&mut self) {
        let max = self.table.as_ref().map(|t| t.len().saturating_sub(1)).unwrap_or(0);
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Bascule tableau ↔ graphique
    ///
    /// Le graphique exige un tableau ; sans Close numérique, il est affiché
    /// avec un avertissement.
    pub fn toggle_chart(&mut self) {
        match self.screen {
            Screen::Chart => self.screen = Screen::Table,
            Screen::Table => match &self.table {
                None => {
                    self.status = Some(Status::warning("Nothing to chart yet"));
                }
                Some(table) => {
                    if !table.has_numeric_close() {
                        self.status = Some(Status::warning(format!(
                            "Close has no numeric value for {}",
                            table.symbol
                        )));
                    }
                    self.screen = Screen::Chart;
                }
            },
        }
    }

    pub fn is_on_chart(&self) -> bool {
        self.screen == Screen::Chart
    }

    // ========================================================================
    // Export CSV
    // ========================================================================

    /// Exporte le tableau courant en CSV dans `dir`
    pub fn export_to(&mut self, dir: &Path) -> Option<PathBuf> {
        let Some(table) = &self.table else {
            self.status = Some(Status::warning("Nothing to export yet"));
            return None;
        };

        match write_csv(table, dir) {
            Ok(path) => {
                self.status = Some(Status::info(format!("Exported {}", path.display())));
                Some(path)
            }
            Err(e) => {
                self.record_export_error(e);
                None
            }
        }
    }

    fn record_export_error(&mut self, err: ExportError) {
        error!(error = ?err, "CSV export failed");
        let details = std::error::Error::source(&err)
            .map(|source| vec![source.to_string()])
            .unwrap_or_default();
        self.status = Some(Status::error(format!("Export failed: {}", err), details));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawColumn, RawValue};

    fn raw_with_close(closes: &[f64]) -> RawTable {
        let index = (0..closes.len()).map(|i| RawValue::Number(i as f64)).collect();
        RawTable::new(index)
            .with_column(
                "Date",
                RawColumn::Sequence(
                    (0..closes.len())
                        .map(|i| RawValue::Text(format!("2024-01-{:02}", i + 1)))
                        .collect(),
                ),
            )
            .with_column(
                "Close",
                RawColumn::Sequence(closes.iter().map(|c| RawValue::Number(*c)).collect()),
            )
    }

    fn request() -> FetchRequest {
        FetchRequest::new(DEFAULT_SYMBOL, Interval::D1, Period::Mo1)
    }

    #[test]
    fn test_app_defaults() {
        let app = App::new();
        assert!(app.is_running());
        assert_eq!(app.symbol_input, "MDKA.JK");
        assert_eq!(app.interval, Interval::D1);
        assert_eq!(app.period, Period::Mo1);
        assert!(app.table.is_none());
        assert_eq!(app.screen, Screen::Table);
    }

    #[test]
    fn test_switching_interval_clamps_period() {
        let mut app = App::new();
        app.set_interval(Interval::M5);
        app.period = Period::D1;

        app.set_interval(Interval::D1);
        assert_eq!(app.period, Period::W1);
    }

    #[test]
    fn test_selectors_follow_focus() {
        let mut app = App::new();
        app.select_next();
        assert_eq!(app.interval, Interval::D1);

        app.focus_next();
        assert_eq!(app.focus, FormField::Interval);
        app.select_next();
        assert_eq!(app.interval, Interval::D1.next());

        app.focus_next();
        let before = app.period;
        app.select_next();
        assert_ne!(app.period, before);
        app.select_previous();
        assert_eq!(app.period, before);
    }

    #[test]
    fn test_symbol_editing() {
        let mut app = App::new();
        app.symbol_input.clear();
        for c in "bbca.jk".chars() {
            app.append_char(c);
        }
        app.backspace();
        assert_eq!(app.symbol_input, "bbca.j");

        app.focus_next();
        app.append_char('x');
        assert_eq!(app.symbol_input, "bbca.j");
    }

    #[test]
    fn test_empty_symbol_is_not_requested() {
        let mut app = App::new();
        app.symbol_input = "   ".to_string();
        assert!(app.pending_request().is_none());
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Warning));

        app.symbol_input = " bbca.jk ".to_string();
        assert_eq!(app.pending_request().map(|r| r.symbol), Some("BBCA.JK".to_string()));
    }

    #[test]
    fn test_successful_outcome_replaces_table() {
        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0, 2.0, 3.0]))));
        assert_eq!(app.table.as_ref().map(|t| t.len()), Some(3));
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Info));

        app.scroll_down();
        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[4.0]))));
        assert_eq!(app.table.as_ref().map(|t| t.len()), Some(1));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_empty_result_is_a_warning_without_table() {
        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0]))));

        app.apply_outcome(normalize_outcome(request(), Ok(RawTable::new(vec![]))));
        assert!(app.table.is_none());
        let status = app.status.unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert!(status.message.contains("MDKA.JK"));
    }

    #[test]
    fn test_fetch_failure_is_an_error_with_chain() {
        let mut app = App::new();
        let fetched = Err(FetchError::SymbolNotFound {
            symbol: "NOPE.JK".to_string(),
        });
        app.apply_outcome(normalize_outcome(request(), fetched));

        assert!(app.table.is_none());
        assert!(app.is_running());
        let status = app.status.unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.message, "fetching MDKA.JK");
        assert_eq!(status.details, vec!["symbol not found: NOPE.JK".to_string()]);
    }

    #[test]
    fn test_anomalies_are_reported_as_warning() {
        let raw = RawTable::new(vec![RawValue::Number(0.0), RawValue::Number(1.0)])
            .with_column("Date", RawColumn::Scalar(RawValue::from("2024-01-02")))
            .with_column(
                "Close",
                RawColumn::Sequence(vec![RawValue::Number(1.0), RawValue::from(vec![2.0])]),
            );

        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw)));

        assert!(app.table.is_some());
        assert_eq!(app.anomalies.len(), 1);
        let status = app.status.unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert_eq!(status.details.len(), 1);
    }

    #[test]
    fn test_chart_needs_a_table() {
        let mut app = App::new();
        app.toggle_chart();
        assert_eq!(app.screen, Screen::Table);

        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0]))));
        app.toggle_chart();
        assert!(app.is_on_chart());
        app.toggle_chart();
        assert_eq!(app.screen, Screen::Table);
    }

    #[test]
    fn test_chart_warns_without_numeric_close() {
        let raw = RawTable::new(vec![RawValue::Number(0.0)])
            .with_column("Close", RawColumn::Sequence(vec![RawValue::from("n/a")]));

        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw)));
        app.toggle_chart();

        assert!(app.is_on_chart());
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Warning));
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut app = App::new();
        app.scroll_down();
        assert_eq!(app.scroll, 0);

        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0, 2.0]))));
        app.scroll_down();
        app.scroll_down();
        assert_eq!(app.scroll, 1);
        app.scroll_up();
        app.scroll_up();
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_export_without_table_is_a_warning() {
        let mut app = App::new();
        assert!(app.export_to(&std::env::temp_dir()).is_none());
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Warning));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = std::env::temp_dir().join(format!("sahamdata-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0]))));
        let path = app.export_to(&dir).unwrap();
        assert!(path.ends_with("MDKA_JK_1mo_1d.csv"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_export_to_missing_dir_is_an_error() {
        let dir = std::env::temp_dir().join("sahamdata-missing-dir").join("nested");

        let mut app = App::new();
        app.apply_outcome(normalize_outcome(request(), Ok(raw_with_close(&[1.0]))));
        assert!(app.export_to(&dir).is_none());
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Error));
    }
}
