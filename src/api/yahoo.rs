// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Fetch Adapter : (symbol, interval, period) → RawTable
//
// Le client ne normalise rien : les tableaux OHLCV sont gardés en
// serde_json::Value non typé pour que des formes irrégulières (cellules
// imbriquées, scalaire seul) arrivent intactes jusqu'au normaliseur.
//
// CONCEPTS RUST :
// 1. async/await : le fetch est async, la boucle TUI l'exécute avec block_on
// 2. Result<T, FetchError> : erreurs typées avec thiserror
// 3. Serde : désérialisation partielle (enveloppe typée, données libres)
// ============================================================================

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::FetchError;
use crate::models::{FetchRequest, RawColumn, RawTable, RawValue};

/// Hôte de l'API chart v8
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Colonnes de prix, dans l'ordre d'affichage : (nom de colonne, clé JSON)
const QUOTE_COLUMNS: &[(&str, &str)] = &[
    ("Open", "open"),
    ("High", "high"),
    ("Low", "low"),
    ("Close", "close"),
];

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Seule l'enveloppe est typée. Les séries (timestamp, quote) restent des
// Value pour ne rien présumer de leur forme.
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
pub struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    timestamp: Option<Value>,
    #[serde(default)]
    indicators: Indicators,
}

/// Métadonnées du ticker
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    /// Décalage de la place de cotation en secondes (ex: 25200 pour la bourse de Jakarta)
    gmtoffset: Option<i64>,
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Value>,
    adjclose: Option<Vec<Value>>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère l'historique d'un symbole depuis Yahoo Finance
///
/// # Arguments
/// * `request` - symbole, intervalle et période
///
/// # Retourne
/// * `RawTable` - tableau brut, éventuellement vide (0 ligne)
///
/// Pas de retry ni de timeout : un échec est rendu tel quel à l'appelant.
#[instrument(skip(request), fields(symbol = %request.symbol, interval = %request.interval, period = %request.period))]
pub async fn fetch_history(request: &FetchRequest) -> Result<RawTable, FetchError> {
    if request.symbol.is_empty() {
        return Err(FetchError::EmptySymbol);
    }

    let url = build_yahoo_url(request, Utc::now().timestamp());
    debug!(url = %url, "Built Yahoo Finance API URL");

    // User-Agent de navigateur pour éviter le blocage par Yahoo
    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()?;

    debug!("Sending HTTP request to Yahoo Finance");
    let response = client.get(&url).send().await?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // 404 porte quand même un corps JSON avec chart.error ; on le lit d'abord
    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) if status.is_success() => return Err(FetchError::Http(e)),
        Err(_) => {
            error!(status = %status, "Yahoo Finance returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
    };

    let yahoo_response: YahooResponse = serde_json::from_value(body)
        .map_err(|e| FetchError::ResponseFormat(e.to_string()))?;

    let table = parse_yahoo_response(yahoo_response, request)?;

    if !status.is_success() && table.is_empty() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    info!(rows = table.row_count(), columns = ?table.column_names(), "Fetched raw table");
    Ok(table)
}

/// Construit l'URL de l'API chart
///
/// - Période avec range Yahoo → `range=...`
/// - Sinon (1wk) → fenêtre explicite period1/period2 depuis `now`
fn build_yahoo_url(request: &FetchRequest, now: i64) -> String {
    let interval = request.interval.to_yahoo_string();

    match request.period.yahoo_range() {
        Some(range) => format!(
            "{}/{}?interval={}&range={}&includeAdjustedClose=true",
            CHART_URL, request.symbol, interval, range
        ),
        None => {
            let days = request.period.to_days() as i64;
            let period1 = now - days * 24 * 60 * 60;
            format!(
                "{}/{}?interval={}&period1={}&period2={}&includeAdjustedClose=true",
                CHART_URL, request.symbol, interval, period1, now
            )
        }
    }
}

/// Convertit la réponse Yahoo en RawTable
///
/// L'axe du temps devient une colonne Date (ou Datetime en intraday) placée
/// en premier, en heure locale de la place de cotation.
pub fn parse_yahoo_response(
    yahoo_response: YahooResponse,
    request: &FetchRequest,
) -> Result<RawTable, FetchError> {
    let chart = yahoo_response.chart;

    if let Some(err) = chart.error {
        warn!(code = %err.code, "Yahoo Finance returned a chart error");
        return Err(if err.code == "Not Found" {
            FetchError::SymbolNotFound {
                symbol: request.symbol.clone(),
            }
        } else {
            FetchError::Provider {
                code: err.code,
                description: err.description.unwrap_or_default(),
            }
        });
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::ResponseFormat("empty chart result with no error".into()))?;

    let timestamps: Vec<RawValue> = match &result.timestamp {
        Some(Value::Array(items)) => items.iter().map(RawValue::from).collect(),
        Some(other) => vec![RawValue::from(other)],
        None => Vec::new(),
    };
    debug!(
        timestamp_count = timestamps.len(),
        timezone = ?result.meta.exchange_timezone_name,
        "Received timestamps from Yahoo"
    );

    let offset = result
        .meta
        .gmtoffset
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt);

    let date_name = if request.interval.is_intraday() {
        "Datetime"
    } else {
        "Date"
    };
    let dates = timestamps.iter().map(|ts| local_timestamp(ts, offset)).collect();

    let mut table = RawTable::new(timestamps).with_column(date_name, RawColumn::Sequence(dates));

    let quote = result.indicators.quote.into_iter().next().unwrap_or(Value::Null);
    for (name, key) in QUOTE_COLUMNS {
        if let Some(series) = quote.get(*key) {
            table.push_column(name, RawColumn::from_json(series));
        }
    }

    let adjclose = result
        .indicators
        .adjclose
        .and_then(|items| items.into_iter().next())
        .and_then(|item| item.get("adjclose").cloned());
    if let Some(series) = adjclose {
        table.push_column("Adj Close", RawColumn::from_json(&series));
    }

    if let Some(series) = quote.get("volume") {
        table.push_column("Volume", RawColumn::from_json(series));
    }

    Ok(table)
}

/// Timestamp Unix → texte RFC 3339 dans le fuseau de la place de cotation
///
/// Une valeur qui n'est pas un timestamp entier est laissée telle quelle,
/// la coercition de dates s'en chargera.
fn local_timestamp(ts: &RawValue, offset: Option<FixedOffset>) -> RawValue {
    let RawValue::Number(secs) = ts else {
        return ts.clone();
    };

    match DateTime::from_timestamp(*secs as i64, 0) {
        Some(utc) => {
            let offset = offset.unwrap_or_else(|| Utc.fix());
            RawValue::Text(utc.with_timezone(&offset).to_rfc3339())
        }
        None => ts.clone(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
