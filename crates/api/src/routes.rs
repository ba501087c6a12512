use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stockview_core::{
    normalize_symbol, DataError, DisplayPeriod, PeriodParseError, SymbolError,
};
use stockview_engine::{build_display_table, DisplayTable, EngineError};

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Chart inputs
        .route("/periods", get(list_periods))
        .route("/symbols", get(list_symbols))
        // Indicator tables
        .route("/indicators/{symbol}", get(get_indicators))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Period(#[from] PeriodParseError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Data(#[from] DataError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Period(_)
            | ApiError::Symbol(_)
            | ApiError::Engine(EngineError::Data(DataError::InvalidSymbol(_)))
            | ApiError::Data(DataError::InvalidSymbol(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::EmptyInput { .. })
            | ApiError::Engine(EngineError::Data(DataError::NotFound(_)))
            | ApiError::Data(DataError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(_) | ApiError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Periods & Symbols
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PeriodInfo {
    label: &'static str,
    days: i64,
    default: bool,
}

async fn list_periods(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let periods: Vec<PeriodInfo> = DisplayPeriod::ALL
        .into_iter()
        .map(|p| PeriodInfo {
            label: p.label(),
            days: p.days(),
            default: p == state.default_period,
        })
        .collect();
    Json(periods)
}

async fn list_symbols(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.provider.available_symbols().await?))
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IndicatorQuery {
    period: Option<String>,
}

async fn get_indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<IndicatorQuery>,
) -> Result<Json<DisplayTable>, ApiError> {
    let symbol = normalize_symbol(&symbol)?;
    let period = match query.period {
        Some(p) => p.parse::<DisplayPeriod>()?,
        None => state.default_period,
    };

    let table = build_display_table(
        state.provider.as_ref(),
        &symbol,
        period,
        state.today(),
        state.lookback,
    )
    .await?;
    Ok(Json(table))
}

#[cfg(test)]
mod tests {
    use crate::{build_router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Datelike, Duration, NaiveDate, Weekday};
    use std::sync::Arc;
    use stockview_data::CsvDataProvider;
    use tower::ServiceExt;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    /// Writes ~400 weekday bars ending on `today()`.
    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::from("Date,Open,High,Low,Close,Volume\n");
        let mut date = today() - Duration::days(560);
        let mut i = 0u32;
        while date <= today() {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let close = 2500 + (i * 7) % 40;
                contents.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    date,
                    close - 3,
                    close + 10,
                    close - 12,
                    close,
                    100_000 + i * 13
                ));
                i += 1;
            }
            date += Duration::days(1);
        }
        std::fs::write(dir.path().join("7203.T.csv"), contents).unwrap();
        dir
    }

    fn app(dir: &tempfile::TempDir) -> axum::Router {
        let mut state = AppState::new(Arc::new(CsvDataProvider::new(dir.path())));
        state.fixed_today = Some(today());
        build_router(state)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_periods_mark_default() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/periods").await;
        assert_eq!(status, StatusCode::OK);
        let periods = body.as_array().unwrap();
        assert_eq!(periods.len(), 6);
        assert_eq!(periods[3]["label"], "1y");
        assert_eq!(periods[3]["default"], true);
    }

    #[tokio::test]
    async fn test_symbols() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/symbols").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["7203.T"]));
    }

    #[tokio::test]
    async fn test_indicators_normalizes_symbol_and_trims() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/indicators/7203?period=1mo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "1mo");
        assert_eq!(body["table"]["symbol"], "7203.T");
        assert_eq!(body["window"]["display_start"], "2024-05-29");

        let rows = body["table"]["rows"].as_array().unwrap();
        assert!(!rows.is_empty() && rows.len() <= 23);
        assert_eq!(rows[0]["date"], "2024-05-29");
        assert!(!rows[0]["ma75"].is_null());
        assert!(!rows[0]["ichimoku_span_b"].is_null());
        assert!(!rows[0]["rsi"].is_null());
    }

    #[tokio::test]
    async fn test_bad_period_is_400() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/indicators/7203?period=10y").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("10y"));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_404() {
        let dir = fixture_dir();
        let (status, body) = get(app(&dir), "/api/indicators/AAPL").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains(dir.path().to_str().unwrap()), "{message}");
    }

    #[tokio::test]
    async fn test_symbol_outside_data_dir_is_400() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let fixture = fixture_dir();
        std::fs::copy(fixture.path().join("7203.T.csv"), root.path().join("secret.csv")).unwrap();

        let mut state = AppState::new(Arc::new(CsvDataProvider::new(&data)));
        state.fixed_today = Some(today());
        let router = build_router(state);

        for uri in [
            "/api/indicators/..%2Fsecret?period=1mo",
            "/api/indicators/%2Ftmp%2Fsecret?period=1mo",
        ] {
            let (status, body) = get(router.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["table"].is_null());
        }
    }
}
