//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::aggregate::CompositeView;
use crate::calendar::{date_view, month_view, year_view};
use crate::domain::{DayTimes, PlaceId};
use crate::error::PrayerError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1", get(index))
        .route("/api/v1/", get(index))
        .route("/api/v1/:place_id", get(raw_data))
        .route("/api/v1/:place_id/", get(raw_data))
        .route("/api/v1/:place_id/prayer-times", get(prayer_times))
        .route("/api/v1/:place_id/calendar", get(calendar))
        .route("/api/v1/:place_id/calendar/:month", get(calendar_month))
        .route("/api/v1/:place_id/trmnl", get(composite))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn index() -> &'static str {
    "Masjid prayer times API"
}

/// The whole confData payload.
async fn raw_data(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<RawDataResponse>, AppError> {
    let place = PlaceId::parse(&place_id).map_err(PrayerError::from)?;
    let rawdata = state.aggregator.fetcher().fetch(&place).await?;
    Ok(Json(RawDataResponse { rawdata }))
}

/// Today's timetable.
async fn prayer_times(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<DayTimes>, AppError> {
    let place = PlaceId::parse(&place_id).map_err(PrayerError::from)?;
    let conf = state.aggregator.fetcher().fetch(&place).await?;
    Ok(Json(date_view(&conf, state.aggregator.today())?))
}

/// All twelve months.
async fn calendar(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<CalendarResponse>, AppError> {
    let place = PlaceId::parse(&place_id).map_err(PrayerError::from)?;
    let conf = state.aggregator.fetcher().fetch(&place).await?;
    Ok(Json(CalendarResponse {
        calendar: year_view(&conf)?,
    }))
}

/// One month, 1 = January.
async fn calendar_month(
    State(state): State<AppState>,
    Path((place_id, month)): Path<(String, String)>,
) -> Result<Json<Vec<DayTimes>>, AppError> {
    let month: i32 = month
        .parse()
        .map_err(|_| PrayerError::InvalidArgument(format!("month {month:?} is not a number")))?;
    let place = PlaceId::parse(&place_id).map_err(PrayerError::from)?;
    let conf = state.aggregator.fetcher().fetch(&place).await?;
    Ok(Json(month_view(&conf, month)?))
}

/// Timetable, iqama offsets and devotional text for display.
async fn composite(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<CompositeView>, AppError> {
    let place = PlaceId::parse(&place_id).map_err(PrayerError::from)?;
    Ok(Json(state.aggregator.build_composite(&place).await?))
}

/// Application error type.
#[derive(Debug)]
pub struct AppError(PrayerError);

impl From<PrayerError> for AppError {
    fn from(e: PrayerError) -> Self {
        AppError(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PrayerError::NotFound { .. } => StatusCode::NOT_FOUND,
            PrayerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PrayerError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            PrayerError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            PrayerError::ServerDataMissing { .. }
            | PrayerError::DataIncomplete(_)
            | PrayerError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::aggregate::Aggregator;
    use crate::cache::{CacheConfig, CacheStore};
    use crate::devotional::StaticMailbox;
    use crate::domain::FixedClock;
    use crate::source::{SourceConfig, SourceFetcher};

    const PAYLOAD: &str = r#"{"name":"Mosquée Test","times":["05:10","12:30","15:45","18:10","19:40"],"shuruq":"06:20","jumua":"13:15","calendar":[{"1":["05:15","06:20","12:30","15:45","18:10","19:40"],"2":["05:16","06:21","12:30","15:46","18:11","19:41"]},{},{},{},{},{},{},{},{},{},{},{}]}"#;

    const MESSAGE: &str = "Le hadith du jour\n\nBismillah\nBonjour\nمرحبا";

    async fn app(server: &MockServer) -> Router {
        Mock::given(method("GET"))
            .and(path("/fr/mosquee-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("<script>var confData = {PAYLOAD};</script>")),
            )
            .mount(server)
            .await;

        let config = SourceConfig::new().with_base_url(server.uri()).with_timeout(2);
        let fetcher =
            SourceFetcher::new(config, CacheStore::in_memory(&CacheConfig::default())).unwrap();
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let aggregator = Aggregator::new(
            Arc::new(fetcher),
            Arc::new(StaticMailbox::new(MESSAGE)),
            Arc::new(clock),
        );
        create_router(AppState::new(aggregator))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let server = MockServer::start().await;
        let response = app(&server)
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn raw_data_keeps_unknown_keys() {
        let server = MockServer::start().await;
        let (status, json) = get_json(app(&server).await, "/api/v1/mosquee-test/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rawdata"]["name"], "Mosquée Test");
        assert_eq!(json["rawdata"]["shuruq"], "06:20");
    }

    #[tokio::test]
    async fn prayer_times_for_today() {
        let server = MockServer::start().await;
        let (status, json) = get_json(app(&server).await, "/api/v1/mosquee-test/prayer-times").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fajr"], "05:15");
        assert_eq!(json["shuruk"], "06:20");
    }

    #[tokio::test]
    async fn calendar_month_and_year() {
        let server = MockServer::start().await;
        let app = app(&server).await;

        let (status, json) = get_json(app.clone(), "/api/v1/mosquee-test/calendar/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(2));

        let (status, json) = get_json(app, "/api/v1/mosquee-test/calendar").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["calendar"].as_array().map(Vec::len), Some(12));
    }

    #[tokio::test]
    async fn bad_month_is_bad_request() {
        let server = MockServer::start().await;
        let app = app(&server).await;

        for uri in [
            "/api/v1/mosquee-test/calendar/13",
            "/api/v1/mosquee-test/calendar/june",
        ] {
            let (status, json) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn composite_view() {
        let server = MockServer::start().await;
        let (status, json) = get_json(app(&server).await, "/api/v1/mosquee-test/trmnl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["today"]["fajr"], "05:15");
        assert_eq!(json["tomorrow"]["fajr"], "05:16");
        assert_eq!(json["iqama_delay"]["fajr"], -5);
        assert_eq!(json["jumua"], "13:15");
        assert_eq!(json["hijriDate"], "");
        assert_eq!(json["title"], "Le hadith du jour");
        assert_eq!(json["body_secondary_language"], "مرحبا");
    }

    #[tokio::test]
    async fn unknown_place_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/nowhere"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (status, json) = get_json(app(&server).await, "/api/v1/nowhere/trmnl").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "place not found: nowhere");
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, _) = get_json(app(&server).await, "/api/v1/broken/calendar").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn malformed_place_is_bad_request() {
        let server = MockServer::start().await;
        let (status, _) = get_json(app(&server).await, "/api/v1/a%20b/calendar").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
