//! HTTP API routes
//!
//! JSON endpoints over the session: ranked shortlist, hotspot cells, user
//! location updates, filter changes, and GBIF refresh. The static front-end
//! is served next to them.

use crate::dataset::gbif::{GbifClient, DEFAULT_FETCH_LIMIT};
use crate::error::Error;
use crate::format::{build_report, RankedEntry, SelectionReport};
use crate::geo::Coordinates;
use crate::hotspot::season::current_month_index;
use crate::hotspot::{DateRange, HotspotSet};
use crate::rank::{self, SortMode};
use crate::server::state::AppState;
use crate::session::{Filters, HotspotScope, Region};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Determine static files path
    // Try relative to cwd first, then fallback to common locations
    let static_path = if std::path::Path::new("static").exists() {
        "static".to_string()
    } else if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let path = exe_dir.join("static");
            if path.exists() {
                path.to_string_lossy().to_string()
            } else {
                "static".to_string()
            }
        } else {
            "static".to_string()
        }
    } else {
        "static".to_string()
    };

    Router::new()
        .route("/api/plants", get(plants_handler))
        .route("/api/report", get(report_handler))
        .route("/api/location", post(location_handler))
        .route("/api/hotspots", get(hotspots_handler))
        .route("/api/filters", get(filters_handler).patch(filters_update_handler))
        .route("/api/status", get(status_handler))
        .route("/api/refresh", post(refresh_handler))
        .nest_service(
            "/",
            ServeDir::new(&static_path).append_index_html_on_directories(true),
        )
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidGridSize(_) => "INVALID_GRID_SIZE",
            Error::Dataset(_) => "DATASET_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Gbif(_) | Error::Http(_) => "GBIF_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Ranked shortlist response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlantsResponse {
    pub region: Region,
    pub lat: f64,
    pub lon: f64,
    pub entries: Vec<RankedEntry>,
}

/// Ranked shortlist for card rendering
///
/// GET /api/plants
async fn plants_handler(State(state): State<Arc<AppState>>) -> Json<PlantsResponse> {
    let session = state.session.read().await;

    let ranked = rank::select(
        &session.species,
        session.filters.top_n,
        session.filters.sort_mode,
        session.user(),
        current_month_index(),
    );
    let entries = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| RankedEntry::new(i + 1, r))
        .collect();

    Json(PlantsResponse {
        region: session.region.clone(),
        lat: session.user().lat,
        lon: session.user().lon,
        entries,
    })
}

/// Full selection report: shortlist + hotspot cells
///
/// GET /api/report
async fn report_handler(State(state): State<Arc<AppState>>) -> Json<SelectionReport> {
    let grid_km = state.config.read().await.defaults.grid_km;
    let session = state.session.read().await;

    Json(build_report(
        &session,
        grid_km,
        DateRange::unbounded(),
        HotspotScope::Selection,
        current_month_index(),
    ))
}

/// Location update request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub lat: f64,
    pub lon: f64,
}

/// Location update response
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationResponse {
    /// Whether local stats were recomputed (false when debounced)
    pub recomputed: bool,
    /// Fresh selection, in rank order
    pub selection: Vec<String>,
}

/// Handle a user location update
///
/// POST /api/location
///
/// Runs the fixed pipeline: proximity recompute (debounced), then
/// re-ranking. The caller re-renders from the returned selection.
async fn location_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LocationUpdate>,
) -> Result<Json<LocationResponse>, ApiError> {
    Coordinates::new(req.lat, req.lon)
        .validate()
        .map_err(ApiError::from)?;

    let mut session = state.session.write().await;
    let recomputed = session.update_location(req.lat, req.lon);

    Ok(Json(LocationResponse {
        recomputed,
        selection: session.selection_ids().to_vec(),
    }))
}

/// Hotspots query parameters
#[derive(Debug, Deserialize)]
pub struct HotspotsQuery {
    /// Override the session sort mode: timeless or season
    pub mode: Option<String>,
    pub grid_km: Option<f64>,
    /// Aggregate every species instead of the current selection
    #[serde(default)]
    pub all: bool,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Merged hotspot cells for density-map rendering
///
/// GET /api/hotspots
async fn hotspots_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HotspotsQuery>,
) -> Result<Json<HotspotSet>, ApiError> {
    let grid_km = match q.grid_km {
        Some(g) => g,
        None => state.config.read().await.defaults.grid_km,
    };
    if !grid_km.is_finite() || grid_km <= 0.0 {
        return Err(ApiError::from(Error::InvalidGridSize(format!(
            "Grid size must be positive, got {}",
            grid_km
        ))));
    }

    let session = state.session.read().await;

    let mode = match &q.mode {
        Some(m) => m
            .parse::<SortMode>()
            .map_err(Error::Config)
            .map_err(ApiError::from)?,
        None => session.filters.sort_mode,
    };
    let seasonal_month = (mode == SortMode::Season).then(current_month_index);
    let scope = if q.all {
        HotspotScope::All
    } else {
        HotspotScope::Selection
    };

    let set = session.hotspot_set(
        grid_km,
        DateRange {
            start: q.from,
            end: q.to,
        },
        scope,
        seasonal_month,
    );

    Ok(Json(set))
}

/// Current filters
///
/// GET /api/filters
async fn filters_handler(State(state): State<Arc<AppState>>) -> Json<Filters> {
    Json(state.session.read().await.filters)
}

/// Partial filters update
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FiltersPatch {
    pub top_n: Option<i64>,
    pub sort_mode: Option<String>,
    pub viz_hotspots: Option<bool>,
    pub viz_points: Option<bool>,
}

/// Update filters and re-rank
///
/// PATCH /api/filters
async fn filters_update_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<FiltersPatch>,
) -> Result<Json<Filters>, ApiError> {
    let mut session = state.session.write().await;

    if let Some(n) = patch.top_n {
        session.set_top_n(n);
    }
    if let Some(m) = &patch.sort_mode {
        let mode = m
            .parse::<SortMode>()
            .map_err(Error::Config)
            .map_err(ApiError::from)?;
        session.set_sort_mode(mode);
    }
    if let Some(v) = patch.viz_hotspots {
        session.filters.viz_hotspots = v;
    }
    if let Some(v) = patch.viz_points {
        session.filters.viz_points = v;
    }
    session.filters.ensure_viz_visible();

    Ok(Json(session.filters))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub region: Region,
    pub species: usize,
    pub selected: usize,
    pub lat: f64,
    pub lon: f64,
}

/// Server and dataset status
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let session = state.session.read().await;

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        region: session.region.clone(),
        species: session.species.len(),
        selected: session.selection_ids().len(),
        lat: session.user().lat,
        lon: session.user().lon,
    })
}

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// False when a newer refresh superseded this one
    pub applied: bool,
    pub updated: usize,
    pub fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gbif_count: Option<u64>,
}

/// Refresh occurrence samples for the selected species from GBIF
///
/// POST /api/refresh
///
/// Last-writer-wins: if another refresh starts while this one's request is
/// in flight, the stale result is discarded instead of applied.
async fn refresh_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let seq = state.begin_fetch();

    let (lat, lon, radius_km, taxon_keys) = {
        let session = state.session.read().await;
        let keys: Vec<i64> = session
            .selected_species()
            .iter()
            .filter_map(|s| s.taxon_key)
            .collect();
        (session.user().lat, session.user().lon, session.radius_km, keys)
    };

    let client = GbifClient::new();
    let fetch = client
        .fetch_occurrences(lat, lon, &taxon_keys, radius_km, DEFAULT_FETCH_LIMIT)
        .await
        .map_err(ApiError::from)?;

    if !state.is_current_fetch(seq) {
        return Ok(Json(RefreshResponse {
            applied: false,
            updated: 0,
            fetched: fetch.total,
            gbif_count: fetch.gbif_count,
        }));
    }

    let mut session = state.session.write().await;
    let updated = session.apply_refreshed_occurrences(&fetch.by_taxon_key);

    Ok(Json(RefreshResponse {
        applied: true,
        updated,
        fetched: fetch.total,
        gbif_count: fetch.gbif_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::Session;
    use crate::species::{Occurrence, Species};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let occ = |lat: f64, lon: f64, m: u32| {
            Occurrence::from_year_month(lat, lon, Some(2024), Some(m))
        };

        let mut a = Species::new(
            "Allium ursinum",
            "Bärlauch",
            vec![occ(51.34, 12.37, 3), occ(51.341, 12.371, 3)],
            2024,
        );
        a.total = Some(1000);
        let mut b = Species::new("Urtica dioica", "Brennnessel", vec![occ(10.0, 10.0, 7)], 2024);
        b.total = Some(50);

        let mut session = Session::new(Region::default(), 10.0, 1.0);
        session.set_species(vec![a, b]);

        Arc::new(AppState::new(Config::default(), session))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plants_endpoint() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/plants").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        // the species near the region center ranks first
        assert_eq!(entries[0]["id"], "Allium ursinum");
    }

    #[tokio::test]
    async fn test_location_update_and_debounce() {
        let state = test_state();
        let post = |lat: f64, lon: f64| {
            Request::builder()
                .method("POST")
                .uri("/api/location")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"lat": {}, "lon": {}}}"#, lat, lon)))
                .unwrap()
        };

        // dataset load already computed stats at the region center
        let response = create_router(state.clone()).oneshot(post(51.3397, 12.3731)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["recomputed"], false);

        let response = create_router(state.clone()).oneshot(post(10.0, 10.0)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["recomputed"], true);
        assert_eq!(json["selection"][0], "Urtica dioica");
    }

    #[tokio::test]
    async fn test_location_update_rejects_bad_coordinates() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/location")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"lat": 123.0, "lon": 0.0}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_hotspots_endpoint() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/hotspots?all=true&grid_km=1.0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let cells = json["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 2);
        // sorted descending by count
        assert_eq!(cells[0]["count"], 2.0);
    }

    #[tokio::test]
    async fn test_hotspots_rejects_bad_grid() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/hotspots?grid_km=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filters_patch_applies_viz_policy() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/filters")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"viz_hotspots": false, "viz_points": false}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        // never render nothing: hotspots forced back on
        assert_eq!(json["viz_hotspots"], true);
    }

    #[tokio::test]
    async fn test_filters_patch_top_n() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/filters")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"top_n": -5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["top_n"], 1);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["species"], 2);
        assert_eq!(json["region"]["name"], "Germany (offline)");
    }

    #[tokio::test]
    async fn test_report_endpoint() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["id"].is_string());
        assert!(json["entries"].is_array());
        assert!(json["hotspots"]["cells"].is_array());
    }
}
