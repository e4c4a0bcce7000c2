use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sheltr_core::geometry::BoundingBox;
use sheltr_core::routing::NodeIndex;
use sheltr_core::{
    BBOX_MARGIN_DEGREES, Error, RiskGraph, Route, RouteOptions, k_safest_routes_with,
    risk_layer_geojson_string, safest_path_with, snap,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::store::GraphStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GraphStore>,
    /// Fixed area of interest; derived from the query points when `None`
    pub area_of_interest: Option<BoundingBox>,
    pub options: RouteOptions,
    pub default_k: usize,
    pub max_k: usize,
    pub timeout: Duration,
}

pub fn router(state: AppState, max_concurrent_queries: usize) -> Router {
    Router::new()
        .route("/api", get(api_info))
        .route("/route", get(route_handler))
        .route("/routes", get(routes_handler))
        .route("/riskmap", get(riskmap_handler))
        .layer(ConcurrencyLimitLayer::new(max_concurrent_queries.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    start: Option<String>,
    end: Option<String>,
    k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RouteBody {
    /// `[lat, lon]` pairs
    path: Vec<[f64; 2]>,
    total_risk: f64,
    total_length: f64,
}

impl From<&Route> for RouteBody {
    fn from(route: &Route) -> Self {
        Self {
            path: route.lat_lon_path(),
            total_risk: route.total_risk(),
            total_length: route.total_length(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoutesBody {
    routes: Vec<RouteBody>,
}

async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "Sheltr API running",
        "endpoints": {
            "/route": "GET with start=lat,lon&end=lat,lon",
            "/routes": "GET with start=lat,lon&end=lat,lon&k=3",
            "/riskmap": "GET risk GeoJSON for the area of interest",
        }
    }))
}

async fn route_handler(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteBody>, ApiError> {
    let (start, end) = query.endpoints()?;
    let options = state.options.clone();

    let route = run_query(&state, start, end, move |graph, from, to| {
        safest_path_with(graph, from, to, &options)
    })
    .await?;

    Ok(Json(RouteBody::from(&route)))
}

async fn routes_handler(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RoutesBody>, ApiError> {
    let (start, end) = query.endpoints()?;
    let k = query.k.unwrap_or(state.default_k);
    if k > state.max_k {
        return Err(ApiError::BadRequest(format!(
            "k must not exceed {}",
            state.max_k
        )));
    }
    let options = state.options.clone();

    let routes = run_query(&state, start, end, move |graph, from, to| {
        k_safest_routes_with(graph, from, to, k, &options)
    })
    .await?;

    Ok(Json(RoutesBody {
        routes: routes.iter().map(RouteBody::from).collect(),
    }))
}

async fn riskmap_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let store = Arc::clone(&state.store);
    let area = state.area_of_interest;

    let geojson = with_timeout(state.timeout, move || {
        let bbox = match area {
            Some(bbox) => bbox,
            None => store.snapshot_bounds()?,
        };
        let graph = store.graph_for(&bbox)?;
        risk_layer_geojson_string(&graph)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/geo+json")], geojson))
}

impl RouteQuery {
    fn endpoints(&self) -> Result<(Point<f64>, Point<f64>), ApiError> {
        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            return Err(ApiError::BadRequest(
                "start and end query params required".to_string(),
            ));
        };
        Ok((parse_lat_lon(start)?, parse_lat_lon(end)?))
    }
}

/// Parses `"lat,lon"` into a point
fn parse_lat_lon(value: &str) -> Result<Point<f64>, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid coordinates".to_string());
    let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok(Point::new(lon, lat))
}

/// Snaps both points and runs `query` on the graph of the area of interest
async fn run_query<T, F>(
    state: &AppState,
    start: Point<f64>,
    end: Point<f64>,
    query: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RiskGraph, NodeIndex, NodeIndex) -> Result<T, Error> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    let bbox = state
        .area_of_interest
        .unwrap_or_else(|| BoundingBox::around(&start, &end, BBOX_MARGIN_DEGREES));

    with_timeout(state.timeout, move || {
        let graph = store.graph_for(&bbox)?;
        let from = snap(&graph, &start)?;
        let to = snap(&graph, &end)?;
        query(&graph, from, to)
    })
    .await
}

/// Runs CPU-bound routing work off the async runtime, bounded by `timeout`
async fn with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join_error)) => Err(ApiError::Internal(format!(
            "Routing task failed: {join_error}"
        ))),
        Err(_) => Err(ApiError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sheltr_core::NetworkConfig;
    use sheltr_core::loading::{RawEdge, RawNetwork, RawNode};
    use tower::ServiceExt;

    fn app(area_of_interest: Option<BoundingBox>) -> Router {
        let nodes = (0..4)
            .map(|i| RawNode {
                id: i + 1,
                lat: 18.45,
                lon: 73.85 + f64::from(i as i32) * 0.01,
            })
            .collect();
        let edges = (1..4)
            .map(|source| RawEdge {
                source,
                target: source + 1,
                length_m: None,
                geometry: None,
                bidirectional: true,
                bridge: false,
                tunnel: false,
            })
            .collect();
        let store =
            GraphStore::new(RawNetwork { nodes, edges }, NetworkConfig::default(), 4).unwrap();
        let state = AppState {
            store: Arc::new(store),
            area_of_interest,
            options: RouteOptions::default(),
            default_k: 3,
            max_k: 5,
            timeout: Duration::from_secs(10),
        };
        router(state, 8)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn parses_lat_lon_pairs() {
        let point = parse_lat_lon("18.45, 73.85").unwrap();
        assert_eq!((point.y(), point.x()), (18.45, 73.85));
        assert!(parse_lat_lon("18.45").is_err());
        assert!(parse_lat_lon("north,east").is_err());
        assert!(parse_lat_lon("95.0,73.85").is_err());
    }

    #[tokio::test]
    async fn info_lists_endpoints() {
        let (status, body) = get_json(app(None), "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["/routes"].is_string());
    }

    #[tokio::test]
    async fn missing_params_are_rejected() {
        let (status, body) = get_json(app(None), "/route?start=18.45,73.85").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "start and end query params required");
    }

    #[tokio::test]
    async fn malformed_coordinates_are_rejected() {
        let (status, body) = get_json(app(None), "/route?start=abc&end=18.45,73.88").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid coordinates");
    }

    #[tokio::test]
    async fn route_returns_lat_lon_path() {
        let (status, body) =
            get_json(app(None), "/route?start=18.4501,73.8501&end=18.45,73.88").await;
        assert_eq!(status, StatusCode::OK);

        let path = body["path"].as_array().unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0][0].as_f64(), Some(18.45));
        assert_eq!(path[0][1].as_f64(), Some(73.85));
        let total_length = body["total_length"].as_f64().unwrap();
        let total_risk = body["total_risk"].as_f64().unwrap();
        assert!(total_length > 3000.0);
        assert!(total_risk >= total_length);
    }

    #[tokio::test]
    async fn routes_honours_k_and_its_cap() {
        let (status, body) =
            get_json(app(None), "/routes?start=18.45,73.85&end=18.45,73.88&k=2").await;
        assert_eq!(status, StatusCode::OK);
        // A line network has a single route
        assert_eq!(body["routes"].as_array().unwrap().len(), 1);

        let (status, _) =
            get_json(app(None), "/routes?start=18.45,73.85&end=18.45,73.88&k=6").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn points_outside_the_area_of_interest_fail_to_route() {
        let far_away = BoundingBox::new(1.0, 0.0, 1.0, 0.0).unwrap();
        let (status, _) =
            get_json(app(Some(far_away)), "/route?start=18.45,73.85&end=18.45,73.88").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn riskmap_is_geojson() {
        let response = app(None)
            .oneshot(Request::builder().uri("/riskmap").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/geo+json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
    }
}
