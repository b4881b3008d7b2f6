#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use trackcorr::{
    spotify::{Endpoints, RequestContext, RequestPolicy, build_http_client},
    types::AccessToken,
    utils::basic_auth_header,
};

pub const CLIENT_ID: &str = "test_client_id";
pub const CLIENT_SECRET: &str = "test_client_secret";
pub const TOKEN: &str = "test-token";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn endpoints(base: &str) -> Endpoints {
    Endpoints {
        api_url: format!("{}/v1", base),
        token_url: format!("{}/api/token", base),
    }
}

pub fn fast_policy() -> RequestPolicy {
    RequestPolicy {
        timeout: Duration::from_secs(2),
        max_retries: 2,
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        max_retry_after: Duration::from_secs(1),
    }
}

pub fn context(base: &str) -> RequestContext {
    let policy = fast_policy();
    let http = build_http_client(&policy).unwrap();
    let token = AccessToken::new(TOKEN.to_string(), None, None);
    RequestContext::new(http, endpoints(base), token, policy)
}

pub fn track(id: &str, name: &str, artist_id: &str, valence: Option<f64>, danceability: Option<f64>) -> (Value, Value) {
    let track = json!({
        "id": id,
        "name": name,
        "popularity": 70,
        "artists": [{ "id": artist_id, "name": "ignored" }],
        "album": {
            "id": format!("album-{}", id),
            "name": format!("Album of {}", name),
            "release_date": "2020-01-31"
        }
    });
    let features = json!({
        "id": id,
        "valence": valence,
        "danceability": danceability,
        "energy": 0.5
    });
    (track, features)
}

/// In-memory catalog behind the mock Spotify endpoints.
#[derive(Default, Clone)]
pub struct Catalog {
    /// search query -> artist items
    pub artists: HashMap<String, Vec<Value>>,
    /// artist id -> top tracks
    pub top_tracks: HashMap<String, Vec<Value>>,
    /// track id -> audio features
    pub features: HashMap<String, Value>,
    /// query parameters received by the catalog routes, in arrival order
    pub queries: QueryLog,
}

pub type QueryLog = Arc<Mutex<Vec<(&'static str, HashMap<String, String>)>>>;

/// The recorded query of the first request to `route`.
pub fn first_query(log: &QueryLog, route: &str) -> HashMap<String, String> {
    log.lock()
        .unwrap()
        .iter()
        .find(|(r, _)| *r == route)
        .map(|(_, q)| q.clone())
        .unwrap_or_else(|| panic!("no request to {}", route))
}

impl Catalog {
    pub fn with_artist(mut self, query: &str, id: &str, name: &str) -> Self {
        self.artists
            .insert(query.to_string(), vec![json!({ "id": id, "name": name })]);
        self
    }

    pub fn with_tracks(mut self, artist_id: &str, tracks: Vec<(Value, Value)>) -> Self {
        let mut items = Vec::new();
        for (track, features) in tracks {
            let id = track["id"].as_str().unwrap().to_string();
            self.features.insert(id, features);
            items.push(track);
        }
        self.top_tracks.insert(artist_id.to_string(), items);
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/artists/{id}/top-tracks", get(top_tracks))
            .route("/v1/audio-features/{id}", get(audio_features))
            .with_state(Arc::new(self))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
    )
        .into_response()
}

async fn token(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let expected = basic_auth_header(CLIENT_ID, CLIENT_SECRET);
    let header_ok = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    let grant_ok = form.get("grant_type").map(String::as_str) == Some("client_credentials");

    if header_ok && grant_ok {
        Json(json!({ "access_token": TOKEN, "token_type": "Bearer", "expires_in": 3600 }))
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response()
    }
}

async fn search(
    State(catalog): State<Arc<Catalog>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    catalog
        .queries
        .lock()
        .unwrap()
        .push(("search", params.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    if params.get("type").map(String::as_str) != Some("artist") {
        return (StatusCode::BAD_REQUEST, "type must be artist").into_response();
    }
    let query = params.get("q").cloned().unwrap_or_default();
    let items = catalog.artists.get(&query).cloned().unwrap_or_default();
    let total = items.len();
    Json(json!({ "artists": { "items": items, "total": total } })).into_response()
}

async fn top_tracks(
    State(catalog): State<Arc<Catalog>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    catalog
        .queries
        .lock()
        .unwrap()
        .push(("top-tracks", params.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    if !params.contains_key("market") {
        return (StatusCode::BAD_REQUEST, "market is required").into_response();
    }
    match catalog.top_tracks.get(&id) {
        Some(tracks) => Json(json!({ "tracks": tracks })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "non existing id" } })),
        )
            .into_response(),
    }
}

async fn audio_features(
    State(catalog): State<Arc<Catalog>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match catalog.features.get(&id) {
        Some(features) => Json(features.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "analysis not found" } })),
        )
            .into_response(),
    }
}
