mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;
use tokio::time::Instant;
use trackcorr::{
    config::Settings,
    error::{Error, LookupKind},
    management::{CollectOptions, collect},
    spotify::{
        self, Credentials, build_http_client, get_audio_features, get_top_tracks,
        request_access_token, search_artist,
    },
};

use common::{
    CLIENT_ID, CLIENT_SECRET, Catalog, TOKEN, context, endpoints, fast_policy, first_query, track,
};

fn credentials(secret: &str) -> Credentials {
    Credentials {
        client_id: CLIENT_ID.to_string(),
        client_secret: secret.to_string(),
    }
}

#[tokio::test]
async fn test_request_access_token_success() {
    let base = common::spawn(Catalog::default().router()).await;
    let policy = fast_policy();
    let http = build_http_client(&policy).unwrap();

    let token = request_access_token(&http, &endpoints(&base), &credentials(CLIENT_SECRET), &policy, None)
        .await
        .unwrap();

    assert_eq!(token.access_token, TOKEN);
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_request_access_token_rejected_credentials() {
    let base = common::spawn(Catalog::default().router()).await;
    let policy = fast_policy();
    let http = build_http_client(&policy).unwrap();

    let err = request_access_token(&http, &endpoints(&base), &credentials("wrong"), &policy, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_request_access_token_missing_token_field() {
    let router = Router::new().route(
        "/api/token",
        axum::routing::post(|| async { Json(json!({ "token_type": "Bearer" })) }),
    );
    let base = common::spawn(router).await;
    let policy = fast_policy();
    let http = build_http_client(&policy).unwrap();

    let err = request_access_token(&http, &endpoints(&base), &credentials(CLIENT_SECRET), &policy, None)
        .await
        .unwrap_err();

    match err {
        Error::Authentication(msg) => assert!(msg.contains("access_token")),
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_builds_context_with_deadline() {
    let base = common::spawn(Catalog::default().router()).await;
    let settings = Settings {
        api_url: format!("{}/v1", base),
        token_url: format!("{}/api/token", base),
        deadline: Some(Duration::from_secs(30)),
        ..Settings::default()
    };

    let ctx = spotify::connect(&settings, &credentials(CLIENT_SECRET)).await.unwrap();

    assert_eq!(ctx.token().access_token, TOKEN);
    assert_eq!(ctx.endpoints().api_url, format!("{}/v1", base));
    assert!(ctx.deadline().is_some());
}

#[tokio::test]
async fn test_search_artist_returns_first_match() {
    let mut catalog = Catalog::default();
    catalog.artists.insert(
        "Artist A".to_string(),
        vec![
            json!({ "id": "abc123", "name": "Artist A" }),
            json!({ "id": "zzz999", "name": "Artist A Tribute" }),
        ],
    );
    let base = common::spawn(catalog.router()).await;

    let artist = search_artist(&context(&base), "Artist A", 20).await.unwrap();

    assert_eq!(artist.id, "abc123");
    assert_eq!(artist.name, "Artist A");
}

#[tokio::test]
async fn test_search_artist_without_match_is_not_found() {
    let base = common::spawn(Catalog::default().router()).await;

    let err = search_artist(&context(&base), "Nobody", 20).await.unwrap_err();

    match err {
        Error::NotFound { kind, query } => {
            assert_eq!(kind, LookupKind::Artist);
            assert_eq!(query, "Nobody");
        }
        other => panic!("expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_top_tracks_flattens_album_fields() {
    let catalog = Catalog::default().with_tracks(
        "abc123",
        vec![
            track("t1", "First", "abc123", Some(0.4), Some(0.7)),
            track("t2", "Second", "abc123", Some(0.6), Some(0.2)),
        ],
    );
    let base = common::spawn(catalog.router()).await;

    let tracks = get_top_tracks(&context(&base), "abc123", "US", 50).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "t1");
    assert_eq!(tracks[0].name, "First");
    assert_eq!(tracks[0].album_id, "album-t1");
    assert_eq!(tracks[0].album_name, "Album of First");
    assert_eq!(tracks[0].release_date, "2020-01-31");
    assert_eq!(tracks[0].popularity, 70);
    assert_eq!(tracks[0].artist_id, "abc123");
    assert_eq!(tracks[1].id, "t2");
}

#[tokio::test]
async fn test_default_query_parameters() {
    let catalog = Catalog::default()
        .with_artist("Artist A", "abc123", "Artist A")
        .with_tracks("abc123", vec![track("t1", "One", "abc123", Some(0.4), Some(0.3))]);
    let log = catalog.queries.clone();
    let base = common::spawn(catalog.router()).await;

    collect(
        &context(&base),
        &["Artist A".to_string()],
        &CollectOptions::default(),
        |_| {},
    )
    .await
    .unwrap();

    let search = first_query(&log, "search");
    assert_eq!(search["q"], "Artist A");
    assert_eq!(search["type"], "artist");
    assert_eq!(search["offset"], "0");
    assert_eq!(search["limit"], "20");

    let top = first_query(&log, "top-tracks");
    assert_eq!(top["market"], "US");
    assert_eq!(top["include_groups"], "album");
    assert_eq!(top["limit"], "50");
}

#[tokio::test]
async fn test_configured_query_parameters() {
    let catalog = Catalog::default()
        .with_artist("Artist A", "abc123", "Artist A")
        .with_tracks("abc123", vec![track("t1", "One", "abc123", Some(0.4), Some(0.3))]);
    let log = catalog.queries.clone();
    let base = common::spawn(catalog.router()).await;
    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str("Market: SE
Search_limit: 5
Top_tracks_limit: 10
").unwrap();
    let settings = Settings::from_mapping(&mapping).unwrap();

    collect(
        &context(&base),
        &["Artist A".to_string()],
        &CollectOptions::from(&settings),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(first_query(&log, "search")["limit"], "5");
    let top = first_query(&log, "top-tracks");
    assert_eq!(top["market"], "SE");
    assert_eq!(top["limit"], "10");
}

#[tokio::test]
async fn test_get_top_tracks_unknown_artist() {
    let base = common::spawn(Catalog::default().router()).await;

    let err = get_top_tracks(&context(&base), "missing", "US", 50).await.unwrap_err();

    assert!(matches!(err, Error::NotFound { kind: LookupKind::TopTracks, .. }));
}

#[tokio::test]
async fn test_get_audio_features_with_null_fields() {
    let mut catalog = Catalog::default();
    catalog.features.insert(
        "t1".to_string(),
        json!({ "id": "t1", "valence": 0.25, "danceability": null }),
    );
    let base = common::spawn(catalog.router()).await;

    let features = get_audio_features(&context(&base), "t1").await.unwrap();

    assert_eq!(features.valence, Some(0.25));
    assert_eq!(features.danceability, None);
    assert_eq!(features.energy, None);
}

#[tokio::test]
async fn test_rejected_bearer_token_is_authentication_error() {
    let router = Router::new().route(
        "/v1/search",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" }))) }),
    );
    let base = common::spawn(router).await;

    let err = search_artist(&context(&base), "Artist A", 20).await.unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_malformed_response() {
    let router = Router::new().route(
        "/v1/search",
        get(|| async { Json(json!({ "unexpected": true })) }),
    );
    let base = common::spawn(router).await;

    let err = search_artist(&context(&base), "Artist A", 20).await.unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/search",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                } else {
                    Json(json!({ "artists": { "items": [{ "id": "abc123", "name": "Artist A" }] } }))
                        .into_response()
                }
            }),
        )
        .with_state(Arc::clone(&calls));
    let base = common::spawn(router).await;

    let artist = search_artist(&context(&base), "Artist A", 20).await.unwrap();

    assert_eq!(artist.id, "abc123");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_exhausted_is_network_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/search",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::BAD_GATEWAY
            }),
        )
        .with_state(Arc::clone(&calls));
    let base = common::spawn(router).await;

    let err = search_artist(&context(&base), "Artist A", 20).await.unwrap_err();

    // one initial attempt plus max_retries (2)
    match err {
        Error::Network { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected network error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/search",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                (StatusCode::BAD_REQUEST, "bad query")
            }),
        )
        .with_state(Arc::clone(&calls));
    let base = common::spawn(router).await;

    let err = search_artist(&context(&base), "Artist A", 20).await.unwrap_err();

    match err {
        Error::Api { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad query");
        }
        other => panic!("expected api error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_deadline_stops_before_sending() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/search",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK
            }),
        )
        .with_state(Arc::clone(&calls));
    let base = common::spawn(router).await;

    let ctx = context(&base).with_deadline(Some(Instant::now()));
    let err = search_artist(&ctx, "Artist A", 20).await.unwrap_err();

    assert!(matches!(err, Error::DeadlineExceeded(_)), "got {:?}", err);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_deadline_cuts_slow_request() {
    let router = Router::new().route(
        "/v1/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "artists": { "items": [] } }))
        }),
    );
    let base = common::spawn(router).await;

    let started = Instant::now();
    let ctx = context(&base).with_deadline(Some(Instant::now() + Duration::from_millis(200)));
    let err = search_artist(&ctx, "Artist A", 20).await.unwrap_err();

    assert!(matches!(err, Error::DeadlineExceeded(_)), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_backoff_grows_and_is_capped() {
    let policy = fast_policy();
    assert_eq!(policy.backoff(0), Duration::from_millis(10));
    assert_eq!(policy.backoff(1), Duration::from_millis(20));
    assert_eq!(policy.backoff(2), Duration::from_millis(40));
    assert_eq!(policy.backoff(3), Duration::from_millis(50));
    assert_eq!(policy.backoff(30), Duration::from_millis(50));
}

#[test]
fn test_credentials_debug_hides_secret() {
    let debug = format!("{:?}", credentials(CLIENT_SECRET));
    assert!(debug.contains(CLIENT_ID));
    assert!(!debug.contains(CLIENT_SECRET));
}
