use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ResponseShape;

pub mod health;
pub mod squads;

/// Shared by every handler; the pool is the only process-wide resource.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub response_shape: ResponseShape,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Premier League Stats API - v1.0" }))
        .route("/health", get(health::health_check))

        .route("/PL/stats/{team}", get(squads::get_team_stats))
        .route("/PL/ratings/{team}", get(squads::get_team_ratings))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{test_pool, FIXTURE};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    async fn app(script: &str, response_shape: ResponseShape) -> Router {
        let pool = test_pool(script).await;
        router(AppState { pool, response_shape })
    }

    async fn request(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_stats_case_insensitive_match() {
        let app = app(FIXTURE, ResponseShape::Array).await;

        let response = request(app, "/PL/stats/arsenal").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_json(response).await, json!([{"squad": "Arsenal", "wins": 20}]));
    }

    #[tokio::test]
    async fn test_stats_keys_follow_column_order() {
        let app = app(FIXTURE, ResponseShape::Array).await;

        let response = request(app, "/PL/stats/Chelsea").await;
        let body = response.into_body().collect().await.unwrap().to_bytes();

        assert_eq!(&body[..], br#"[{"squad":"Chelsea","wins":18}]"#);
    }

    #[tokio::test]
    async fn test_stats_unknown_team_is_empty_array() {
        let app = app(FIXTURE, ResponseShape::Array).await;

        let response = request(app, "/PL/stats/wrexham").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_ratings_encoded_path_segment() {
        let app = app(FIXTURE, ResponseShape::Array).await;

        let response = request(app, "/PL/ratings/Luton%20Town").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{
                "squad": "luton town",
                "attack": 61.5,
                "promoted": true,
                "updated_at": "2023-08-11T19:00:00Z",
                "crest": "TFQ=",
                "notes": null
            }])
        );
    }

    #[tokio::test]
    async fn test_legacy_string_shape() {
        let app = app(FIXTURE, ResponseShape::LegacyString).await;

        let response = request(app, "/PL/stats/arsenal").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!(r#"[{"squad":"Arsenal","wins":20}]"#)
        );
    }

    #[tokio::test]
    async fn test_query_failure_is_500() {
        let app = app("CREATE TABLE regular_season (squad TEXT);", ResponseShape::Array).await;

        let response = request(app, "/PL/ratings/arsenal").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "500 Internal Server Error");
        assert_eq!(body["message"], "query execution failed");
    }

    #[tokio::test]
    async fn test_decode_failure_is_500() {
        let app = app(
            r#"
            CREATE TABLE ratings (squad TEXT, updated_at DATETIME);
            INSERT INTO ratings VALUES ('burnley', '2023-08-11 19:00:00');
            INSERT INTO ratings VALUES ('burnley', 'tbc');
            "#,
            ResponseShape::Array,
        )
        .await;

        let response = request(app, "/PL/ratings/burnley").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "failed to decode row 1");
    }

    #[tokio::test]
    async fn test_health() {
        let app = app("CREATE TABLE regular_season (squad TEXT);", ResponseShape::Array).await;

        let response = request(app, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "up");
    }

    #[tokio::test]
    async fn test_health_reports_closed_pool() {
        let pool = test_pool("CREATE TABLE regular_season (squad TEXT);").await;
        pool.close().await;
        let app = router(AppState { pool, response_shape: ResponseShape::Array });

        let response = request(app, "/health").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["database"], "down");
    }
}
