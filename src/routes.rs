use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::state::SharedState;

/// GET /prices (and /pricing)
///
/// 200 with the last published token array, 503 before the first publish,
/// 500 if serialization fails. Anything but GET, HEAD included, gets 405.
pub async fn prices_handler(method: Method, State(state): State<SharedState>) -> Response {
    if method != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")]).into_response();
    }

    let guard = state.read_snapshot().await;
    let Some(tokens) = guard.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "message": "not ready" })),
        )
            .into_response();
    };

    match serde_json::to_vec(tokens.as_slice()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("failed to serialize snapshot: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/prices", any(prices_handler))
        .route("/pricing", any(prices_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketOrder, Token};
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn not_ready_before_first_publish() {
        let app = api_router(Arc::new(AppState::new()));
        let response = app.oneshot(get_request("/prices")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["message"], "not ready");
    }

    #[tokio::test]
    async fn serves_published_snapshot() {
        let state = Arc::new(AppState::new());
        state
            .publish(vec![Token {
                name: "wax".into(),
                symbol: "WAX".into(),
                swap_symbol: "SWAP.WAX".into(),
                usd_price: dec!(0.40),
                reference_price: dec!(0.4),
                network_percentage_fee: dec!(0.75),
                sell_orders: vec![MarketOrder {
                    symbol: "SWAP.WAX".into(),
                    price: dec!(0.395),
                    profit_percentage: Some(dec!(1.25)),
                    ..Default::default()
                }],
                ..Default::default()
            }])
            .await;
        let app = api_router(state);

        for uri in ["/prices", "/pricing"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/json"
            );
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
            let tokens = v.as_array().unwrap();
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0]["swap_symbol"], "SWAP.WAX");
            assert_eq!(tokens[0]["hive"], "0.4");
            assert_eq!(tokens[0]["sell_orders"][0]["profit_percentage"], "1.25");
        }
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let state = Arc::new(AppState::new());
        state.publish(Vec::new()).await;
        let app = api_router(state);

        for method in [Method::POST, Method::HEAD, Method::PUT] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/prices")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
        }
    }
}
