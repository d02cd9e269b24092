use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, MaxAge};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::global::Global;

pub mod error;
pub mod routes;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AllowMethods::list([hyper::Method::GET, hyper::Method::POST]))
        .allow_headers(AllowHeaders::any())
        .max_age(MaxAge::exact(Duration::from_secs(7200)))
}

fn app(global: Arc<Global>) -> Router {
    Router::new()
        .merge(routes::routes())
        .with_state(global)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &Request| {
                            tracing::info_span!(
                                "request",
                                method = %req.method(),
                                uri = %req.uri(),
                                status = tracing::field::Empty,
                            )
                        })
                        .on_request(|req: &Request, _span: &Span| {
                            tracing::info!(method = %req.method(), uri = %req.uri(), "incoming request");
                        })
                        .on_response(|res: &Response, latency: Duration, span: &Span| {
                            span.record("status", res.status().as_u16());
                            tracing::info!(status = res.status().as_u16(), latency = ?latency, "response");
                        })
                        .on_failure(()),
                )
                .layer(cors_layer()),
        )
}

#[tracing::instrument]
async fn not_found() -> error::ApiError {
    error::ApiError::not_found(error::ApiErrorCode::ROUTE_NOT_FOUND, "route not found")
}

#[tracing::instrument(name = "HTTP", skip_all)]
pub async fn run(global: Arc<Global>) -> anyhow::Result<()> {
    let bind = global.config.api.bind;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context("failed to bind HTTP server")?;

    tracing::info!(%bind, "http server listening");

    axum::serve(
        listener,
        app(global).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("http server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    async fn send(global: Arc<Global>, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app(global).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let global = Global::init(Config::for_tests(Some("token")));

        for uri in ["/", "/home"] {
            let (status, body) = send(global.clone(), Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
        }
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let global = Global::init(Config::for_tests(Some("token")));
        let (status, body) = send(global, Request::get("/nope").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], 404);
    }

    #[tokio::test]
    async fn missing_token_fails_every_lookup() {
        let global = Global::init(Config::for_tests(None));

        for (uri, body) in [
            ("/player", "tag=%23P0LY0&fetch_trophies=on"),
            ("/clan", "clan_tag=%232PP&fetch_clan_name=on"),
            ("/game", "fetch_all_cards=on"),
        ] {
            let (status, body) = send(global.clone(), form(uri, body)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "Server configuration error: CR_API_KEY is not set.");
        }
    }

    #[tokio::test]
    async fn nothing_selected_skips_the_api() {
        // The test config points at an unreachable host, so any API call would
        // surface as a 502.
        let global = Global::init(Config::for_tests(Some("token")));

        let (status, body) = send(global.clone(), form("/player", "tag=%23P0LY0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placeholder"], "You didn't select any data to fetch.");
        assert_eq!(body["tag"], "#P0LY0");

        let (status, body) = send(global, form("/game", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placeholder"], "You didn't select any data to fetch.");
        assert!(body["all_cards"].is_null());
    }

    #[tokio::test]
    async fn unreachable_api_is_a_bad_gateway() {
        let global = Global::init(Config::for_tests(Some("token")));
        let (status, body) = send(global, form("/game", "fetch_all_cards=on")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error_code"], 2000);
    }
}
