/*
 * Responsibility
 * - POST (any path): 何切るアドバイス
 * - body → AdviceRequest (DTO validation) → upstream payload → relay
 * - upstream の status / body はそのまま返す (非 2xx も解釈しない)
 * - CORS / api key は middleware 側の責務
 */
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    api::v1::{dto::advice::AdviceRequest, extractors::UpstreamCredentialsExtractor},
    error::AppError,
    state::AppState,
};

pub async fn advice(
    State(state): State<AppState>,
    UpstreamCredentialsExtractor(creds): UpstreamCredentialsExtractor,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = AdviceRequest::from_slice(&body)?;
    let payload = req.to_payload();

    let reply = state.upstream.complete(creds.api_key(), &payload).await?;

    tracing::info!(
        status = reply.status.as_u16(),
        bytes = reply.body.len(),
        "relayed upstream reply"
    );

    Ok((
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, Method, Request, StatusCode, header},
    };
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::v1::routes::BODY_LIMIT_BYTES;
    use crate::app::build_router;
    use crate::config::{Config, tests::test_config};
    use crate::services::advice::prompt::{SYSTEM_PROMPT, user_prompt};
    use crate::state::AppState;

    const ORIGIN: &str = "app://nanikiru";
    const VALID_BODY: &str = r#"{"hand":["1m","2m"],"doras":["5p"],"temperature":0.2}"#;

    fn app(config: Config) -> Router {
        build_router(AppState::from_config(config.clone()), &config)
    }

    // Nothing listens here; only tests that reach the relay care.
    fn offline_app() -> Router {
        app(test_config("http://127.0.0.1:1/v1/chat/completions"))
    }

    async fn upstream() -> (ServerGuard, Config) {
        let server = Server::new_async().await;
        let config = test_config(&format!("{}/v1/chat/completions", server.url()));
        (server, config)
    }

    fn request(method: Method, key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri("/")
            .header(header::ORIGIN, ORIGIN)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header("x-advice-api-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn authorized(body: &str) -> Request<Body> {
        request(Method::POST, Some("advice-secret"), body)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn assert_cors(headers: &HeaderMap, origin: &str) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, X-Advice-Api-Key"
        );
    }

    #[tokio::test]
    async fn preflight_needs_neither_key_nor_secrets() {
        let mut config = test_config("http://127.0.0.1:1/");
        config.openai_api_key = None;
        config.advice_api_key = None;

        let (status, headers, body) = send(app(config), request(Method::OPTIONS, None, "")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&headers, ORIGIN);
    }

    #[tokio::test]
    async fn preflight_ignores_declared_body_size() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, ORIGIN)
            .header(header::CONTENT_LENGTH, "2000000")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = send(offline_app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&headers, ORIGIN);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_behind_cors_and_key_gate() {
        let big = format!(
            r#"{{"hand":["{}"],"doras":[]}}"#,
            "m".repeat(BODY_LIMIT_BYTES * 2)
        );

        let (status, headers, _) = send(offline_app(), authorized(&big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_cors(&headers, ORIGIN);

        let (status, headers, body) =
            send(offline_app(), request(Method::POST, None, &big)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "Unauthorized");
        assert_cors(&headers, ORIGIN);
    }

    #[tokio::test]
    async fn other_methods_are_rejected_before_the_key_check() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let (status, headers, body) =
                send(offline_app(), request(method.clone(), None, "")).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_cors(&headers, ORIGIN);
            if method != Method::HEAD {
                assert_eq!(body, "Method Not Allowed");
            }
        }
    }

    #[tokio::test]
    async fn any_path_is_the_advice_endpoint() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/some/nested/path")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(offline_app(), req).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&headers, "null");
    }

    #[tokio::test]
    async fn missing_secret_is_a_server_error() {
        for strip_upstream in [true, false] {
            let mut config = test_config("http://127.0.0.1:1/");
            if strip_upstream {
                config.openai_api_key = None;
            } else {
                config.advice_api_key = None;
            }

            let (status, headers, body) = send(app(config), authorized(VALID_BODY)).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "Server misconfigured");
            assert!(headers.get(header::CONTENT_TYPE).is_none());
            assert_cors(&headers, ORIGIN);
        }
    }

    #[tokio::test]
    async fn empty_secret_from_environment_is_a_server_error() {
        let config = Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some(String::new()),
            "ADVICE_API_KEY" => Some("advice-secret".to_string()),
            _ => None,
        })
        .unwrap();

        let (status, _, body) = send(app(config), authorized(VALID_BODY)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Server misconfigured");
    }

    #[tokio::test]
    async fn missing_or_wrong_key_is_unauthorized() {
        for key in [None, Some("wrong"), Some(""), Some("advice-secret ")] {
            let (status, headers, body) =
                send(offline_app(), request(Method::POST, key, VALID_BODY)).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{key:?}");
            assert_eq!(body, "Unauthorized");
            assert_cors(&headers, ORIGIN);
        }
    }

    #[tokio::test]
    async fn unparsable_body_is_a_bad_request() {
        for raw in ["", "{\"hand\":", "not json"] {
            let (status, headers, body) = send(offline_app(), authorized(raw)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, "Invalid JSON body");
            assert!(headers.get(header::CONTENT_TYPE).is_none());
        }
    }

    #[tokio::test]
    async fn non_array_fields_are_a_bad_request() {
        for raw in [
            r#"{"hand":"1m2m","doras":["5p"]}"#,
            r#"{"hand":["1m"],"doras":5}"#,
            r#"{"hand":null,"doras":[]}"#,
            r#"{"hand":["1m"],"doras":{"a":"5p"}}"#,
            r#"{"doras":[]}"#,
        ] {
            let (status, _, body) = send(offline_app(), authorized(raw)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(body, "`hand` and `doras` must be arrays");
        }
    }

    #[tokio::test]
    async fn relays_upstream_reply_with_cors_and_json_content_type() {
        let (mut server, config) = upstream().await;
        let hand = json!(["1m", "2m"]);
        let doras = json!(["5p"]);
        let completion = r#"{"id":"chatcmpl-1","choices":[{"message":{"role":"assistant","content":"2mを切れ"}}]}"#;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {
                        "role": "user",
                        "content": user_prompt(
                            hand.as_array().unwrap(),
                            doras.as_array().unwrap()
                        )
                    }
                ],
                "temperature": 0.2,
                "max_tokens": 200
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion)
            .create_async()
            .await;

        let (status, headers, body) = send(app(config), authorized(VALID_BODY)).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, completion);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_cors(&headers, ORIGIN);
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn non_numeric_temperature_is_sent_as_default() {
        let (mut server, config) = upstream().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({"temperature": 0.7})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let (status, _, _) = send(
            app(config),
            authorized(r#"{"hand":["1m"],"doras":[],"temperature":"hot"}"#),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn upstream_error_is_passed_through_verbatim() {
        let (mut server, config) = upstream().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body(r#"{"error":"rate limited"}"#)
            .create_async()
            .await;

        let (status, headers, body) = send(app(config), authorized(VALID_BODY)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"error":"rate limited"}"#);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_cors(&headers, ORIGIN);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_bad_gateway() {
        let (status, headers, body) = send(offline_app(), authorized(VALID_BODY)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "Bad Gateway");
        assert_cors(&headers, ORIGIN);
    }

    #[tokio::test]
    async fn foreign_origin_gets_null_but_is_still_served() {
        let (mut server, config) = upstream().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::ORIGIN, "https://example.com")
            .header("x-advice-api-key", "advice-secret")
            .body(Body::from(VALID_BODY))
            .unwrap();

        let (status, headers, _) = send(app(config), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers, "null");
    }
}
