use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

/// Body returned by `/text`.
pub const TEXT_BODY: &str = "Mock response data";

pub fn app() -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/text", get(text))
        .route("/status/{code}", get(status))
        .route("/redirect/{n}", get(redirect))
        .route("/loop", get(redirect_loop))
        .route("/dangling", get(dangling))
        .route("/hang", get(hang))
        .route("/user-agent", get(user_agent))
        .route("/echo-header/{name}", get(echo_header))
        .route("/latin1", get(latin1))
        .fallback(not_found)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ok() -> &'static str {
    "OK"
}

async fn text() -> &'static str {
    TEXT_BODY
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) if status.as_u16() >= 200 => (status, format!("status {code}")).into_response(),
        _ => (StatusCode::BAD_REQUEST, format!("unsupported status {code}")).into_response(),
    }
}

/// `/redirect/{n}` answers 302 to `/redirect/{n-1}`; `/redirect/0` is the end of the chain.
async fn redirect(Path(n): Path<u32>) -> Response {
    match n.checked_sub(1) {
        None => "OK".into_response(),
        Some(next) => (
            StatusCode::FOUND,
            [(header::LOCATION, format!("/redirect/{next}"))],
        )
            .into_response(),
    }
}

async fn redirect_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/loop")])
}

async fn dangling() -> StatusCode {
    StatusCode::FOUND
}

async fn hang() -> &'static str {
    std::future::pending().await
}

async fn user_agent(headers: HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn echo_header(Path(name): Path<String>, headers: HeaderMap) -> Response {
    match headers.get(name.as_str()).and_then(|v| v.to_str().ok()) {
        Some(value) => value.to_string().into_response(),
        None => (StatusCode::BAD_REQUEST, format!("header `{name}` not sent")).into_response(),
    }
}

async fn latin1() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=iso-8859-1")],
        &b"caf\xe9"[..],
    )
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
