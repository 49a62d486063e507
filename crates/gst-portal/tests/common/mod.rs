//! Shared fixtures: a mock portal on a local `wiremock` server.

#![allow(dead_code)]

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use gst_portal::config::paths;
use gst_portal::{FixedSolver, PortalConfig, PortalSession, Workflow};

pub const PAN: &str = "AABFS0153K";
pub const GSTIN: &str = "27AAAAA0000A1Z5";
pub const SOLUTION: &str = "AB12";

/// Small PNG standing in for the captcha image.
pub fn captcha_png() -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(120, 40);
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    img.write_with_encoder(encoder).unwrap();
    buf
}

pub fn config_for(server: &MockServer) -> PortalConfig {
    PortalConfig::with_base_url(&server.uri()).unwrap()
}

pub fn session_for(server: &MockServer) -> PortalSession {
    PortalSession::new(config_for(server)).unwrap()
}

pub fn workflow_for(server: &MockServer) -> Workflow {
    Workflow::new(config_for(server), Box::new(FixedSolver::new(SOLUTION))).unwrap()
}

/// Entry page that hands out a session cookie.
pub async fn mount_entry_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(paths::SEARCH_BY_PAN_PAGE))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=session-1; Path=/")
                .set_body_string("<html></html>"),
        )
        .mount(server)
        .await;
}

/// Captcha endpoint that binds `token` through the captcha cookie.
pub fn captcha_mock(token: &str) -> Mock {
    Mock::given(method("GET")).and(path(paths::CAPTCHA)).respond_with(
        ResponseTemplate::new(200)
            .insert_header("set-cookie", format!("CaptchaCookie={token}; Path=/").as_str())
            .insert_header("content-type", "image/png")
            .set_body_bytes(captcha_png()),
    )
}

/// Entry page plus a captcha that always issues `token`.
pub async fn mount_gate(server: &MockServer, token: &str) {
    mount_entry_page(server).await;
    captcha_mock(token).mount(server).await;
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Requests the server saw for `route`, in arrival order.
pub async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
