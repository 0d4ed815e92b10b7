//! Functional tests for the generate endpoint

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use banner_studio::{
    api::routes::create_router,
    backend::traits::{AspectRatio, ContentType, GenerationRequest, Locator, MediaGenerator},
    codec::{base64, raster},
    config::{FetchConfig, Settings},
    pipeline::Studio,
    response::ResultFetcher,
    AppError, AppState, Result,
};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "studio-test-boundary";
const MP4_BYTES: [u8; 16] = [
    0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'm', b'p', b'4', b'2', 0x00, 0x00, 0x00, 0x00,
];

/// Generator that records requests and answers with a fixed locator
struct StubGenerator {
    locator: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    fn new(locator: String) -> Arc<Self> {
        Arc::new(Self {
            locator,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub/model"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Locator> {
        self.requests.lock().unwrap().push(request);
        Ok(Locator::new(self.locator.clone()))
    }
}

fn app(generator: Arc<StubGenerator>) -> Router {
    let fetcher = ResultFetcher::new(&FetchConfig::default()).unwrap();
    let studio = Studio::new(generator, fetcher);
    create_router(Arc::new(AppState::new(Settings::default(), Ok(studio))))
}

fn reference_png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
    raster::encode_png(&image).unwrap()
}

fn form_request(fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"ref.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn asset_server(route: &str, bytes: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_banner_offers_png_download() {
    let banner = reference_png();
    let server = asset_server("/out/banner.png", banner.clone()).await;
    let locator = format!("{}/out/banner.png", server.uri());
    let generator = StubGenerator::new(locator.clone());

    let response = app(generator.clone())
        .oneshot(form_request(
            &[
                ("text", "A woman is holding a case."),
                ("menu", "Banner"),
                ("aspect_ratio", "square"),
            ],
            Some(reference_png().as_slice()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["file_name"], "generated_banner.png");
    assert_eq!(body["mime_type"], "image/png");
    assert_eq!(body["locator"], locator.as_str());
    assert_eq!(base64::decode(body["data_url"].as_str().unwrap()).unwrap(), banner);

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "A woman is holding a case.");
    assert_eq!(requests[0].content_type, ContentType::Banner);
    assert_eq!(requests[0].aspect_ratio, AspectRatio::Square);
    assert_eq!(base64::decode(&requests[0].image).unwrap(), reference_png());
}

#[tokio::test]
async fn test_short_video_offers_mp4_download() {
    let server = asset_server("/out/video.mp4", MP4_BYTES.to_vec()).await;
    let generator = StubGenerator::new(format!("{}/out/video.mp4", server.uri()));

    let response = app(generator)
        .oneshot(form_request(
            &[
                ("text", "A woman is holding a case."),
                ("menu", "Short video"),
                ("aspect_ratio", "square"),
            ],
            Some(reference_png().as_slice()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["file_name"], "generated_video.mp4");
    assert_eq!(body["mime_type"], "video/mp4");
    assert!(body["data_url"].as_str().unwrap().starts_with("data:video/mp4;base64,"));
}

#[tokio::test]
async fn test_missing_image_makes_no_remote_call() {
    let generator = StubGenerator::new("http://unused/asset.png".to_string());

    let response = app(generator.clone())
        .oneshot(form_request(&[("text", "hello"), ("menu", "Banner")], None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_empty_file_part_counts_as_missing() {
    let generator = StubGenerator::new("http://unused/asset.png".to_string());

    let response = app(generator.clone())
        .oneshot(form_request(&[("menu", "Banner")], Some(b"".as_slice())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_fetch_failure_reports_status_and_locator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let locator = format!("{}/out/gone.mp4", server.uri());
    let generator = StubGenerator::new(locator.clone());

    let response = app(generator)
        .oneshot(form_request(&[("menu", "Short video")], Some(reference_png().as_slice())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "fetch_error");
    assert_eq!(body["error"]["status_code"], 404);
    assert_eq!(body["error"]["locator"], locator.as_str());
}

#[tokio::test]
async fn test_unrenderable_asset_reports_locator() {
    let server = asset_server("/out/banner.png", b"<html>expired</html>".to_vec()).await;
    let locator = format!("{}/out/banner.png", server.uri());
    let generator = StubGenerator::new(locator.clone());

    let response = app(generator)
        .oneshot(form_request(&[("menu", "Banner")], Some(reference_png().as_slice())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "render_error");
    assert_eq!(body["error"]["locator"], locator.as_str());
}

#[tokio::test]
async fn test_unknown_menu_is_rejected() {
    let generator = StubGenerator::new("http://unused/asset.png".to_string());

    let response = app(generator.clone())
        .oneshot(form_request(&[("menu", "Poster")], Some(reference_png().as_slice())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_misconfigured_studio_refuses_generation() {
    let state = AppState::new(
        Settings::default(),
        Err(AppError::MissingSecrets(vec!["API_KEY_1"])),
    );
    let app = create_router(Arc::new(state));

    let response = app
        .clone()
        .oneshot(form_request(&[("menu", "Banner")], Some(reference_png().as_slice())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "configuration_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("API_KEY_1"));

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = json_body(health).await;
    assert_eq!(body["status"], "misconfigured");
}

#[tokio::test]
async fn test_index_serves_form() {
    let generator = StubGenerator::new("http://unused/asset.png".to_string());

    let response = app(generator)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/generate"));
}
