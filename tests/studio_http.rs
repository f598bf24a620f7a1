use actix_web::{
    cookie::Cookie,
    http::{header, StatusCode},
    test, web, App,
};
use async_trait::async_trait;
use mannequin_muse::{
    studio::{routes, AppState},
    EncodedImage, ImageGenerator, ServerConfig, StudioError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BOUNDARY: &str = "----studio-test-boundary";

struct FakeGenerator {
    calls: AtomicUsize,
    fail_on: Option<usize>,
}

impl FakeGenerator {
    fn new(fail_on: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_on,
        })
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate_one(
        &self,
        reference: &EncodedImage,
        brand_name: &str,
    ) -> mannequin_muse::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        if self.fail_on == Some(n) {
            return Err(StudioError::Generation(format!("call {} rejected", n)));
        }
        Ok(format!("data:{};base64,{}{}", reference.mime_type, brand_name, n))
    }
}

fn multipart_body(file: Option<(&str, &str, &[u8])>, brand: &str, count: u8) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((name, mime, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, mime
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"brand_name\"\r\n\r\n{brand}\r\n--{b}\r\nContent-Disposition: form-data; name=\"image_count\"\r\n\r\n{count}\r\n--{b}--\r\n",
            b = BOUNDARY,
            brand = brand,
            count = count
        )
        .as_bytes(),
    );
    body
}

fn post(uri: &str, cookie: &Cookie<'static>, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

macro_rules! studio_app {
    ($generator:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($generator, &$config)))
                .configure(routes),
        )
        .await
    };
}

macro_rules! open_session {
    ($app:expr) => {{
        let resp = test::call_service(&$app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.response()
            .cookies()
            .find(|c| c.name() == "studio_session")
            .expect("session cookie")
            .into_owned()
    }};
}

macro_rules! page {
    ($app:expr, $cookie:expr) => {{
        let req = test::TestRequest::get()
            .uri("/")
            .cookie($cookie.clone())
            .to_request();
        let body = test::call_and_read_body(&$app, req).await;
        String::from_utf8(body.to_vec()).unwrap()
    }};
}

macro_rules! settled_page {
    ($app:expr, $cookie:expr) => {{
        let mut html = page!($app, $cookie);
        for _ in 0..100 {
            if !html.contains("Generating your editorial photos") {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(20)).await;
            html = page!($app, $cookie);
        }
        html
    }};
}

#[actix_web::test]
async fn test_generate_two_images() {
    let generator = FakeGenerator::new(None);
    let app = studio_app!(generator.clone(), ServerConfig::default());
    let cookie = open_session!(app);

    let body = multipart_body(Some(("dress.png", "image/png", &b"\x89PNG"[..])), "Elegance", 2);
    let resp = test::call_service(&app, post("/generate", &cookie, body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let html = settled_page!(app, cookie);
    assert!(html.contains("Generated Images"));
    assert!(html.contains("data:image/png;base64,Elegance0"));
    assert!(html.contains("data:image/png;base64,Elegance1"));
    assert!(!html.contains("Generation Failed"));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn test_one_failure_shows_error_and_no_results() {
    let generator = FakeGenerator::new(Some(1));
    let app = studio_app!(generator.clone(), ServerConfig::default());
    let cookie = open_session!(app);

    let body = multipart_body(Some(("dress.png", "image/png", &b"\x89PNG"[..])), "Elegance", 3);
    test::call_service(&app, post("/generate", &cookie, body).to_request()).await;

    let html = settled_page!(app, cookie);
    assert!(html.contains("Generation Failed"));
    assert!(!html.contains("Generated Images"));
    assert!(!html.contains("call 1 rejected"));
}

#[actix_web::test]
async fn test_generate_without_reference_is_guarded() {
    let generator = FakeGenerator::new(None);
    let app = studio_app!(generator.clone(), ServerConfig::default());
    let cookie = open_session!(app);

    test::call_service(&app, post("/generate", &cookie, multipart_body(None, "Elegance", 1)).to_request()).await;

    let html = page!(app, cookie);
    assert!(html.contains("Please upload a reference image."));
    assert!(!html.contains("Generating your editorial photos"));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_upload_then_preview() {
    let app = studio_app!(FakeGenerator::new(None), ServerConfig::default());
    let cookie = open_session!(app);

    let body = multipart_body(Some(("look.gif", "image/gif", &b"GIF89a"[..])), "Noir", 4);
    let resp = test::call_service(&app, post("/reference", &cookie, body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let html = page!(app, cookie);
    assert!(html.contains("/reference/preview?v="));
    assert!(html.contains("value=\"Noir\""));
    assert!(html.contains("<button type=\"submit\">Generate Photos</button>"));

    let req = test::TestRequest::get()
        .uri("/reference/preview")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/gif");
    assert_eq!(&test::read_body(resp).await[..], b"GIF89a");
}

#[actix_web::test]
async fn test_non_image_and_oversized_uploads_are_rejected() {
    let config = ServerConfig::default().with_max_upload_bytes(8);
    let app = studio_app!(FakeGenerator::new(None), config);
    let cookie = open_session!(app);

    let body = multipart_body(Some(("notes.txt", "text/plain", &b"hello"[..])), "Elegance", 1);
    test::call_service(&app, post("/reference", &cookie, body).to_request()).await;
    let html = page!(app, cookie);
    assert!(html.contains("not an image type"));
    assert!(!html.contains("/reference/preview?v="));

    let body = multipart_body(Some(("big.png", "image/png", &[0u8; 32][..])), "Elegance", 1);
    test::call_service(&app, post("/reference", &cookie, body).to_request()).await;
    let html = page!(app, cookie);
    assert!(html.contains("larger than"));
    assert!(!html.contains("/reference/preview?v="));
}

#[actix_web::test]
async fn test_oversized_brand_name_is_rejected() {
    let config = ServerConfig::default().with_max_upload_bytes(8);
    let app = studio_app!(FakeGenerator::new(None), config);
    let cookie = open_session!(app);

    let long_brand = "B".repeat(64 * 1024);
    let body = multipart_body(None, &long_brand, 1);
    test::call_service(&app, post("/reference", &cookie, body).to_request()).await;

    let html = page!(app, cookie);
    assert!(html.contains("brand_name field is longer than 256 bytes"));
    assert!(!html.contains(&long_brand));
    assert!(html.contains("value=\"Elegance\""));
}

#[actix_web::test]
async fn test_health() {
    let app = studio_app!(FakeGenerator::new(None), ServerConfig::default());
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
