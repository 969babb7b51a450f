//! End-to-end tests of `DiagnosisService` against a mocked Gemini endpoint.

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zirave_core::{Config, DiagnosisService};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
        "usageMetadata": {"totalTokenCount": 120}
    })
}

fn service_for(server: &MockServer) -> DiagnosisService {
    let mut config = Config::default();
    config.gemini.api_key = "integration-key".to_string();
    config.gemini.endpoint = server.uri();
    DiagnosisService::new(&config).unwrap()
}

fn tiny_image(format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([20, 160, 40]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn tiny_png() -> Vec<u8> {
    tiny_image(image::ImageFormat::Png)
}

#[tokio::test]
async fn test_symptoms_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "integration-key"))
        .and(body_string_contains("tomato"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"diagnosis":"Blight","confidence":92,"causes":["fungus"],"severity":"high"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let resp = service
        .analyze_symptoms(
            "tomato",
            &["dark lesions".to_string()],
            Some("Antalya"),
            Some("summer"),
        )
        .await;

    assert!(!resp.is_error());
    assert_eq!(resp.get("confidence"), Some(&json!(92)));
    assert_eq!(resp.get("causes"), Some(&json!(["fungus"])));
    assert_eq!(resp.model(), Some("gemini-1.5-flash"));
    assert!(chrono::DateTime::parse_from_rfc3339(resp.timestamp().unwrap()).is_ok());
}

#[tokio::test]
async fn test_symptoms_prose_reply_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("not json")))
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .analyze_symptoms("wheat", &[], None, None)
        .await;
    assert_eq!(resp.raw_response(), Some("not json"));
    assert_eq!(resp.get("confidence"), Some(&json!(75)));
}

#[tokio::test]
async fn test_http_failure_becomes_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .analyze_symptoms("tomato", &[], None, None)
        .await;
    assert!(resp.is_error());
    assert!(resp.error().unwrap().contains("500"));
    assert_eq!(resp.get("confidence"), Some(&json!(0)));
    assert!(resp.model().is_none());
}

#[tokio::test]
async fn test_image_sent_inline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("\"mime_type\":\"image/png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"plant_type":"basil","health_status":"excellent"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resp = service_for(&server).analyze_image(&tiny_png(), None).await;
    assert_eq!(resp.get_str("plant_type"), Some("basil"));
    assert_eq!(resp.model(), Some("gemini-1.5-flash-vision"));
    assert_eq!(resp.get("image_analyzed"), Some(&json!(true)));
}

#[tokio::test]
async fn test_fenced_image_reply_falls_back_with_raw_text() {
    let fenced = "```json\n{\"plant_type\":\"basil\",\"health_status\":\"excellent\"}\n```";
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(fenced)))
        .expect(1)
        .mount(&server)
        .await;

    let resp = service_for(&server).analyze_image(&tiny_png(), None).await;
    assert!(!resp.is_error());
    assert_eq!(resp.raw_response(), Some(fenced));
    assert_eq!(resp.get("confidence"), Some(&json!(70)));
    assert_eq!(resp.model(), Some("gemini-1.5-flash-vision"));
    assert_eq!(resp.get("image_analyzed"), Some(&json!(true)));
}

#[tokio::test]
async fn test_bmp_upload_is_converted_to_png() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("\"mime_type\":\"image/png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"plant_type":"mint","health_status":"good"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .analyze_image(&tiny_image(image::ImageFormat::Bmp), None)
        .await;
    assert!(!resp.is_error());
    assert_eq!(resp.get_str("health_status"), Some("good"));
}

#[tokio::test]
async fn test_non_object_json_reply_becomes_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("[1,2]")))
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .analyze_symptoms("tomato", &[], None, None)
        .await;
    assert!(resp.is_error());
    assert_eq!(resp.get("confidence"), Some(&json!(0)));
    assert!(resp.raw_response().is_none());
    assert!(resp.model().is_none());
}

#[tokio::test]
async fn test_undecodable_image_never_reaches_gemini() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .analyze_image(b"GIF89a-but-not-really", Some("mint"))
        .await;
    assert!(resp.is_error());
    assert_eq!(resp.get("confidence"), Some(&json!(0)));
    assert_eq!(resp.get_str("plant_type"), Some("mint"));
}

#[tokio::test]
async fn test_advice_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("drip irrigation"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply("Water early in the morning.")),
        )
        .mount(&server)
        .await;

    let resp = service_for(&server)
        .get_agricultural_advice("How often should I water?", Some("drip irrigation"))
        .await;
    assert_eq!(resp.get_str("answer"), Some("Water early in the morning."));
    assert_eq!(resp.model(), Some("gemini-1.5-flash"));
}

#[tokio::test]
async fn test_unreachable_endpoint_becomes_error_record() {
    let mut config = Config::default();
    config.gemini.api_key = "k".to_string();
    // Port 9 (discard) on localhost is almost never listening.
    config.gemini.endpoint = "http://127.0.0.1:9".to_string();
    let service = DiagnosisService::new(&config).unwrap();

    let resp = service.get_agricultural_advice("q", None).await;
    assert!(resp.error().unwrap().starts_with("Gemini advice failed:"));
    assert!(resp.timestamp().is_some());
}
