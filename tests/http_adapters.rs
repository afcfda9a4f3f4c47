//! HTTP adapter integration tests against a local axum stub

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde_json::json;

use qc_console::application::ports::{
    CameraDevicePort, CameraError, CaptureStream, FrameSize, HistoryError, HistoryServicePort,
    InspectionError, InspectionServicePort,
};
use qc_console::domain::history::{HistoryFilter, HistoryQuery};
use qc_console::domain::inspection::{ImagePayload, MeasurementKind, ReportedVerdict, Verdict};
use qc_console::infrastructure::adapters::{
    HttpHistoryClient, HttpHistoryClientConfig, HttpInspectionClient, HttpInspectionClientConfig,
    MjpegCameraConfig, MjpegCameraDevice,
};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn qc_upload(mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        if bytes.is_empty() || content_type != "image/jpeg" {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid image"})))
                .into_response();
        }
        return Json(json!({
            "status": "PASS",
            "items": [
                {"class": "fillet", "weight": 120.5, "ratio": 80.01, "color": "#2ecc71"},
                {"class": "bone", "weight": 30.1, "ratio": 19.99, "color": "#e74c3c"}
            ],
            "total_weight": 150.6,
            "created_at": "2024-05-01T10:00:00",
            "image_url": format!("/static/uploads/{}", file_name),
            "overlay_url": ""
        }))
        .into_response();
    }
    (StatusCode::BAD_REQUEST, Json(json!({"error": "No file"}))).into_response()
}

async fn qc_camera() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "Camera not ready"})),
    )
        .into_response()
}

async fn qc_history(Query(params): Query<HashMap<String, String>>) -> Response {
    match (params.get("range").map(String::as_str), params.get("date").map(String::as_str)) {
        (None, None) => Json(json!([
            {
                "id_qc": 2,
                "image_name": "b.jpg",
                "total_weight": 80.0,
                "status": "FAIL",
                "created_at": "2024-05-02T08:00:00",
                "items": [{"class": "bone", "weight": 80.0, "ratio": 1.0}]
            },
            {
                "id_qc": 1,
                "image_name": "a.jpg",
                "total_weight": 150.6,
                "status": "PASS",
                "created_at": "2024-05-01T10:00:00",
                "items": []
            }
        ]))
        .into_response(),
        (Some("day"), Some("2024-05-01")) => Json(json!([])).into_response(),
        (Some("month"), _) => Json(json!({"message": "not a list"})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn qc_app() -> Router {
    Router::new()
        .route("/qc", post(qc_upload))
        .route("/qc/camera", post(qc_camera))
        .route("/qc/history", get(qc_history))
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]));
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 85)
        .encode_image(&img)
        .unwrap();
    buf
}

#[tokio::test]
async fn test_upload_round_trip() {
    let base = serve(qc_app()).await;
    let client = HttpInspectionClient::new(HttpInspectionClientConfig::new(base)).unwrap();
    let payload = ImagePayload::from_upload(Path::new("/data/tray.jpg"), jpeg(8, 8)).unwrap();

    let result = client.inspect(&payload).await.unwrap();
    assert_eq!(result.verdict(), &ReportedVerdict::Known(Verdict::Pass));
    assert_eq!(result.kind(), MeasurementKind::Weight);
    assert_eq!(result.total(), 150.6);
    assert_eq!(result.measures().len(), 2);
    assert_eq!(result.measures()[0].category, "fillet");
    assert!((result.measures()[0].share.value() - 80.01).abs() < 1e-9);
    assert_eq!(
        result.images().image_url.as_deref(),
        Some("/static/uploads/tray.jpg")
    );
    assert!(result.images().overlay_pair().is_none());
    assert!(result.created_at().and_then(|ts| ts.instant()).is_some());
}

#[tokio::test]
async fn test_server_capture_error_body() {
    let base = serve(qc_app()).await;
    let client = HttpInspectionClient::new(HttpInspectionClientConfig::new(base)).unwrap();

    match client.inspect_server_capture().await {
        Err(InspectionError::ServiceError(message)) => {
            assert_eq!(message, "HTTP 503: Camera not ready");
        }
        other => panic!("unexpected: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_inspection_service_unreachable() {
    let client =
        HttpInspectionClient::new(HttpInspectionClientConfig::new("http://127.0.0.1:1")).unwrap();
    let payload = ImagePayload::from_upload(Path::new("a.png"), vec![1, 2, 3]).unwrap();
    let err = client.inspect(&payload).await.unwrap_err();
    assert!(matches!(err, InspectionError::NetworkError(_)));
}

#[tokio::test]
async fn test_history_queries() {
    let base = serve(qc_app()).await;
    let client = HttpHistoryClient::new(HttpHistoryClientConfig::new(base)).unwrap();

    let all = client.fetch(&HistoryQuery::All).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|r| r.id().value()).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!((all[0].items()[0].share.value() - 100.0).abs() < 1e-9);

    let day = HistoryQuery::Filtered(HistoryFilter::parse("day", "2024-05-01").unwrap());
    assert!(client.fetch(&day).await.unwrap().is_empty());

    let month = HistoryQuery::Filtered(HistoryFilter::parse("month", "2024-05-01").unwrap());
    assert!(client.fetch(&month).await.unwrap().is_empty());

    let year = HistoryQuery::Filtered(HistoryFilter::parse("year", "2024-05-01").unwrap());
    assert!(matches!(
        client.fetch(&year).await,
        Err(HistoryError::ServiceError(_))
    ));
}

#[tokio::test]
async fn test_mjpeg_stream_frames() {
    let frame = jpeg(40, 30);
    let app = Router::new().route(
        "/cctv",
        get(move || {
            let frame = frame.clone();
            async move {
                let mut part = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
                part.extend_from_slice(&frame);
                part.extend_from_slice(b"\r\n");
                let parts = vec![Ok::<_, std::io::Error>(part.clone()), Ok(part)];
                let body = futures_util::stream::iter(parts).chain(futures_util::stream::pending());
                (
                    [(
                        header::CONTENT_TYPE,
                        "multipart/x-mixed-replace; boundary=frame",
                    )],
                    Body::from_stream(body),
                )
            }
        }),
    );
    let base = serve(app).await;

    let device = MjpegCameraDevice::new(MjpegCameraConfig::new(base)).unwrap();
    let stream = device.open().await.unwrap();
    assert!(stream.device_label().contains("/cctv"));

    let mut size = None;
    for _ in 0..200 {
        size = stream.native_size();
        if size.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(size, Some(FrameSize::new(40, 30)));

    let latest = stream.latest_frame().unwrap();
    assert_eq!(latest.size, FrameSize::new(40, 30));
    assert_eq!(latest.rgb.len(), 40 * 30 * 3);

    stream.stop();
    assert!(!stream.is_live());
    assert!(stream.latest_frame().is_none());
}

#[tokio::test]
async fn test_mjpeg_forbidden_is_permission_denied() {
    let app = Router::new().route("/cctv", get(|| async { StatusCode::FORBIDDEN }));
    let base = serve(app).await;

    let device = MjpegCameraDevice::new(MjpegCameraConfig::new(base)).unwrap();
    assert!(matches!(
        device.open().await,
        Err(CameraError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_mjpeg_not_ready_is_unavailable() {
    let app = Router::new().route(
        "/cctv",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = serve(app).await;

    let device = MjpegCameraDevice::new(MjpegCameraConfig::new(base)).unwrap();
    assert!(matches!(
        device.open().await,
        Err(CameraError::DeviceUnavailable(_))
    ));
}
