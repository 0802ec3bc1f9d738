//! Router tests, driven in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use tempdash::*;
use tower::ServiceExt;

fn setup() -> (Arc<DashState>, Router) {
    let state = Arc::new(DashState::new(DashConfig::default(), Store::default()));
    (state.clone(), router(state))
}

async fn body_string(resp: axum::response::Response) -> String {
    let b = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(b.to_vec()).unwrap()
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn threshold_is_stored_as_adc_code() {
    let (state, app) = setup();

    let resp = app.clone().oneshot(form("/threshold", "threshold=25")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "Threshold saved ✔");
    assert_eq!(state.store.snapshot().config.threshold, Some(718));

    let resp = app.oneshot(get("/config")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let j: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(j["threshold"], 718);
    assert_eq!(j["thresholdC"], "25.0");
}

/// Next `data:` payload from an event stream body, as JSON.
async fn next_event(
    body: &mut (impl futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin),
    buf: &mut String,
) -> serde_json::Value {
    loop {
        if let Some(end) = buf.find("\n\n") {
            let frame: String = buf.drain(..end + 2).collect();
            if let Some(data) = frame.lines().find_map(|l| l.strip_prefix("data:")) {
                return serde_json::from_str(data.trim_start()).unwrap();
            }
            continue;
        }
        let chunk = body.next().await.expect("stream ended").unwrap();
        buf.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

#[tokio::test]
async fn events_stream_current_then_each_write() {
    let (state, app) = setup();
    state.store.set_temperature(Some(21.04));

    let resp = app.oneshot(get("/events")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut body = resp.into_body().into_data_stream();
    let mut buf = String::new();

    let first = next_event(&mut body, &mut buf).await;
    assert_eq!(first["temp"]["display"], "21.0");
    assert_eq!(first["temp"]["status"], STATUS_LIVE);
    assert_eq!(first["config"]["thresholdStatus"], THRESHOLD_MISSING);

    state.store.set_threshold(291);
    let second = next_event(&mut body, &mut buf).await;
    assert_eq!(second["config"]["threshold"], 291);
    assert_eq!(second["config"]["thresholdC"], "50.0");
    assert_eq!(second["temp"]["display"], "21.0");
}

#[tokio::test]
async fn threshold_uses_number_coercion() {
    let (state, app) = setup();

    for text in ["inf", "infinity", "-INF", "nan"] {
        let resp = app
            .clone()
            .oneshot(form("/threshold", &format!("threshold={text}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{text}");
        assert_eq!(state.store.snapshot().config.threshold, None, "{text}");
    }

    let resp = app.clone().oneshot(form("/threshold", "threshold=0x10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(state.store.snapshot().config.threshold, Some(celsius_to_adc(16.0)));
    assert_eq!(state.store.snapshot().config.threshold, Some(991));
}

#[tokio::test]
async fn threshold_rejects_text() {
    let (state, app) = setup();

    let resp = app.oneshot(form("/threshold", "threshold=warm")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Please enter a number");
    assert_eq!(state.store.snapshot().config.threshold, None);
}

#[tokio::test]
async fn colors_are_clamped() {
    let (state, app) = setup();

    let resp = app
        .clone()
        .oneshot(form("/color/normal", "r=12.5&g=300&b=-4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "Normal color saved ✔");

    let resp = app.oneshot(form("/color/alert", "r=255&g=abc&b=")).await.unwrap();
    assert_eq!(body_string(resp).await, "Alert color saved ✔");

    let cfg = state.store.snapshot().config;
    assert_eq!(cfg.normal(), Rgb::new(13, 255, 0));
    assert_eq!(cfg.alert(), Rgb::new(255, 0, 0));
}

#[tokio::test]
async fn device_push_shows_up_as_live() {
    let (_state, app) = setup();

    let resp = app.clone().oneshot(get("/temp")).await.unwrap();
    let j: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(j["display"], "--");
    assert_eq!(j["status"], STATUS_WAITING);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/temp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"adc": 718}"#))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get("/temp")).await.unwrap();
    let j: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(j["display"], "25.0");
    assert_eq!(j["status"], STATUS_LIVE);
}

#[tokio::test]
async fn device_push_of_rail_code_is_no_data() {
    let (state, app) = setup();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/temp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"adc": 4095}"#))
        .unwrap();
    app.clone().oneshot(req).await.unwrap();
    assert_eq!(state.store.snapshot().sensor.temperature, None);

    let resp = app.oneshot(get("/temp")).await.unwrap();
    let j: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(j["status"], STATUS_NO_DATA);
}

#[tokio::test]
async fn index_renders_store_values() {
    let (state, app) = setup();
    state.store.set_threshold(291);
    state.store.update_alert(Rgb::new(200, 10, 10));
    state.store.set_temperature(Some(21.04));

    let resp = app.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains(r#"value="50.0""#));
    assert!(html.contains("rgb(200, 10, 10)"));
    assert!(html.contains("21.0"));
    assert!(html.contains(STATUS_LIVE));
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let (_state, app) = setup();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/threshold")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn uptime_reports_counter() {
    let (state, app) = setup();
    *state.uptime.write().await = 3661;
    let resp = app.oneshot(get("/uptime")).await.unwrap();
    let j: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(j["uptime"], 3661);
    assert_eq!(j["uptime_s"], "01:01:01");
}
