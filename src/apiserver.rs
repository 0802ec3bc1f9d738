// apiserver.rs

use std::convert::Infallible;

use askama::Template;
use axum::{
    body::Body,
    extract::{Form, State},
    http::{header, Response, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    routing::*,
    Json, Router,
};
pub use axum_macros::debug_handler;
use futures::stream::{self, Stream};
use tower_http::trace::TraceLayer;

use crate::*;

#[derive(Template)]
#[template(path = "index.html.ask", escape = "html")]
pub struct IndexPage {
    pub version: &'static str,
    pub temp: TempView,
    pub config: ConfigView,
}

#[derive(Clone, Debug, Serialize)]
struct LiveUpdate {
    temp: TempView,
    config: ConfigView,
}

pub fn router(state: Arc<DashState>) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/form.js", get(get_formjs))
        .route("/index.css", get(get_indexcss))
        .route("/uptime", get(get_uptime))
        .route("/temp", get(get_temp).post(post_temp).options(options))
        .route("/config", get(get_config))
        .route("/threshold", post(post_threshold).options(options))
        .route("/color/normal", post(post_normal).options(options))
        .route("/color/alert", post(post_alert).options(options))
        .route("/events", get(get_events))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_api_server(state: Arc<DashState>) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening to {addr}");
    Ok(axum::serve(listener, app.into_make_service()).await?)
}

pub async fn options(State(state): State<Arc<DashState>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} options()");

    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "get,post"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "content-type"),
        ],
    )
        .into_response()
}

pub async fn get_index(State(state): State<Arc<DashState>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_index()");

    let snap = state.store.snapshot();
    let page = IndexPage {
        version: APP_VERSION,
        temp: TempView::new(&snap.sensor),
        config: ConfigView::new(&snap.config),
    };
    let index = match page.render() {
        Err(e) => {
            let err_msg = format!("Index template error: {e:?}\n");
            error!("{err_msg}");
            return (StatusCode::INTERNAL_SERVER_ERROR, err_msg).into_response();
        }
        Ok(s) => s,
    };
    (StatusCode::OK, Html(index)).into_response()
}

pub async fn get_formjs(State(state): State<Arc<DashState>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_formjs()");

    let formjs = include_bytes!("form.js");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/javascript")],
        formjs.to_vec(),
    )
        .into_response()
}

pub async fn get_indexcss(State(state): State<Arc<DashState>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_indexcss()");

    let indexcss = include_bytes!("index.css");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        indexcss.to_vec(),
    )
        .into_response()
}

pub async fn get_uptime(State(state): State<Arc<DashState>>) -> (StatusCode, Json<Uptime>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_uptime()");

    let uptime = *state.uptime.read().await;
    let ret = Uptime {
        uptime,
        uptime_s: uptime_str(uptime),
    };
    (StatusCode::OK, Json(ret))
}

pub async fn get_temp(State(state): State<Arc<DashState>>) -> (StatusCode, Json<TempView>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_temp()");

    let sensor = state.store.snapshot().sensor;
    (StatusCode::OK, Json(TempView::new(&sensor)))
}

pub async fn post_temp(
    State(state): State<Arc<DashState>>,
    Json(update): Json<TempUpdate>,
) -> (StatusCode, String) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} post_temp()");

    let t = update.celsius();
    if t.is_none() {
        error!("Device sent no usable reading: {update:?}");
    }
    state.store.set_temperature(t);
    (StatusCode::OK, "OK".to_string())
}

pub async fn get_config(State(state): State<Arc<DashState>>) -> (StatusCode, Json<ConfigView>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_config()");

    let config = state.store.snapshot().config;
    (StatusCode::OK, Json(ConfigView::new(&config)))
}

pub async fn post_threshold(
    State(state): State<Arc<DashState>>,
    Form(form): Form<ThresholdForm>,
) -> (StatusCode, String) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} post_threshold()");

    let target = match parse_number(&form.threshold) {
        Some(t) => t,
        None => {
            let msg = "Please enter a number";
            error!("{msg}: {:?}", form.threshold);
            return (StatusCode::BAD_REQUEST, msg.to_string());
        }
    };

    let adc = celsius_to_adc(target);
    info!("Threshold {target} C -> adc {adc}");
    state.store.set_threshold(adc);
    (StatusCode::OK, "Threshold saved ✔".to_string())
}

pub async fn post_normal(
    State(state): State<Arc<DashState>>,
    Form(form): Form<RgbForm>,
) -> (StatusCode, String) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} post_normal()");

    state.store.update_normal(Rgb::from_form(&form));
    (StatusCode::OK, "Normal color saved ✔".to_string())
}

pub async fn post_alert(
    State(state): State<Arc<DashState>>,
    Form(form): Form<RgbForm>,
) -> (StatusCode, String) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} post_alert()");

    state.store.update_alert(Rgb::from_form(&form));
    (StatusCode::OK, "Alert color saved ✔".to_string())
}

fn live_event(snap: &Snapshot) -> Event {
    let update = LiveUpdate {
        temp: TempView::new(&snap.sensor),
        config: ConfigView::new(&snap.config),
    };
    match Event::default().json_data(&update) {
        Ok(ev) => ev,
        Err(e) => {
            error!("Cannot encode live update: {e:?}");
            Event::default().comment("encode error")
        }
    }
}

/// Current snapshot first, then one event per store write.
pub async fn get_events(
    State(state): State<Arc<DashState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_events()");

    let mut rx = state.store.subscribe();
    rx.mark_changed();
    let events = stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snap = *rx.borrow_and_update();
        Some((Ok(live_event(&snap)), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

// EOF
