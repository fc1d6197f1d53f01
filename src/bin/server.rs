//! HTTP/WebSocket surface over the recognition pipeline. Every handler here
//! is decode→pipeline→serde_json glue; no DSP logic lives in this binary.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State, WebSocketUpgrade};
use axum::extract::ws::{Message, WebSocket};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use shazam_core::config::Config;
use shazam_core::store::postgres::PostgresStore;
use shazam_core::{decode, pipeline, FingerprintStore, Match, ShazamError, Song, SongId};

#[derive(Clone)]
struct AppState {
    store: Arc<dyn FingerprintStore>,
}

#[tokio::main]
async fn main() {
    Config::init_logging();
    let config = Config::from_env();

    let store = PostgresStore::connect(&config.database_url)
        .expect("failed to connect to the fingerprint store");
    let state = AppState {
        store: Arc::new(store),
    };

    let app = Router::new()
        .route("/songs", post(ingest_song).get(list_placeholder))
        .route("/songs/{id}", get(get_song))
        .route("/query", post(query_song))
        .route("/ws/listen", get(ws_listen))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await.expect("server crashed");
}

fn shazam_error_status(err: &ShazamError) -> StatusCode {
    match err {
        ShazamError::DecodeFailure(_) | ShazamError::EmptyResult => StatusCode::UNPROCESSABLE_ENTITY,
        ShazamError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        ShazamError::DuplicateKey(_) => StatusCode::CONFLICT,
        ShazamError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = shazam_error_status(&self.0);
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

struct ApiError(ShazamError);
impl From<ShazamError> for ApiError {
    fn from(err: ShazamError) -> Self {
        ApiError(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct IngestResponse {
    song_id: SongId,
    fingerprint_count: usize,
}

/// Buffers a multipart upload to a temp file so it can be handed to the same
/// file-path-based decoder the CLI uses.
async fn save_upload(mut multipart: Multipart) -> Result<(PathBuf, Option<String>, Option<String>), ApiError> {
    let mut path = None;
    let mut title = None;
    let mut artist = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(ShazamError::InvalidParameter(e.to_string())))?
    {
        match field.name().unwrap_or_default() {
            "title" => {
                title = Some(field.text().await.unwrap_or_default());
            }
            "artist" => {
                artist = Some(field.text().await.unwrap_or_default());
            }
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError(ShazamError::DecodeFailure(e.to_string())))?;
                let tmp = std::env::temp_dir().join(format!(
                    "shazam-upload-{}.audio",
                    uuid_like_suffix()
                ));
                tokio::fs::write(&tmp, &bytes)
                    .await
                    .map_err(|e| ApiError(ShazamError::DecodeFailure(e.to_string())))?;
                path = Some(tmp);
            }
            _ => {}
        }
    }

    let path = path.ok_or_else(|| {
        ApiError(ShazamError::InvalidParameter("missing \"file\" field".into()))
    })?;
    Ok((path, title, artist))
}

fn uuid_like_suffix() -> u64 {
    use rand::Rng;
    rand::rng().random()
}

async fn ingest_song(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, ApiError> {
    let (path, title, artist) = save_upload(multipart).await?;
    let title = title.ok_or_else(|| ApiError(ShazamError::InvalidParameter("missing title".into())))?;
    let artist = artist.ok_or_else(|| ApiError(ShazamError::InvalidParameter("missing artist".into())))?;

    let audio = decode::decode_file(&path).map_err(ApiError)?;
    let _ = tokio::fs::remove_file(&path).await;

    let report = pipeline::ingest(
        state.store.as_ref(),
        &audio.samples,
        audio.sample_rate,
        audio.duration_seconds,
        &title,
        &artist,
    )?;

    Ok(Json(IngestResponse {
        song_id: report.song_id,
        fingerprint_count: report.fingerprint_count,
    }))
}

async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<SongId>,
) -> Result<Json<Song>, ApiError> {
    match state.store.get_song_by_id(id)? {
        Some(song) => Ok(Json(song)),
        None => Err(ApiError(ShazamError::InvalidParameter(format!(
            "no song with id {id}"
        )))),
    }
}

async fn list_placeholder(State(state): State<AppState>) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.store.total_songs()?))
}

async fn query_song(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<Match>>, ApiError> {
    let (path, _title, _artist) = save_upload(multipart).await?;
    let audio = decode::decode_file(&path).map_err(ApiError)?;
    let _ = tokio::fs::remove_file(&path).await;

    let matches = pipeline::query(
        state.store.as_ref(),
        &audio.samples,
        audio.sample_rate,
        audio.duration_seconds,
    )?;
    Ok(Json(matches))
}

/// A convenience transport, not real-time streaming recognition (that's
/// explicitly out of scope): the client streams PCM chunks, signals "done"
/// with an empty binary frame, and gets back one `query` result computed
/// over everything received so far.
async fn ws_listen(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: AppState) {
    let mut samples: Vec<f64> = Vec::new();
    let sample_rate: u32 = 11_025;

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Binary(chunk) if chunk.is_empty() => break,
            Message::Binary(chunk) => {
                samples.extend(
                    chunk
                        .chunks_exact(8)
                        .map(|b| f64::from_le_bytes(b.try_into().unwrap())),
                );
            }
            Message::Close(_) => return,
            _ => {}
        }
    }

    let duration_seconds = samples.len() as f64 / sample_rate as f64;
    let result = pipeline::query(state.store.as_ref(), &samples, sample_rate, duration_seconds);

    let payload = match result {
        Ok(matches) => serde_json::to_string(&matches).unwrap_or_else(|_| "[]".to_string()),
        Err(err) => serde_json::json!({ "error": err.to_string() }).to_string(),
    };
    let _ = socket.send(Message::Text(payload.into())).await;
}
