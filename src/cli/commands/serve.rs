//! HTTP API server for browser front ends.
//!
//! Exposes every page as a JSON endpoint. Chat sessions live in memory for the
//! lifetime of the server; a single lock serializes chat exchanges.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings};
use crate::error::HubError;
use crate::hub::{Hub, Page};
use crate::session::{ChatMessage, SessionStore, Surface};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
pub struct AppState {
    hub: Hub,
    sessions: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self {
            hub,
            sessions: Mutex::new(SessionStore::new()),
        }
    }
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
    keys: ApiKeys,
) -> anyhow::Result<()> {
    let hub = Hub::new(&settings, &keys)?;
    let state = Arc::new(AppState::new(hub));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Fusion Hub API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Pages", "GET  /surfaces");
    Output::kv("Chat history", "GET  /chat/{surface}");
    Output::kv("Chat", "POST /chat/{surface}");
    Output::kv("Caption", "POST /caption");
    Output::kv("Audio", "POST /audio");
    Output::kv("Video", "POST /video");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    info!("Serving on {}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/surfaces", get(list_pages))
        .route("/chat/{surface}", get(chat_history).post(chat))
        .route("/caption", post(caption))
        .route("/audio", post(audio))
        .route("/video", post(video))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct PageInfo {
    page: Page,
    title: &'static str,
}

#[derive(Serialize)]
struct HistoryResponse {
    surface: String,
    history: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    history: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct CaptionRequest {
    file_name: String,
    image_base64: String,
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Deserialize)]
struct AudioRequest {
    file_name: String,
    data_base64: String,
}

#[derive(Serialize)]
struct TextResponse {
    text: String,
}

#[derive(Deserialize)]
struct VideoRequest {
    url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(err: HubError) -> Response {
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn decode_base64(data: &str, what: &str) -> Result<Vec<u8>, HubError> {
    BASE64
        .decode(data.trim())
        .map_err(|e| HubError::InvalidInput(format!("{} is not valid base64: {}", what, e)))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_pages() -> impl IntoResponse {
    Json(
        Page::ALL
            .iter()
            .map(|page| PageInfo {
                page: *page,
                title: page.title(),
            })
            .collect::<Vec<_>>(),
    )
}

async fn chat_history(
    State(state): State<Arc<AppState>>,
    Path(surface): Path<String>,
) -> Response {
    let surface: Surface = match surface.parse() {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_or_create(surface.id());
    Json(HistoryResponse {
        surface: session.surface_id().to_string(),
        history: session.history().to_vec(),
    })
    .into_response()
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Path(surface): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let surface: Surface = match surface.parse() {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let mut sessions = state.sessions.lock().await;
    match state.hub.chat(&mut sessions, surface, &req.prompt).await {
        Ok(reply) => Json(ChatResponse {
            reply,
            history: sessions
                .get(surface.id())
                .map(|s| s.history().to_vec())
                .unwrap_or_default(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn caption(State(state): State<Arc<AppState>>, Json(req): Json<CaptionRequest>) -> Response {
    let image = match decode_base64(&req.image_base64, "image_base64") {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e),
    };

    match state
        .hub
        .caption(&req.file_name, &image, req.prompt.as_deref())
        .await
    {
        Ok(text) => Json(TextResponse { text }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn audio(State(state): State<Arc<AppState>>, Json(req): Json<AudioRequest>) -> Response {
    let data = match decode_base64(&req.data_base64, "data_base64") {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e),
    };

    match state.hub.summarize_audio(&req.file_name, &data).await {
        Ok(text) => Json(TextResponse { text }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn video(State(state): State<Arc<AppState>>, Json(req): Json<VideoRequest>) -> Response {
    match state.hub.summarize_video(&req.url).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::error::Result;
    use crate::gateway::{ChatModel, MediaModel};
    use crate::staging::Stager;
    use crate::transcript::{CaptionSegment, TranscriptFetcher, TranscriptSource};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::collections::HashMap;

    struct Echo;

    #[async_trait]
    impl ChatModel for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn completion(&self, history: &[ChatMessage], new_prompt: &str) -> Result<String> {
            if new_prompt == "fail" {
                return Err(HubError::Upstream("model unavailable".to_string()));
            }
            Ok(format!("{} after {}", new_prompt, history.len()))
        }
    }

    #[async_trait]
    impl MediaModel for Echo {
        async fn caption(&self, prompt: &str, image: &[u8]) -> Result<String> {
            Ok(format!("{}: {}", prompt, String::from_utf8_lossy(image)))
        }

        async fn summarize_audio(&self, _file_path: &std::path::Path) -> Result<String> {
            Ok("audio summary".to_string())
        }

        async fn summarize_text(&self, prompt_prefix: &str, text: &str) -> Result<String> {
            Ok(format!("{}{}", prompt_prefix, text))
        }
    }

    #[async_trait]
    impl TranscriptSource for Echo {
        async fn segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>> {
            Ok(vec![CaptionSegment::new(video_id, 0.0, 1.0)])
        }
    }

    fn state(dir: &std::path::Path) -> Arc<AppState> {
        let echo = Arc::new(Echo);
        let mut models: HashMap<Surface, Arc<dyn ChatModel>> = HashMap::new();
        models.insert(Surface::Gemini, echo.clone());
        models.insert(Surface::Llama, echo.clone());
        let hub = Hub::with_components(
            Prompts {
                video: "Notes on ".to_string(),
                ..Prompts::default()
            },
            models,
            echo.clone(),
            TranscriptFetcher::new(echo),
            Stager::new(dir),
        );
        Arc::new(AppState::new(hub))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let first = chat(
            State(state.clone()),
            Path("gemini".to_string()),
            Json(ChatRequest { prompt: "hi".to_string() }),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await["reply"], "hi after 0");

        let second = chat(
            State(state.clone()),
            Path("gemini".to_string()),
            Json(ChatRequest { prompt: "again".to_string() }),
        )
        .await;
        let json = body_json(second).await;
        assert_eq!(json["reply"], "again after 2");
        assert_eq!(json["history"].as_array().unwrap().len(), 4);
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][1]["role"], "assistant");

        let history = chat_history(State(state), Path("llama".to_string())).await;
        let json = body_json(history).await;
        assert_eq!(json["surface"], "llama");
        assert!(json["history"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_chat_returns_bad_gateway_and_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let response = chat(
            State(state.clone()),
            Path("llama".to_string()),
            Json(ChatRequest { prompt: "fail".to_string() }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("model unavailable"));

        let sessions = state.sessions.lock().await;
        assert!(sessions.get("llama").unwrap().history().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_surface_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = chat_history(State(state(dir.path())), Path("bard".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_caption_and_audio_decode_base64() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let response = caption(
            State(state.clone()),
            Json(CaptionRequest {
                file_name: "pixels.png".to_string(),
                image_base64: BASE64.encode(b"pixels"),
                prompt: Some("describe".to_string()),
            }),
        )
        .await;
        assert_eq!(body_json(response).await["text"], "describe: pixels");

        let response = audio(
            State(state.clone()),
            Json(AudioRequest {
                file_name: "talk.wav".to_string(),
                data_base64: BASE64.encode(b"RIFF"),
            }),
        )
        .await;
        assert_eq!(body_json(response).await["text"], "audio summary");

        let response = caption(
            State(state),
            Json(CaptionRequest {
                file_name: "pixels.png".to_string(),
                image_base64: "not base64!".to_string(),
                prompt: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_caption_rejects_gif_upload() {
        let dir = tempfile::tempdir().unwrap();
        let response = caption(
            State(state(dir.path())),
            Json(CaptionRequest {
                file_name: "photo.gif".to_string(),
                image_base64: BASE64.encode(b"GIF89a"),
                prompt: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("photo.gif"));
    }

    #[tokio::test]
    async fn test_video_summary() {
        let dir = tempfile::tempdir().unwrap();
        let response = video(
            State(state(dir.path())),
            Json(VideoRequest {
                url: "https://www.youtube.com/watch?v=XYZ".to_string(),
            }),
        )
        .await;

        let json = body_json(response).await;
        assert_eq!(json["video_id"], "XYZ");
        assert_eq!(json["notes"], "Notes on XYZ");
        assert_eq!(json["thumbnail_url"], "http://img.youtube.com/vi/XYZ/0.jpg");
    }

    #[test]
    fn test_router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let _router = router(state(dir.path()));
    }
}
