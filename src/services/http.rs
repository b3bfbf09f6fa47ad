use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::analyze::AnalyzeRequest;
use super::pdfs::PdfRequest;
use super::users::UserRequest;
use super::wordbook::WordbookRequest;
use super::ServiceError;
use crate::repositories::etymology::EtymologyError;
use crate::repositories::identity::{Identity, IdentityClient};

mod pdfs;
mod wordbook;

#[derive(Clone)]
struct AppState {
    identity: IdentityClient,
    analyze_channel: mpsc::Sender<AnalyzeRequest>,
    user_channel: mpsc::Sender<UserRequest>,
    wordbook_channel: mpsc::Sender<WordbookRequest>,
    pdf_channel: mpsc::Sender<PdfRequest>,
}

#[derive(Deserialize)]
struct AnalyzeBody {
    word: String,
}

/// Resolves the bearer token to a user identity before any service work.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, (StatusCode, Json<serde_json::Value>)> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Missing Authorization header"})),
        ))?;

    state.identity.verify(token).await.map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid token or session expired"})),
        )
    })
}

fn service_error_response(error: ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    match error {
        ServiceError::QuotaExceeded {
            current_usage,
            limit,
        } => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Monthly free quota exceeded. Upgrade to Premium.",
                "usage": current_usage,
                "limit": limit
            })),
        ),
        ServiceError::PremiumRequired => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "PDF management is a Premium feature."})),
        ),
        ServiceError::Upstream(EtymologyError::Unconfigured) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Analysis service not configured"})),
        ),
        ServiceError::Upstream(e) => {
            log::warn!("upstream failure: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Analysis service failed"})),
            )
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": other.to_string()})),
        ),
    }
}

async fn analyze_word(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeBody>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if body.word.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "word must be a non-empty string"})),
        );
    }

    let (analyze_tx, analyze_rx) = oneshot::channel();
    let send_result = state
        .analyze_channel
        .send(AnalyzeRequest::Analyze {
            user_id: user.id,
            email: user.email,
            word: body.word,
            response: analyze_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match analyze_rx.await {
        Ok(Ok(result)) => (
            StatusCode::OK,
            Json(json!({"success": true, "data": result})),
        ),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

async fn get_my_profile(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (user_tx, user_rx) = oneshot::channel();
    let send_result = state
        .user_channel
        .send(UserRequest::GetProfile {
            id: user.id,
            email: user.email,
            response: user_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match user_rx.await {
        Ok(Ok(profile)) => (StatusCode::OK, Json(json!({"data": profile}))),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn start_http_server(
    listen: String,
    identity: IdentityClient,
    analyze_channel: mpsc::Sender<AnalyzeRequest>,
    user_channel: mpsc::Sender<UserRequest>,
    wordbook_channel: mpsc::Sender<WordbookRequest>,
    pdf_channel: mpsc::Sender<PdfRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        identity,
        analyze_channel,
        user_channel,
        wordbook_channel,
        pdf_channel,
    };

    let app = Router::new()
        .route("/analyze", post(analyze_word))
        .route("/user/me", get(get_my_profile))
        .route(
            "/wordbook",
            get(wordbook::list_wordbook).post(wordbook::add_word),
        )
        .route("/wordbook/{id}", delete(wordbook::delete_word))
        .route("/pdf", get(pdfs::list_pdfs).post(pdfs::register_pdf))
        .route("/pdf/{id}", patch(pdfs::update_pdf_progress))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
