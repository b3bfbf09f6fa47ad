use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::wordbook::NewWordbookEntry;
use crate::services::wordbook::WordbookRequest;
use crate::services::ServiceError;

use super::{authenticate, service_error_response, AppState};

pub async fn list_wordbook(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (wordbook_tx, wordbook_rx) = oneshot::channel();
    let send_result = state
        .wordbook_channel
        .send(WordbookRequest::List {
            user_id: user.id,
            response: wordbook_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match wordbook_rx.await {
        Ok(Ok(entries)) => (StatusCode::OK, Json(json!({"data": entries}))),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn add_word(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(entry): Json<NewWordbookEntry>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (wordbook_tx, wordbook_rx) = oneshot::channel();
    let send_result = state
        .wordbook_channel
        .send(WordbookRequest::Add {
            user_id: user.id,
            entry,
            response: wordbook_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match wordbook_rx.await {
        Ok(Ok(inserted)) => (
            StatusCode::CREATED,
            Json(json!({"success": true, "data": inserted})),
        ),
        Ok(Err(ServiceError::DuplicateWord)) => (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Word already in wordbook"})),
        ),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn delete_word(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (wordbook_tx, wordbook_rx) = oneshot::channel();
    let send_result = state
        .wordbook_channel
        .send(WordbookRequest::Delete {
            user_id: user.id,
            entry_id,
            response: wordbook_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match wordbook_rx.await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({"success": true}))),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}
