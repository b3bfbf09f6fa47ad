use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::pdfs::{NewPdf, PdfUpdate};
use crate::services::pdfs::PdfRequest;

use super::{authenticate, service_error_response, AppState};

pub async fn list_pdfs(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (pdf_tx, pdf_rx) = oneshot::channel();
    let send_result = state
        .pdf_channel
        .send(PdfRequest::List {
            user_id: user.id,
            response: pdf_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match pdf_rx.await {
        Ok(Ok(pdfs)) => (StatusCode::OK, Json(json!({"data": pdfs}))),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn register_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(pdf): Json<NewPdf>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (pdf_tx, pdf_rx) = oneshot::channel();
    let send_result = state
        .pdf_channel
        .send(PdfRequest::Register {
            user_id: user.id,
            email: user.email,
            pdf,
            response: pdf_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match pdf_rx.await {
        Ok(Ok(registered)) => (
            StatusCode::CREATED,
            Json(json!({"success": true, "data": registered})),
        ),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn update_pdf_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pdf_id): Path<String>,
    Json(update): Json<PdfUpdate>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if update.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "No data to update"})),
        );
    }

    let (pdf_tx, pdf_rx) = oneshot::channel();
    let send_result = state
        .pdf_channel
        .send(PdfRequest::Update {
            user_id: user.id,
            pdf_id,
            update,
            response: pdf_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to process request: {}", e)})),
        );
    }

    match pdf_rx.await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({"success": true}))),
        Ok(Err(service_error)) => service_error_response(service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        ),
    }
}
