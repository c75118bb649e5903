use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessOrderResponse {
    pub id: i64,
}

/// POST /orders/{order_id}/process
/// Run every purchased unit of the order through its product policy
pub async fn process_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<ProcessOrderResponse>, AppError> {
    tracing::info!("Processing order {}", order_id);

    let id = state
        .processor
        .process_order(order_id)
        .await
        .map_err(AppError::from_order)?;

    Ok(Json(ProcessOrderResponse { id }))
}
