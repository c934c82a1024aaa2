use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{error::ApiError, orders::repo::Order, state::AppState};

pub fn order_routes() -> Router<AppState> {
    Router::new().route("/orders", post(create_order))
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = Order::create(&state.db, &payload).await?;
    info!(order_id = %order.id, "order created");
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn order_response_carries_payload_verbatim() {
        let response = OrderResponse {
            success: true,
            order: Order {
                id: Uuid::new_v4(),
                payload: serde_json::json!({"sku": "X-1", "qty": 2}),
                created_at: OffsetDateTime::now_utc(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["order"]["payload"]["sku"], "X-1");
        assert_eq!(json["order"]["payload"]["qty"], 2);
    }
}
