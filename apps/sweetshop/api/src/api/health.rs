//! Readiness endpoint

use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use mongodb::Client;

/// `GET /ready`: 200 when MongoDB answers a ping, 503 otherwise
pub fn router(client: Client) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(client)
}

async fn readiness_check(State(client): State<Client>) -> Response {
    let mongodb: HealthCheckFuture = Box::pin(async {
        if database::mongodb::check_health(&client).await {
            Ok(())
        } else {
            Err("ping failed".to_string())
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}
