//! JSON extractor with `validator` checks.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the body as JSON and runs [`Validate::validate`] on it.
///
/// Decode failures and validation failures both reject with a 400
/// [`AppError`]; the latter lists offending fields in `errors`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Restock {
        #[validate(range(min = 1))]
        amount: i64,
    }

    fn app() -> Router {
        Router::new().route(
            "/restock",
            post(|ValidatedJson(body): ValidatedJson<Restock>| async move { body.amount.to_string() }),
        )
    }

    fn request(body: &'static str) -> Request<Body> {
        Request::post("/restock")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_body() {
        let response = app().oneshot(request(r#"{"amount": 3}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_invalid_body() {
        let response = app().oneshot(request(r#"{"amount": 0}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let response = app().oneshot(request("{amount")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
