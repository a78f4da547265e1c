//! Body extractor for add/update: JSON or `multipart/form-data`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use axum_helpers::{AppError, ValidatedJson};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::media::PendingImage;

const IMAGE_FIELD: &str = "image";
const INTEGER_FIELDS: [&str; 2] = ["quantity", "amount"];
const NUMBER_FIELDS: [&str; 1] = ["price"];

/// A decoded, validated body plus the uploaded image, if any.
///
/// Multipart text parts are coerced into the same JSON shape a JSON body
/// would have: numeric fields are parsed, repeated `admins` parts collect
/// into a list, blank parts count as absent.
pub struct SweetForm<T> {
    pub data: T,
    pub image: Option<PendingImage>,
}

impl<T, S> FromRequest<S> for SweetForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let ValidatedJson(data) = ValidatedJson::<T>::from_request(req, state).await?;
            return Ok(Self { data, image: None });
        }

        let multipart = Multipart::from_request(req, state).await?;
        let (fields, image) = read_multipart(multipart).await?;

        let data: T = serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
        data.validate()?;

        Ok(Self { data, image })
    }
}

/// [`ValidatedJson`] that also accepts a request with no body at all,
/// decoding it as `T::default()`.
pub struct JsonOrEmpty<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrEmpty<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(CONTENT_TYPE) {
            let ValidatedJson(data) = ValidatedJson::<T>::from_request(req, state).await?;
            return Ok(Self(data));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if !body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".into(),
            ));
        }

        let data = T::default();
        data.validate()?;
        Ok(Self(data))
    }
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Map<String, Value>, Option<PendingImage>), AppError> {
    let mut fields = Map::new();
    let mut admins = Vec::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD && field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await?;
            if !data.is_empty() {
                image = Some(PendingImage::spool(&data, file_name.as_deref()).await?);
            }
            continue;
        }

        let text = field.text().await?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        // Image URLs are only accepted from JSON bodies
        if name == IMAGE_FIELD {
            return Err(AppError::BadRequest("image must be an uploaded file".into()));
        }

        match name.as_str() {
            "admins" | "admins[]" => admins.push(Value::String(text.to_string())),
            _ => {
                let value = coerce(&name, text)?;
                fields.insert(name, value);
            }
        }
    }

    if !admins.is_empty() {
        fields.insert("admins".to_string(), Value::Array(admins));
    }

    Ok((fields, image))
}

fn coerce(name: &str, text: &str) -> Result<Value, AppError> {
    let not_a_number = || AppError::BadRequest(format!("{} must be a number", name));

    if INTEGER_FIELDS.contains(&name) {
        text.parse::<i64>().map(Value::from).map_err(|_| not_a_number())
    } else if NUMBER_FIELDS.contains(&name) {
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::from)
            .ok_or_else(not_a_number)
    } else {
        Ok(Value::String(text.to_string()))
    }
}
