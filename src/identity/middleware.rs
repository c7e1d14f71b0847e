use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::types::OwnerId;

pub const OWNER_HEADER: &str = "x-owner-id";

/// Extractor that requires an owner id from the identity provider
pub struct RequireOwner(pub OwnerId);

#[derive(Debug)]
pub enum OwnerRejection {
    MissingOwner,
    InvalidEncoding,
    InvalidOwner,
}

impl IntoResponse for OwnerRejection {
    fn into_response(self) -> Response {
        let message = match self {
            OwnerRejection::MissingOwner => "Owner id required",
            OwnerRejection::InvalidEncoding => "Owner id header is not valid text",
            OwnerRejection::InvalidOwner => "Owner id must be a positive integer",
        };

        let body = json!({ "data": null, "error": message });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = OwnerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .ok_or(OwnerRejection::MissingOwner)?
            .to_str()
            .map_err(|_| OwnerRejection::InvalidEncoding)?;

        let owner_id = raw
            .parse::<OwnerId>()
            .map_err(|_| OwnerRejection::InvalidOwner)?;

        Ok(RequireOwner(owner_id))
    }
}
