//! Download parameter extractors that fail with `ApiError`

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use starter_core::{DefinitionBody, DefinitionParams};

/// Download parameters from the query string.
///
/// Read as raw pairs so `e` can repeat.
#[derive(Debug, Clone)]
pub struct DefinitionQuery(pub DefinitionParams);

impl<S> FromRequestParts<S> for DefinitionQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)?;
        Ok(Self(pairs.into_iter().collect()))
    }
}

/// Download parameters from a camelCase JSON body
#[derive(Debug, Clone)]
pub struct DefinitionJson(pub DefinitionParams);

impl<S> FromRequest<S> for DefinitionJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<DefinitionBody>::from_request(req, state).await?;
        Ok(Self(body.into()))
    }
}
