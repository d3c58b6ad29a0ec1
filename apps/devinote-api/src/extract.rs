//! `Json`, `Query` and `Path` with rejections rendered as [`ApiError`] bodies.

use axum::{
	Json,
	extract::{
		FromRequest, FromRequestParts, Path, Query, Request,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::request::Parts,
};

use crate::routes::ApiError;

pub struct ApiJson<T>(pub T);
impl<S, T> FromRequest<S> for ApiJson<T>
where
	Json<T>: FromRequest<S, Rejection = JsonRejection>,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(request, state)
			.await
			.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;

		Ok(Self(value))
	}
}

pub struct ApiQuery<T>(pub T);
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
	Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state)
			.await
			.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;

		Ok(Self(value))
	}
}

pub struct ApiPath<T>(pub T);
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
	Path<T>: FromRequestParts<S, Rejection = PathRejection>,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state)
			.await
			.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;

		Ok(Self(value))
	}
}
