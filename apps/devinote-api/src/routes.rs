use std::time::Instant;

use axum::{
	Extension, Json, Router,
	extract::{Request, State},
	http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	extract::{ApiJson, ApiPath, ApiQuery},
	state::AppState,
};
use devinote_domain::pagination::{Page, PageRequest};
use devinote_service::{
	CategoryResponse, CreateCategoryRequest, CreateLabelRequest, CreateNoteRequest,
	CreatePostRequest, CurrentUser, Error, LabelResponse, LoginRequest, LoginResponse,
	NoteResponse, PopularTagResponse, PostResponse, RegisterRequest, ShareRequest, ShareResponse,
	TagRequest, TagResponse, UpdateCategoryRequest, UpdateLabelRequest, UpdateNoteRequest,
	UpdatePostRequest, UserProfile,
};

/// Seconds spent inside the router, with four decimals.
pub const X_PROCESS_TIME: &str = "x-process-time";

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct TagsQuery {
	#[serde(default)]
	tags: String,
}

#[derive(Debug, Deserialize)]
struct UnshareQuery {
	target_user_id: i64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None)
	}

	fn unauthorized(message: impl Into<String>) -> Self {
		Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None)
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message, field } => Self::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				field.map(|field| vec![field]),
			),
			Error::Unauthorized { message } => Self::unauthorized(message),
			Error::Forbidden { message } =>
				Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message, None),
			Error::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Conflict { message } =>
				Self::new(StatusCode::CONFLICT, "CONFLICT", message, None),
			Error::Storage { message } | Error::Auth { message } => {
				tracing::error!(error = %message, "Request failed.");

				Self::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL",
					"Internal server error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let challenge = self.status == StatusCode::UNAUTHORIZED;
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };
		let mut response = (self.status, Json(body)).into_response();

		if challenge {
			response
				.headers_mut()
				.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
		}

		response
	}
}

pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.service.cfg.service.cors_allow_origins);
	let protected = Router::new()
		.route("/v1/auth/me", get(me))
		.route("/v1/posts", get(list_posts).post(create_post))
		.route("/v1/posts/by-tags", get(posts_by_tags))
		.route("/v1/posts/{id}", get(get_post).put(update_post).delete(delete_post))
		.route("/v1/tags", get(list_tags).post(create_tag))
		.route("/v1/tags/popular", get(most_popular_tag))
		.route("/v1/tags/{id}", get(get_tag).put(rename_tag).delete(delete_tag))
		.route("/v1/categories", get(list_categories).post(create_category))
		.route(
			"/v1/categories/{id}",
			get(get_category).patch(update_category).delete(delete_category),
		)
		.route("/v1/notes", get(list_notes).post(create_note))
		.route("/v1/notes/{id}", get(get_note).patch(update_note).delete(delete_note))
		.route(
			"/v1/notes/{id}/shares",
			get(list_note_shares).post(share_note).delete(unshare_note),
		)
		.route("/v1/labels", get(list_labels).post(create_label))
		.route("/v1/labels/{id}", get(get_label).patch(rename_label).delete(delete_label))
		.route(
			"/v1/labels/{id}/shares",
			get(list_label_shares).post(share_label).delete(unshare_label),
		)
		.route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

	Router::new()
		.route("/health", get(health))
		.route("/v1/users/register", post(register))
		.route("/v1/auth/login", post(login))
		.merge(protected)
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.layer(middleware::from_fn(record_process_time))
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.with_state(state)
}

async fn record_process_time(request: Request, next: Next) -> Response {
	let started = Instant::now();
	let mut response = next.run(request).await;
	let elapsed = format!("{:.4}", started.elapsed().as_secs_f64());

	if let Ok(value) = HeaderValue::from_str(&elapsed) {
		response.headers_mut().insert(HeaderName::from_static(X_PROCESS_TIME), value);
	}

	response
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

	if origins.is_empty() {
		return layer.allow_origin(Any);
	}

	let allowed = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "Ignoring CORS origin that is not a valid header value.");

				None
			},
		})
		.collect::<Vec<_>>();

	layer.allow_origin(AllowOrigin::list(allowed))
}

fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
	let value = headers
		.get(header::AUTHORIZATION)
		.ok_or_else(|| ApiError::unauthorized("Missing Authorization header."))?
		.to_str()
		.map_err(|_| ApiError::unauthorized("Authorization header is not valid UTF-8."))?;
	let (scheme, token) = value
		.split_once(' ')
		.ok_or_else(|| ApiError::unauthorized("Authorization header must be `Bearer <token>`."))?;

	if !scheme.eq_ignore_ascii_case("bearer") {
		return Err(ApiError::unauthorized("Authorization scheme must be `Bearer`."));
	}

	let token = token.trim();

	if token.is_empty() {
		return Err(ApiError::unauthorized("Bearer token is empty."));
	}

	Ok(token)
}

async fn require_auth(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> ApiResult<Response> {
	let token = bearer_token(request.headers())?.to_string();
	let user = state.service.authenticate(&token).await?;

	request.extensions_mut().insert(user);

	Ok(next.run(request).await)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn register(
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
	let response = state.service.register(payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
	let response = state.service.login(payload).await?;

	Ok(Json(response))
}

async fn me(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<UserProfile>> {
	let response = state.service.me(&user).await?;

	Ok(Json(response))
}

async fn list_posts(
	State(state): State<AppState>,
	ApiQuery(request): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<PostResponse>>> {
	let response = state.service.list_posts(&request).await?;

	Ok(Json(response))
}

async fn create_post(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
	let response = state.service.create_post(&user, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn posts_by_tags(
	State(state): State<AppState>,
	ApiQuery(query): ApiQuery<TagsQuery>,
) -> ApiResult<Json<Vec<PostResponse>>> {
	let response = state.service.posts_by_tags(&query.tags).await?;

	Ok(Json(response))
}

async fn get_post(
	State(state): State<AppState>,
	ApiPath(post_id): ApiPath<i64>,
) -> ApiResult<Json<PostResponse>> {
	let response = state.service.get_post(post_id).await?;

	Ok(Json(response))
}

async fn update_post(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(post_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
	let response = state.service.update_post(&user, post_id, payload).await?;

	Ok(Json(response))
}

async fn delete_post(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(post_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
	state.service.delete_post(&user, post_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_tags(
	State(state): State<AppState>,
	ApiQuery(request): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<TagResponse>>> {
	let response = state.service.list_tags(&request).await?;

	Ok(Json(response))
}

async fn create_tag(
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<TagRequest>,
) -> ApiResult<(StatusCode, Json<TagResponse>)> {
	let response = state.service.create_tag(payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn most_popular_tag(State(state): State<AppState>) -> ApiResult<Json<PopularTagResponse>> {
	let response = state.service.most_popular_tag().await?;

	Ok(Json(response))
}

async fn get_tag(
	State(state): State<AppState>,
	ApiPath(tag_id): ApiPath<i64>,
) -> ApiResult<Json<TagResponse>> {
	let response = state.service.get_tag(tag_id).await?;

	Ok(Json(response))
}

async fn rename_tag(
	State(state): State<AppState>,
	ApiPath(tag_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<TagRequest>,
) -> ApiResult<Json<TagResponse>> {
	let response = state.service.rename_tag(tag_id, payload).await?;

	Ok(Json(response))
}

async fn delete_tag(
	State(state): State<AppState>,
	ApiPath(tag_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
	state.service.delete_tag(tag_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(
	State(state): State<AppState>,
	ApiQuery(request): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<CategoryResponse>>> {
	let response = state.service.list_categories(&request).await?;

	Ok(Json(response))
}

async fn create_category(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
	let response = state.service.create_category(&user, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_category(
	State(state): State<AppState>,
	ApiPath(category_id): ApiPath<i64>,
) -> ApiResult<Json<CategoryResponse>> {
	let response = state.service.get_category(category_id).await?;

	Ok(Json(response))
}

async fn update_category(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(category_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
	let response = state.service.update_category(&user, category_id, payload).await?;

	Ok(Json(response))
}

async fn delete_category(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(category_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
	state.service.delete_category(&user, category_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_notes(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiQuery(request): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<NoteResponse>>> {
	let response = state.service.list_visible_notes(&user, &request).await?;

	Ok(Json(response))
}

async fn create_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiJson(payload): ApiJson<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
	let response = state.service.create_note(&user, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
) -> ApiResult<Json<NoteResponse>> {
	let response = state.service.get_note(&user, note_id).await?;

	Ok(Json(response))
}

async fn update_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
	let response = state.service.update_note(&user, note_id, payload).await?;

	Ok(Json(response))
}

async fn delete_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
	state.service.delete_note(&user, note_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_note_shares(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ShareResponse>>> {
	let response = state.service.list_note_shares(&user, note_id).await?;

	Ok(Json(response))
}

async fn share_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<ShareRequest>,
) -> ApiResult<(StatusCode, Json<ShareResponse>)> {
	let response = state.service.share_note(&user, note_id, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn unshare_note(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(note_id): ApiPath<i64>,
	ApiQuery(query): ApiQuery<UnshareQuery>,
) -> ApiResult<StatusCode> {
	state.service.unshare_note(&user, note_id, query.target_user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_labels(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiQuery(request): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<LabelResponse>>> {
	let response = state.service.list_labels(&user, &request).await?;

	Ok(Json(response))
}

async fn create_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiJson(payload): ApiJson<CreateLabelRequest>,
) -> ApiResult<(StatusCode, Json<LabelResponse>)> {
	let response = state.service.create_label(&user, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
) -> ApiResult<Json<LabelResponse>> {
	let response = state.service.get_label(&user, label_id).await?;

	Ok(Json(response))
}

async fn rename_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<UpdateLabelRequest>,
) -> ApiResult<Json<LabelResponse>> {
	let response = state.service.rename_label(&user, label_id, payload).await?;

	Ok(Json(response))
}

async fn delete_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
	state.service.delete_label(&user, label_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_label_shares(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ShareResponse>>> {
	let response = state.service.list_label_shares(&user, label_id).await?;

	Ok(Json(response))
}

async fn share_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
	ApiJson(payload): ApiJson<ShareRequest>,
) -> ApiResult<(StatusCode, Json<ShareResponse>)> {
	let response = state.service.share_label(&user, label_id, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn unshare_label(
	State(state): State<AppState>,
	Extension(user): Extension<CurrentUser>,
	ApiPath(label_id): ApiPath<i64>,
	ApiQuery(query): ApiQuery<UnshareQuery>,
) -> ApiResult<StatusCode> {
	state.service.unshare_label(&user, label_id, query.target_user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}
