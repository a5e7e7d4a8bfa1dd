use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        State,
    },
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use miniter_shared::session::SessionKeys;
use miniter_shared::UserId;
use miniter_store::{validate_tweet, TimelineEntry};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthUser;
use crate::db::Db;
use crate::directory;
use crate::error::ServerError;
use crate::media::{self, MediaStore};

/// Multipart slack on top of the picture size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub sessions: Arc<SessionKeys>,
    pub media: Arc<MediaStore>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state.media.max_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/ping", get(ping))
        .route("/sign-up", post(sign_up))
        .route("/login", post(login))
        .route("/tweet", post(tweet))
        .route("/follow", post(follow))
        .route("/unfollow", post(unfollow))
        .route("/timeline", get(user_timeline))
        .route("/timeline/{user_id}", get(timeline))
        .route("/profile-picture", post(upload_profile_picture))
        .route("/profile-picture/{user_id}", get(profile_picture))
        .route("/media/profile_image/{file}", get(media_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Malformed or mistyped JSON is a plain 400 rather than axum's 415/422.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

#[derive(Deserialize)]
struct SignUpRequest {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    profile: String,
}

#[derive(Serialize)]
struct SignUpResponse {
    id: UserId,
    name: String,
    email: String,
    profile: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    user_id: UserId,
    access_token: String,
}

/// Any `user_id` a client adds is ignored; the author is the token holder.
#[derive(Deserialize)]
struct TweetRequest {
    tweet: String,
}

#[derive(Deserialize)]
struct FollowRequest {
    follow: UserId,
}

#[derive(Deserialize)]
struct UnfollowRequest {
    unfollow: UserId,
}

#[derive(Serialize)]
struct TimelineResponse {
    user_id: UserId,
    timeline: Vec<TimelineEntry>,
}

#[derive(Serialize)]
struct ProfilePictureResponse {
    img_url: String,
}

async fn ping() -> &'static str {
    "pong"
}

async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Json<SignUpResponse>, ServerError> {
    let req = json_body(payload)?;

    let user = directory::register(&state.db, req.name, req.email, req.profile, req.password)
        .await?;

    Ok(Json(SignUpResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        profile: user.profile,
    }))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServerError> {
    let req = json_body(payload)?;

    let auth = directory::authenticate(&state.db, req.email, req.password).await?;
    let Some(user_id) = auth.granted() else {
        return Err(ServerError::Unauthorized);
    };

    let access_token = state.sessions.issue(user_id)?;
    info!(user_id = %user_id, "login succeeded");

    Ok(Json(LoginResponse {
        user_id,
        access_token,
    }))
}

async fn tweet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<TweetRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let req = json_body(payload)?;
    validate_tweet(&req.tweet)?;

    let tweet = state
        .db
        .call(move |db| db.post_tweet(user_id, &req.tweet))
        .await?;

    info!(user_id = %user_id, tweet_id = tweet.id, "tweet posted");
    Ok(StatusCode::OK)
}

async fn follow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<FollowRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let followee = json_body(payload)?.follow;

    let created = state
        .db
        .call(move |db| db.follow(user_id, followee))
        .await?;

    info!(user_id = %user_id, followee = %followee, created, "follow");
    Ok(StatusCode::OK)
}

async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UnfollowRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let followee = json_body(payload)?.unfollow;

    let removed = state
        .db
        .call(move |db| db.unfollow(user_id, followee))
        .await?;

    info!(user_id = %user_id, followee = %followee, removed, "unfollow");
    Ok(StatusCode::OK)
}

async fn user_timeline(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TimelineResponse>, ServerError> {
    let timeline = state
        .db
        .call(move |db| db.compose_timeline(user_id))
        .await?;

    Ok(Json(TimelineResponse { user_id, timeline }))
}

/// Read-only view of any user's timeline.
async fn timeline(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<TimelineResponse>, ServerError> {
    let timeline = state
        .db
        .call(move |db| {
            // Surface an unknown id instead of an empty feed.
            db.get_user(user_id)?;
            db.compose_timeline(user_id)
        })
        .await?;

    Ok(Json(TimelineResponse { user_id, timeline }))
}

async fn upload_profile_picture(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<StatusCode, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state.media.max_size()))?
    {
        if field.name() != Some("profile_pic") {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, state.media.max_size()))?;

        let file_name = state
            .media
            .store_profile_picture(user_id, original_name.as_deref(), &data)
            .await?;
        let url = state.media.public_url(&file_name);

        state
            .db
            .call(move |db| db.set_profile_picture(user_id, &url))
            .await?;

        info!(user_id = %user_id, size = data.len(), "profile picture uploaded");
        return Ok(StatusCode::OK);
    }

    Err(ServerError::BadRequest(
        "Missing 'profile_pic' field in multipart form".to_string(),
    ))
}

// Hitting the body limit mid-stream still reports 413.
fn multipart_error(err: MultipartError, max: usize) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge { max }
    } else {
        ServerError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

async fn profile_picture(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ProfilePictureResponse>, ServerError> {
    let url = state
        .db
        .call(move |db| db.get_profile_picture(user_id))
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("No profile picture for user {user_id}")))?;

    Ok(Json(ProfilePictureResponse { img_url: url }))
}

async fn media_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.media.read_profile_picture(&file).await?;
    Ok(([(header::CONTENT_TYPE, media::content_type(&file))], data))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
