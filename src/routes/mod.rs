use actix_web::{web, HttpRequest, HttpResponse};
use log::warn;
use serde_json::json;

use crate::models::{
    AppState, CreateGameRequest, CreateGameResponse, JoinGameRequest, ListGamesResponse,
    LoginRequest, RegisterRequest,
};
use crate::service::auth::authenticate;
use crate::service::{self, games, users, ServiceError};

/// The raw `Authorization` header; an absent header reads as an empty token.
fn auth_token(req: &HttpRequest) -> String {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Runs CPU-heavy work (password hashing) off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
}

pub async fn clear(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    service::clear_application(&state)?;
    Ok(HttpResponse::Ok().json(json!({})))
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let RegisterRequest {
        username,
        password,
        email,
    } = body.into_inner();
    let auth = blocking(move || users::register(&state, &username, &password, &email)).await?;
    Ok(HttpResponse::Ok().json(auth))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    let LoginRequest { username, password } = body.into_inner();
    let auth = blocking(move || users::login(&state, &username, &password)).await?;
    Ok(HttpResponse::Ok().json(auth))
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    users::logout(&state, &auth_token(&req))?;
    Ok(HttpResponse::Ok().json(json!({})))
}

pub async fn list_games(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let games = games::list_games(&state, &auth_token(&req))?;
    Ok(HttpResponse::Ok().json(ListGamesResponse { games }))
}

pub async fn create_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, ServiceError> {
    let game_id = games::create_game(&state, &auth_token(&req), &body.game_name)?;
    Ok(HttpResponse::Ok().json(CreateGameResponse { game_id }))
}

pub async fn join_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<JoinGameRequest>,
) -> Result<HttpResponse, ServiceError> {
    let token = auth_token(&req);
    let Some(game_id) = body.game_id else {
        authenticate(state.store.as_ref(), &token)?;
        return Err(ServiceError::BadRequest);
    };
    games::join_game(&state, &token, body.player_color, game_id)?;
    Ok(HttpResponse::Ok().json(json!({})))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        warn!("Rejected body for {} {}: {}", req.method(), req.path(), err);
        ServiceError::BadRequest.into()
    })
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/db").route(web::delete().to(clear)))
        .service(web::resource("/user").route(web::post().to(register)))
        .service(
            web::resource("/session")
                .route(web::post().to(login))
                .route(web::delete().to(logout)),
        )
        .service(
            web::resource("/game")
                .route(web::get().to(list_games))
                .route(web::post().to(create_game))
                .route(web::put().to(join_game)),
        )
        .service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)));
}
