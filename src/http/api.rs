//! JSON API mounted under `/api/videogames`.

use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;

use crate::context::Context;
use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::models::{CreateVideoGame, UpdateVideoGame, VideoGame, VideoGameView};
use crate::repositories::VideoGameRepository;

type Repo<E> = State<VideoGameRepository<E>>;
type ApiResult<T> = Result<T, AppError>;

/// JSON body whose rejections are reported as validation errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections are reported as validation errors.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

pub fn routes<E: SqlExecutor + 'static>() -> Router<Context<E>> {
    Router::new()
        .route("/", get(list::<E>))
        .route("/search/title/{title}", get(search_title::<E>))
        .route("/search/developer/{developer}", get(search_developer::<E>))
        .route("/search/multiplayer/{flag}", get(search_multiplayer::<E>))
        .route("/search/dates/{start}/{end}", get(search_dates::<E>))
        .route("/new", post(create::<E>))
        .route(
            "/{id}",
            get(get_one::<E>).put(update::<E>).delete(delete::<E>),
        )
}

pub(crate) async fn list<E: SqlExecutor>(State(repo): Repo<E>) -> ApiResult<Json<Vec<VideoGameView>>> {
    Ok(Json(views(repo.get_all().await?)))
}

async fn search_title<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath(title): ApiPath<String>,
) -> ApiResult<Json<Vec<VideoGameView>>> {
    let games = repo.get_by_title(&title).await?;
    non_empty(games, || format!("no video games with title matching '{}'", title))
}

async fn search_developer<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath(developer): ApiPath<String>,
) -> ApiResult<Json<Vec<VideoGameView>>> {
    let games = repo.get_by_developer(&developer).await?;
    non_empty(games, || {
        format!("no video games with developer matching '{}'", developer)
    })
}

async fn search_multiplayer<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath(flag): ApiPath<String>,
) -> ApiResult<Json<Vec<VideoGameView>>> {
    let is_multiplayer = parse_flag(&flag)?;
    let games = repo.get_by_multiplayer(is_multiplayer).await?;
    non_empty(games, || {
        format!("no video games with is_multiplayer = {}", is_multiplayer)
    })
}

async fn search_dates<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath((start, end)): ApiPath<(String, String)>,
) -> ApiResult<Json<Vec<VideoGameView>>> {
    let start = parse_date(&start)?;
    let end = parse_date(&end)?;
    let games = repo.get_by_release_date_range(start, end).await?;
    non_empty(games, || {
        format!("no video games released between {} and {}", start, end)
    })
}

async fn create<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiJson(req): ApiJson<CreateVideoGame>,
) -> ApiResult<(StatusCode, Json<VideoGameView>)> {
    req.validate()?;
    let game = repo.create(req.into()).await?;
    tracing::info!(id = ?game.id, title = %game.title, "Created video game");
    Ok((StatusCode::CREATED, Json(game.into())))
}

async fn get_one<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<VideoGameView>> {
    let game = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::game_not_found(id))?;
    Ok(Json(game.into()))
}

async fn update<E: SqlExecutor>(
    State(repo): Repo<E>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<UpdateVideoGame>,
) -> ApiResult<Json<VideoGameView>> {
    changes.validate()?;
    let game = repo.update(id, changes).await?;
    tracing::info!(id, "Updated video game");
    Ok(Json(game.into()))
}

async fn delete<E: SqlExecutor>(State(repo): Repo<E>, ApiPath(id): ApiPath<i64>) -> ApiResult<StatusCode> {
    repo.delete(id).await?;
    tracing::info!(id, "Deleted video game");
    Ok(StatusCode::NO_CONTENT)
}

fn views(games: Vec<VideoGame>) -> Vec<VideoGameView> {
    games.into_iter().map(VideoGameView::from).collect()
}

fn non_empty(
    games: Vec<VideoGame>,
    message: impl FnOnce() -> String,
) -> ApiResult<Json<Vec<VideoGameView>>> {
    if games.is_empty() {
        return Err(AppError::NotFound(message()));
    }
    Ok(Json(views(games)))
}

/// Parse a boolean path segment (`true/false`, `1/0`, `yes/no`, `on/off`).
pub(crate) fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid boolean '{}', expected true or false",
            raw
        ))),
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag("YES").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(!parse_flag("False").unwrap());
        assert!(matches!(parse_flag("maybe"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2015-05-19").unwrap(),
            NaiveDate::from_ymd_opt(2015, 5, 19).unwrap()
        );
        assert!(parse_date("19/05/2015").is_err());
        assert!(parse_date("2015-13-01").is_err());
    }
}
