//! Server-rendered HTML pages.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::context::Context;
use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::http::api::parse_date;
use crate::http::templates::{FormTemplate, IndexTemplate, ListTemplate};
use crate::http::API_PREFIX;
use crate::models::{CreateVideoGame, VideoGame};
use crate::repositories::VideoGameRepository;

type Repo<E> = State<VideoGameRepository<E>>;
type PageResult = Result<Html<String>, PageError>;

pub fn routes<E: SqlExecutor + 'static>() -> Router<Context<E>> {
    Router::new()
        .route("/", get(index))
        .route("/videogames", get(list::<E>))
        .route("/videogames/search/title", get(search_title::<E>))
        .route("/videogames/search/developer", get(search_developer::<E>))
        .route("/videogames/search/multiplayer", get(search_multiplayer::<E>))
        .route("/videogames/search/dates", get(search_dates::<E>))
        .route("/videogames/new", get(new_form).post(create::<E>))
}

/// Error shown as a plain-text page.
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status(), self.0.to_string()).into_response()
    }
}

fn render(template: impl Template) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

fn list_page(heading: String, games: Vec<VideoGame>) -> PageResult {
    Ok(render(ListTemplate { heading, games })?)
}

async fn index() -> PageResult {
    Ok(render(IndexTemplate {
        api_prefix: API_PREFIX,
    })?)
}

async fn list<E: SqlExecutor>(State(repo): Repo<E>) -> PageResult {
    list_page("All video games".into(), repo.get_all().await?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleSearch {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeveloperSearch {
    developer: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MultiplayerSearch {
    multiplayer: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DateSearch {
    start: String,
    end: String,
}

async fn search_title<E: SqlExecutor>(
    State(repo): Repo<E>,
    Query(search): Query<TitleSearch>,
) -> PageResult {
    let title = search.title.trim();
    let games = if title.is_empty() {
        Vec::new()
    } else {
        repo.get_by_title(title).await?
    };
    list_page(format!("Title contains \"{}\"", title), games)
}

async fn search_developer<E: SqlExecutor>(
    State(repo): Repo<E>,
    Query(search): Query<DeveloperSearch>,
) -> PageResult {
    let developer = search.developer.trim();
    let games = if developer.is_empty() {
        Vec::new()
    } else {
        repo.get_by_developer(developer).await?
    };
    list_page(format!("Developer contains \"{}\"", developer), games)
}

async fn search_multiplayer<E: SqlExecutor>(
    State(repo): Repo<E>,
    Query(search): Query<MultiplayerSearch>,
) -> PageResult {
    let flag = search.multiplayer.trim();
    if flag.eq_ignore_ascii_case("true") {
        list_page("Multiplayer games".into(), repo.get_by_multiplayer(true).await?)
    } else if flag.eq_ignore_ascii_case("false") {
        list_page(
            "Single-player games".into(),
            repo.get_by_multiplayer(false).await?,
        )
    } else {
        list_page("All video games".into(), repo.get_all().await?)
    }
}

async fn search_dates<E: SqlExecutor>(
    State(repo): Repo<E>,
    Query(search): Query<DateSearch>,
) -> PageResult {
    let (start, end) = (search.start.trim(), search.end.trim());
    if start.is_empty() || end.is_empty() {
        return list_page("Released between ... and ...".into(), Vec::new());
    }

    let games = repo
        .get_by_release_date_range(parse_date(start)?, parse_date(end)?)
        .await?;
    list_page(format!("Released between {} and {}", start, end), games)
}

async fn new_form() -> PageResult {
    Ok(render(FormTemplate::default())?)
}

/// Fields posted by the new-game form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewGameForm {
    title: String,
    developer: String,
    release_date: String,
    /// Checkbox: present when ticked, whatever its value.
    is_multiplayer: Option<String>,
}

impl NewGameForm {
    fn to_game(&self) -> Result<VideoGame, String> {
        let title = self.title.trim();
        let developer = self.developer.trim();
        if title.is_empty() || developer.is_empty() {
            return Err("Title and developer are required.".into());
        }

        let release_date = match self.release_date.trim() {
            "" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| "Release date must be a valid YYYY-MM-DD date.".to_string())?,
            ),
        };

        let req = CreateVideoGame {
            title: title.to_string(),
            developer: developer.to_string(),
            release_date,
            is_multiplayer: self.is_multiplayer.is_some(),
        };
        match req.validate() {
            Ok(()) => Ok(req.into()),
            Err(AppError::Validation(msg)) => Err(msg),
            Err(e) => Err(e.to_string()),
        }
    }

    /// The form again, holding what the user typed.
    fn with_error(&self, error: String) -> FormTemplate {
        FormTemplate {
            title: self.title.trim().to_string(),
            developer: self.developer.trim().to_string(),
            release_date: self.release_date.trim().to_string(),
            is_multiplayer: self.is_multiplayer.is_some(),
            error: Some(error),
        }
    }
}

async fn create<E: SqlExecutor>(
    State(repo): Repo<E>,
    Form(form): Form<NewGameForm>,
) -> Result<Response, PageError> {
    let game = match form.to_game() {
        Ok(game) => game,
        Err(msg) => {
            tracing::debug!(error = %msg, "Rejected new video game form");
            let page = render(form.with_error(msg))?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    match repo.create(game).await {
        Ok(created) => {
            tracing::info!(id = ?created.id, title = %created.title, "Created video game");
            Ok(Redirect::to("/videogames").into_response())
        }
        Err(e) => {
            e.log();
            let page = render(form.with_error(format!("Could not save the video game: {}", e)))?;
            Ok((e.status(), page).into_response())
        }
    }
}
