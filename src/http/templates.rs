//! Askama page templates.

use askama::Template;

use crate::models::VideoGame;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Where the JSON API is mounted, linked from the landing page.
    pub api_prefix: &'static str,
}

#[derive(Template)]
#[template(path = "videogames/list.html")]
pub struct ListTemplate {
    /// Describes which filter produced `games`.
    pub heading: String,
    pub games: Vec<VideoGame>,
}

/// New-game form, pre-filled with the last submission when re-rendered.
#[derive(Template, Default)]
#[template(path = "videogames/form.html")]
pub struct FormTemplate {
    pub title: String,
    pub developer: String,
    pub release_date: String,
    pub is_multiplayer: bool,
    pub error: Option<String>,
}
