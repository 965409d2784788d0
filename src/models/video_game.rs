//! Video game record and its request/response projections.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Maximum length, in characters, of `title` and `developer`.
pub const MAX_TEXT_LEN: usize = 100;

/// A video game in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoGame {
    /// Storage-assigned identifier; `None` until persisted.
    pub id: Option<i64>,
    pub title: String,
    pub developer: String,
    pub release_date: Option<NaiveDate>,
    pub is_multiplayer: bool,
}

impl VideoGame {
    /// Creates an unsaved record.
    pub fn new(
        title: impl Into<String>,
        developer: impl Into<String>,
        release_date: Option<NaiveDate>,
        is_multiplayer: bool,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            developer: developer.into(),
            release_date,
            is_multiplayer,
        }
    }

    /// Overwrites the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: UpdateVideoGame) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(developer) = update.developer {
            self.developer = developer;
        }
        if let Some(release_date) = update.release_date {
            self.release_date = release_date;
        }
        if let Some(is_multiplayer) = update.is_multiplayer {
            self.is_multiplayer = is_multiplayer;
        }
    }
}

/// Payload for creating a video game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVideoGame {
    pub title: String,
    pub developer: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub is_multiplayer: bool,
}

impl CreateVideoGame {
    /// Enforces the column length limits. Empty strings are accepted.
    pub fn validate(&self) -> Result<(), AppError> {
        check_len("title", &self.title)?;
        check_len("developer", &self.developer)
    }
}

impl From<CreateVideoGame> for VideoGame {
    fn from(req: CreateVideoGame) -> Self {
        VideoGame::new(req.title, req.developer, req.release_date, req.is_multiplayer)
    }
}

/// Partial update payload. Absent fields are left unchanged.
///
/// For `release_date`, an explicit `null` clears the date while an absent
/// key keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateVideoGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multiplayer: Option<bool>,
}

impl UpdateVideoGame {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            check_len("title", title)?;
        }
        if let Some(developer) = &self.developer {
            check_len("developer", developer)?;
        }
        Ok(())
    }
}

/// Marks a key that appeared in the input, even with a `null` value.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_len(field: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

/// Public view of a video game; the id is not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoGameView {
    pub title: String,
    pub developer: String,
    pub release_date: Option<NaiveDate>,
    pub is_multiplayer: bool,
}

impl From<&VideoGame> for VideoGameView {
    fn from(game: &VideoGame) -> Self {
        Self {
            title: game.title.clone(),
            developer: game.developer.clone(),
            release_date: game.release_date,
            is_multiplayer: game.is_multiplayer,
        }
    }
}

impl From<VideoGame> for VideoGameView {
    fn from(game: VideoGame) -> Self {
        Self {
            title: game.title,
            developer: game.developer,
            release_date: game.release_date,
            is_multiplayer: game.is_multiplayer,
        }
    }
}
