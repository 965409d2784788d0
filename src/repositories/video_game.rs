//! Video game repository: every read and write against `video_games`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::backends::postgres::PostgresClient;
use crate::db::{QueryExt, Row, SqlExecutor};
use crate::error::AppError;
use crate::models::{UpdateVideoGame, VideoGame};

const COLUMNS: &str = "id, title, developer, release_date, is_multiplayer";

/// Repository for VideoGame CRUD and filtered lookups.
///
/// Each method issues a single auto-committed statement, except
/// [`update`](Self::update) which reads before it writes.
pub struct VideoGameRepository<E: SqlExecutor = PostgresClient> {
    db: Arc<E>,
}

impl<E: SqlExecutor> Clone for VideoGameRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<E: SqlExecutor> VideoGameRepository<E> {
    pub fn new(db: Arc<E>) -> Self {
        Self { db }
    }

    /// All records, ordered by id.
    pub async fn get_all(&self) -> Result<Vec<VideoGame>, AppError> {
        let rows = self
            .db
            .query(&format!("SELECT {} FROM video_games ORDER BY id", COLUMNS))
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_game).collect()
    }

    /// Find a record by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<VideoGame>, AppError> {
        let row = self
            .db
            .query(&format!("SELECT {} FROM video_games WHERE id = $1", COLUMNS))
            .param(id)
            .fetch_one()
            .await?;

        row.as_ref().map(Self::row_to_game).transpose()
    }

    /// Case-insensitive substring match on the title.
    pub async fn get_by_title(&self, title: &str) -> Result<Vec<VideoGame>, AppError> {
        self.search_text("title", title).await
    }

    /// Case-insensitive substring match on the developer.
    pub async fn get_by_developer(&self, developer: &str) -> Result<Vec<VideoGame>, AppError> {
        self.search_text("developer", developer).await
    }

    pub async fn get_by_multiplayer(&self, is_multiplayer: bool) -> Result<Vec<VideoGame>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {} FROM video_games WHERE is_multiplayer = $1 ORDER BY id",
                COLUMNS
            ))
            .param(is_multiplayer)
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_game).collect()
    }

    /// Records released between `start` and `end`, both inclusive.
    ///
    /// Undated records never match.
    pub async fn get_by_release_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VideoGame>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {} FROM video_games
                 WHERE release_date >= $1 AND release_date <= $2
                 ORDER BY id",
                COLUMNS
            ))
            .param(start)
            .param(end)
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_game).collect()
    }

    /// Insert a new record and return it with its assigned id.
    pub async fn create(&self, game: VideoGame) -> Result<VideoGame, AppError> {
        let row = self
            .db
            .query(&format!(
                "INSERT INTO video_games (title, developer, release_date, is_multiplayer)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {}",
                COLUMNS
            ))
            .param(game.title)
            .param(game.developer)
            .param(game.release_date)
            .param(game.is_multiplayer)
            .fetch_one()
            .await?
            .ok_or_else(|| AppError::Internal("INSERT returned no row".into()))?;

        Self::row_to_game(&row)
    }

    /// Apply the fields present in `changes` to the record `id`.
    pub async fn update(&self, id: i64, changes: UpdateVideoGame) -> Result<VideoGame, AppError> {
        let mut game = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::game_not_found(id))?;
        game.apply(changes);

        let row = self
            .db
            .query(&format!(
                "UPDATE video_games
                 SET title = $2, developer = $3, release_date = $4, is_multiplayer = $5
                 WHERE id = $1
                 RETURNING {}",
                COLUMNS
            ))
            .param(id)
            .param(game.title)
            .param(game.developer)
            .param(game.release_date)
            .param(game.is_multiplayer)
            .fetch_one()
            .await?
            // Deleted between the read and the write
            .ok_or_else(|| AppError::game_not_found(id))?;

        Self::row_to_game(&row)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let deleted = self
            .db
            .query("DELETE FROM video_games WHERE id = $1")
            .param(id)
            .run()
            .await?;

        if deleted == 0 {
            return Err(AppError::game_not_found(id));
        }
        Ok(())
    }

    async fn search_text(&self, column: &str, needle: &str) -> Result<Vec<VideoGame>, AppError> {
        let rows = self
            .db
            .query(&format!(
                r"SELECT {} FROM video_games WHERE {} ILIKE $1 ESCAPE '\' ORDER BY id",
                COLUMNS, column
            ))
            .param(format!("%{}%", escape_like(needle)))
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_game).collect()
    }

    fn row_to_game(row: &Row) -> Result<VideoGame, AppError> {
        Ok(VideoGame {
            id: Some(row.get("id")?),
            title: row.get("title")?,
            developer: row.get("developer")?,
            release_date: row.get_opt("release_date")?,
            is_multiplayer: row.get("is_multiplayer")?,
        })
    }
}

/// Escape LIKE metacharacters so the input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::MockExecutor;
    use crate::db::SqlValue;
    use serde_json::json;

    fn game_row(id: i64, title: &str, date: Option<&str>, multiplayer: bool) -> Row {
        MockExecutor::row(&[
            ("id", json!(id)),
            ("title", json!(title)),
            ("developer", json!("Studio")),
            ("release_date", json!(date)),
            ("is_multiplayer", json!(multiplayer)),
        ])
    }

    fn repo(mock: MockExecutor) -> (VideoGameRepository<MockExecutor>, Arc<MockExecutor>) {
        let db = Arc::new(mock);
        (VideoGameRepository::new(Arc::clone(&db)), db)
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("zelda"), "zelda");
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like(r"a_b\c"), r"a\_b\\c");
    }

    #[tokio::test]
    async fn test_get_all_maps_rows() {
        let (repo, db) = repo(MockExecutor::new().with_rows(vec![
            game_row(1, "Minecraft", Some("2011-11-18"), true),
            game_row(2, "Untitled", None, false),
        ]));

        let games = repo.get_all().await.unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, Some(1));
        assert_eq!(games[0].release_date, NaiveDate::from_ymd_opt(2011, 11, 18));
        assert!(games[0].is_multiplayer);
        assert_eq!(games[1].release_date, None);
        assert!(db.statements()[0].contains("ORDER BY id"));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let (repo, _) = repo(MockExecutor::new());
        assert_eq!(repo.get_by_id(9).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_by_title_uses_ilike_pattern() {
        let (repo, db) = repo(MockExecutor::new().with_rows(vec![game_row(
            1,
            "The Legend of Zelda: Breath of the Wild",
            Some("2017-03-03"),
            false,
        )]));

        let games = repo.get_by_title("zelda").await.unwrap();

        assert_eq!(games.len(), 1);
        let call = &db.calls()[0];
        assert!(call.sql.contains("title ILIKE $1"));
        assert_eq!(call.params, vec![SqlValue::Text("%zelda%".into())]);
    }

    #[tokio::test]
    async fn test_get_by_developer_escapes_wildcards() {
        let (repo, db) = repo(MockExecutor::new());

        let games = repo.get_by_developer("50%_off").await.unwrap();

        assert!(games.is_empty());
        let call = &db.calls()[0];
        assert!(call.sql.contains("developer ILIKE $1"));
        assert_eq!(call.params, vec![SqlValue::Text(r"%50\%\_off%".into())]);
    }

    #[tokio::test]
    async fn test_get_by_multiplayer_binds_flag_unmodified() {
        let (repo, db) = repo(MockExecutor::new().with_rows(vec![]).with_rows(vec![]));

        repo.get_by_multiplayer(true).await.unwrap();
        repo.get_by_multiplayer(false).await.unwrap();

        let calls = db.calls();
        assert_eq!(calls[0].params, vec![SqlValue::Bool(true)]);
        assert_eq!(calls[1].params, vec![SqlValue::Bool(false)]);
    }

    #[tokio::test]
    async fn test_date_range_applies_both_bounds() {
        let (repo, db) = repo(MockExecutor::new());
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();

        repo.get_by_release_date_range(start, end).await.unwrap();

        let call = &db.calls()[0];
        assert!(call.sql.contains("release_date >= $1"));
        assert!(call.sql.contains("release_date <= $2"));
        assert_eq!(call.params, vec![SqlValue::Date(start), SqlValue::Date(end)]);
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let (repo, db) = repo(MockExecutor::new().with_rows(vec![game_row(
            5,
            "Among Us",
            Some("2018-06-15"),
            true,
        )]));

        let game = VideoGame::new("Among Us", "Studio", NaiveDate::from_ymd_opt(2018, 6, 15), true);
        let created = repo.create(game).await.unwrap();

        assert_eq!(created.id, Some(5));
        let call = &db.calls()[0];
        assert!(call.sql.starts_with("INSERT INTO video_games"));
        assert_eq!(call.params.len(), 4);
        assert_eq!(call.params[2], SqlValue::Date(NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()));
    }

    #[tokio::test]
    async fn test_create_without_date_binds_null() {
        let (repo, db) = repo(MockExecutor::new().with_rows(vec![game_row(6, "X", None, false)]));

        repo.create(VideoGame::new("X", "Studio", None, false))
            .await
            .unwrap();

        assert_eq!(db.calls()[0].params[2], SqlValue::Null);
    }

    #[tokio::test]
    async fn test_update_changes_only_title() {
        let (repo, db) = repo(
            MockExecutor::new()
                .with_rows(vec![game_row(4, "The Witcher 3: Wild Hunt", Some("2015-05-19"), false)])
                .with_rows(vec![game_row(4, "New Title", Some("2015-05-19"), false)]),
        );

        let updated = repo
            .update(
                4,
                UpdateVideoGame {
                    title: Some("New Title".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New Title");
        let calls = db.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].sql.trim_start().starts_with("UPDATE video_games"));
        assert_eq!(
            calls[1].params,
            vec![
                SqlValue::Int(4),
                SqlValue::Text("New Title".into()),
                SqlValue::Text("Studio".into()),
                SqlValue::Date(NaiveDate::from_ymd_opt(2015, 5, 19).unwrap()),
                SqlValue::Bool(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (repo, db) = repo(MockExecutor::new());

        let err = repo.update(99, UpdateVideoGame::default()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        // No write is attempted
        assert_eq!(db.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_row_vanished_is_not_found() {
        let (repo, _) = repo(
            MockExecutor::new()
                .with_rows(vec![game_row(4, "Gone", None, false)])
                .with_rows(vec![]),
        );

        let err = repo.update(4, UpdateVideoGame::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, db) = repo(MockExecutor::new().with_affected(1).with_affected(0));

        repo.delete(3).await.unwrap();
        let err = repo.delete(3).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(db.calls()[0].params, vec![SqlValue::Int(3)]);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (repo, _) = repo(MockExecutor::new().with_failure("connection reset"));

        let err = repo.get_all().await.unwrap_err();
        assert!(err.is_storage());
    }
}
