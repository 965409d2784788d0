//! Schema migration - the video_games table and its indexes.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::migrations::Migration;

pub struct M001Schema;

impl Migration for M001Schema {
    fn id(&self) -> &'static str {
        "m001_schema"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "video_games table with title, developer and release_date indexes"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            ctx.batch_sql(
                r#"
                CREATE TABLE IF NOT EXISTS video_games (
                    id BIGSERIAL PRIMARY KEY,
                    title VARCHAR(100) NOT NULL,
                    developer VARCHAR(100) NOT NULL,
                    release_date DATE NULL,
                    is_multiplayer BOOLEAN NOT NULL DEFAULT FALSE
                );

                CREATE INDEX IF NOT EXISTS video_games_title_idx
                ON video_games (title);

                CREATE INDEX IF NOT EXISTS video_games_developer_idx
                ON video_games (developer);

                CREATE INDEX IF NOT EXISTS video_games_release_date_idx
                ON video_games (release_date);
                "#,
            )
            .await
        }
        .boxed()
    }
}
