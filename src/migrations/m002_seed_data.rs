//! Seed data migration - the sample catalog.

use chrono::NaiveDate;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::db::{Query, SqlExecutor};
use crate::error::AppError;
use crate::migrations::Migration;

/// (title, developer, (year, month, day), is_multiplayer)
const SEED_GAMES: &[(&str, &str, (i32, u32, u32), bool)] = &[
    (
        "The Legend of Zelda: Breath of the Wild",
        "Nintendo",
        (2017, 3, 3),
        false,
    ),
    ("Minecraft", "Mojang Studios", (2011, 11, 18), true),
    ("Among Us", "InnerSloth", (2018, 6, 15), true),
    ("The Witcher 3: Wild Hunt", "CD Projekt Red", (2015, 5, 19), false),
];

pub struct M002SeedData;

impl Migration for M002SeedData {
    fn id(&self) -> &'static str {
        "m002_seed_data"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Sample video games"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            for &(title, developer, (y, m, d), is_multiplayer) in SEED_GAMES {
                let release_date = NaiveDate::from_ymd_opt(y, m, d)
                    .ok_or_else(|| AppError::Internal(format!("invalid seed date for {}", title)))?;

                Query::new(
                    ctx,
                    "INSERT INTO video_games (title, developer, release_date, is_multiplayer)
                     VALUES ($1, $2, $3, $4)",
                )
                .param(title)
                .param(developer)
                .param(release_date)
                .param(is_multiplayer)
                .run()
                .await?;
            }

            tracing::info!("Seeded {} video games", SEED_GAMES.len());
            Ok(())
        }
        .boxed()
    }
}
