//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;

use super::{prepare_schema, App};

impl App {
    /// Create the schema and seed data, then exit.
    pub async fn run_init(&self, reset: bool) -> Result<()> {
        let config = Config::load()?;
        let ctx = Context::connect(config)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?;

        let result = prepare_schema(&ctx, reset).await;
        ctx.shutdown();
        result
    }
}
