//! HTTP server command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::http;

use super::{prepare_schema, App};

impl App {
    /// Run the web server until a shutdown signal arrives.
    pub async fn run_serve(&self, host: Option<&str>, port: Option<u16>, reset: bool) -> Result<()> {
        tracing::info!("Starting video game catalog server");

        let mut config = Config::load()?;
        if let Some(host) = host {
            config.server.host = host.to_string();
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        let reset = reset || config.server.reset_on_start;
        if reset {
            tracing::warn!("Catalog will be dropped and reseeded");
        }

        let (host, port) = (config.server.host.clone(), config.server.port);
        let addr = tokio::net::lookup_host((host.as_str(), port))
            .await
            .map_err(|e| eyre!("Invalid address {}:{}: {}", host, port, e))?
            .next()
            .ok_or_else(|| eyre!("Address {}:{} did not resolve", host, port))?;

        let ctx = Context::connect(config)
            .await
            .map_err(|e| eyre!("Failed to connect: {}", e))?;

        if let Err(e) = prepare_schema(&ctx, reset).await {
            ctx.shutdown();
            return Err(e);
        }

        let served = http::serve(ctx.clone(), addr).await;
        ctx.shutdown();
        served.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}
