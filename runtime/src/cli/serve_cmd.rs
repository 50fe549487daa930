//! `sitecheck serve`: run the JSON API.

use crate::cli::output::{self, Styled};
use crate::cli::Context;
use crate::server::{self, AppState};
use anyhow::{Context as _, Result};
use tokio::net::TcpListener;

/// Serve until interrupted. `bind` overrides the configured address.
pub async fn run(ctx: Context, bind: Option<&str>) -> Result<()> {
    let addr = match bind {
        Some(addr) => addr.to_string(),
        None => ctx.settings.bind_addr()?.to_string(),
    };
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    if !output::is_quiet() && !output::is_json() {
        let s = Styled::new();
        output::print_header(&s);
        output::print_check(s.ok_sym(), "API:", &format!("http://{}/api", listener.local_addr()?));
        output::print_check(
            s.info_sym(),
            "Database:",
            &ctx.settings.database_path().display().to_string(),
        );
        eprintln!();
    }

    let state = AppState::new(ctx.session, ctx.client);
    tokio::select! {
        res = server::serve(listener, state) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
