//! Route table listing.

use anyhow::Result;
use serde::Serialize;
use shop_core::storefront_routes;
use shop_router::{RouteEntry, RouteRegistry};

use super::RoutesArgs;
use crate::context::Context;
use crate::output::access_badge;

#[derive(Debug, Serialize)]
struct RouteRow {
    name: Option<String>,
    pattern: String,
    requires_auth: bool,
    requires_admin: bool,
    views: Vec<&'static str>,
}

impl From<&RouteEntry> for RouteRow {
    fn from(entry: &RouteEntry) -> Self {
        Self {
            name: entry.name.clone(),
            pattern: entry.pattern.clone(),
            requires_auth: entry.meta.requires_auth(),
            requires_admin: entry.meta.requires_admin(),
            views: entry.views.iter().map(|v| v.0).collect(),
        }
    }
}

/// Run the routes command.
pub async fn run(args: RoutesArgs, ctx: &Context) -> Result<()> {
    let registry = RouteRegistry::new(storefront_routes())?;
    let rows: Vec<RouteRow> = registry
        .entries()
        .iter()
        .filter(|entry| !args.protected || entry.meta.is_protected())
        .map(RouteRow::from)
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Routes");
    let widths = [18, 24, 8];
    ctx.output.table_row(&["NAME", "PATH", "ACCESS"], &widths);
    for row in &rows {
        let badge = access_badge(row.requires_auth, row.requires_admin);
        ctx.output.table_row(
            &[row.name.as_deref().unwrap_or("-"), &row.pattern, &badge],
            &widths,
        );
    }
    ctx.output.info(&format!("{} routes", rows.len()));
    Ok(())
}
