//! Guarded navigation runs.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use shop_auth::MemoryLocation;
use shop_core::ShellConfig;
use shop_data::{Method, MockTransport, Response, Transport};

use super::{NavigateArgs, Persona};
use crate::context::Context;

#[derive(Debug, Serialize)]
struct Outcome {
    requested: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    landed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<String>,
    redirected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the navigate command.
pub async fn run(args: NavigateArgs, ctx: &Context) -> Result<()> {
    let location = Arc::new(MemoryLocation::new());
    let transport = args.persona.map(|p| scripted_transport(p, &ctx.config));
    if let Some(persona) = args.persona {
        ctx.output.debug(&format!("answering user info locally as {:?}", persona));
    }
    let shell = ctx.shell(transport, location.clone(), args.cookie)?;

    let mut outcomes = Vec::with_capacity(args.paths.len());
    for path in args.paths {
        let outcome = match shell.navigate(path.as_str()).await {
            Ok(nav) => Outcome {
                landed: Some(nav.route.full_path()),
                route: nav.route.name.clone(),
                redirected: nav.redirected_from.is_some(),
                requested: path,
                error: None,
            },
            Err(e) => Outcome {
                requested: path,
                landed: None,
                route: None,
                redirected: false,
                error: Some(e.to_string()),
            },
        };
        outcomes.push(outcome);
    }
    let hard = location.visits();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "navigations": outcomes,
            "hard_navigations": hard,
            "authenticated": shell.session().is_authenticated(),
        }));
        return Ok(());
    }

    ctx.output.header("Navigations");
    for outcome in &outcomes {
        match (&outcome.landed, &outcome.error) {
            (Some(landed), _) if outcome.redirected => ctx.output.warn(&format!(
                "{} -> {} ({})",
                outcome.requested,
                landed,
                outcome.route.as_deref().unwrap_or("unnamed")
            )),
            (Some(landed), _) => ctx.output.success(&format!(
                "{} ({})",
                landed,
                outcome.route.as_deref().unwrap_or("unnamed")
            )),
            (None, error) => ctx.output.error(&format!(
                "{}: {}",
                outcome.requested,
                error.as_deref().unwrap_or("failed")
            )),
        }
    }
    for href in &hard {
        ctx.output.warn(&format!("page reloaded at {}", href));
    }
    match shell.session().user() {
        Some(user) => ctx.output.info(&format!("session: {}", user.display_name())),
        None => ctx.output.info("session: none"),
    }
    Ok(())
}

/// A transport answering only the user-info endpoint, as `persona`.
fn scripted_transport(persona: Persona, config: &ShellConfig) -> Arc<dyn Transport> {
    let url = match &config.api_base_url {
        Some(base) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            config.user_info_path.trim_start_matches('/')
        ),
        None => config.user_info_path.clone(),
    };
    let reply = match persona {
        Persona::Guest => Response::status_only(401),
        Persona::Customer => Response::json_body(
            200,
            &json!({ "user": { "id": 2, "username": "customer", "name": "Customer" } }),
        ),
        Persona::Admin => Response::json_body(
            200,
            &json!({ "user": { "id": 1, "username": "admin", "name": "Admin", "is_admin": true } }),
        ),
    };
    let mock = MockTransport::new();
    mock.route(Method::Get, url, Ok(reply));
    Arc::new(mock)
}
