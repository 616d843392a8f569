//! Current-user lookup.

use std::sync::Arc;

use anyhow::{bail, Result};
use shop_auth::{MemoryLocation, User};

use super::WhoamiArgs;
use crate::context::Context;

/// Run the whoami command.
pub async fn run(args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let location = Arc::new(MemoryLocation::new());
    let shell = ctx.shell(None, location.clone(), args.cookie)?;
    let result = shell.session().fetch_user().await;
    let redirected = location.current();

    match result {
        Ok(user) => {
            print_user(&user, ctx);
            Ok(())
        }
        Err(e) => {
            if let Some(href) = redirected {
                ctx.output.warn(&format!("session rejected, page would reload at {}", href));
            }
            bail!("not signed in: {}", e)
        }
    }
}

fn print_user(user: &User, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(user);
        return;
    }
    ctx.output.success(&format!("Signed in as {}", user.display_name()));
    ctx.output.kv("id", &user.id.to_string());
    ctx.output.kv("username", &user.username);
    if !user.email.is_empty() {
        ctx.output.kv("email", &user.email);
    }
    ctx.output.kv("admin", if user.is_admin { "yes" } else { "no" });
    ctx.output.kv("balance", &format!("{:.2}", user.balance));
    if user.is_blocked {
        ctx.output.warn("account is blocked from purchasing");
    }
}
