//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_auth::MemoryLocation;
use shop_core::{Shell, ShellConfig};
use shop_data::{FetchError, Request, RequestInterceptor, Transport};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Shell configuration, after env overrides.
    pub config: ShellConfig,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load context from a config file, or the nearest `shop.toml` upwards.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let config = match config_path {
            Some(path) => ShellConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path))?,
            None => {
                let cwd =
                    std::env::current_dir().context("Failed to get current directory")?;
                Self::find_config(&cwd).unwrap_or_default()
            }
        };
        let config = config.apply_env();
        output.debug(&format!(
            "origin {} api {}",
            config.origin,
            config.api_base_url.as_deref().unwrap_or("(same-origin)")
        ));

        Ok(Self { config, output })
    }

    fn find_config(start: &Path) -> Option<ShellConfig> {
        let config_names = ["shop.toml", ".shop.toml", "shop.json"];

        let mut current = PathBuf::from(start);
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = ShellConfig::load(&config_path) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Build a shell that records hard navigations in `location`.
    ///
    /// Without a `transport` the shell talks to the configured backend.
    pub fn shell(
        &self,
        transport: Option<Arc<dyn Transport>>,
        location: Arc<MemoryLocation>,
        cookie: Option<String>,
    ) -> Result<Shell> {
        let mut builder = Shell::builder(self.config.clone()).location(location);
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        if let Some(cookie) = cookie {
            anyhow::ensure!(cookie.contains('='), "cookie must be name=value: {}", cookie);
            builder = builder.request_interceptor(Arc::new(SessionCookie(cookie)));
        }
        builder.build().context("Failed to build shell")
    }
}

/// Adds a fixed `Cookie` header to every request.
struct SessionCookie(String);

impl RequestInterceptor for SessionCookie {
    fn on_request(&self, mut request: Request) -> Result<Request, FetchError> {
        request.headers.insert("Cookie".to_string(), self.0.clone());
        Ok(request)
    }
}
