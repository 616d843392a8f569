//! Storefront shell.
//!
//! Wires the pieces of the client shell together:
//!
//! - one [`HttpClient`](shop_data::HttpClient) with base URL, timeout and
//!   credentials from [`ShellConfig`]
//! - a [`SessionInvalidationHandler`] on that client that turns any 401 into
//!   a hard reload at the login page
//! - the [`SessionStore`](shop_auth::SessionStore), loaded lazily
//! - the guarded [`Router`](shop_router::Router) over [`storefront_routes`]
//! - the [`ToastStore`](shop_notify::ToastStore)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shop_core::prelude::*;
//!
//! let shell = Shell::builder(ShellConfig::default().apply_env()).build()?;
//!
//! match shell.navigate("/orders").await {
//!     Ok(nav) => println!("at {}", nav.route.full_path()),
//!     Err(e) => eprintln!("navigation failed: {}", e),
//! }
//! shell.toasts().success("Saved");
//! ```

mod app;
mod config;
mod error;
mod invalidation;
pub mod prelude;
mod routes;
mod telemetry;

pub use app::{Shell, ShellBuilder};
pub use config::{ShellConfig, ENV_API_BASE_URL, ENV_ORIGIN};
pub use error::ShellError;
pub use invalidation::SessionInvalidationHandler;
pub use routes::{names, storefront_routes};
pub use telemetry::{init_tracing, LogFormat};
