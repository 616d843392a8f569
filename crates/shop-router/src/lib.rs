//! Client-side routing for the storefront shell.
//!
//! Routes are declared once as a tree and compiled into a flat
//! [`RouteRegistry`]:
//!
//! ```text
//! /                 MainLayout
//! ├── ""            -> /            Home
//! ├── product/:id   -> /product/:id Product
//! └── orders        -> /orders      Orders   (requires auth)
//! /admin            AdminLayout     (requires auth + admin)
//! └── users         -> /admin/users AdminUsers
//! /*path            -> NotFound     (catch-all)
//! ```
//!
//! Every [`Router::push`] runs the guard chain before the route is committed.
//! [`AuthGuard`] is the guard that ties navigation to the session store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shop_router::prelude::*;
//!
//! let router = Router::new(RouteRegistry::new(routes)?)
//!     .before_each(Arc::new(AuthGuard::new(session.clone())));
//!
//! let nav = router.push("/orders").await?;
//! if let Some(from) = nav.redirected_from {
//!     println!("{} -> {}", from, nav.route.full_path());
//! }
//! ```

mod auth_guard;
mod error;
mod guard;
mod location;
pub mod prelude;
mod route;
mod router;

pub use auth_guard::{AuthDecision, AuthGuard};
pub use error::{NavigationError, RouteError};
pub use guard::{GuardDecision, NavigationGuard};
pub use location::Location;
pub use route::*;
pub use router::{Navigation, Router, MAX_REDIRECTS};
