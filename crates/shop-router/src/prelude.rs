//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use shop_router::prelude::*;
//! ```

pub use crate::{
    AuthGuard, GuardDecision, Location, Navigation, NavigationGuard, NavigationTarget,
    ResolvedRoute, RouteMeta, RouteRecord, RouteRegistry, Router,
};
