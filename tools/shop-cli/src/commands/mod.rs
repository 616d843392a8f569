//! CLI command implementations.

pub mod navigate;
pub mod routes;
pub mod whoami;

use clap::{Args, ValueEnum};

/// Arguments for the routes command.
#[derive(Args)]
pub struct RoutesArgs {
    /// Only show routes that require authentication.
    #[arg(long)]
    pub protected: bool,
}

/// Arguments for the whoami command.
#[derive(Args)]
pub struct WhoamiArgs {
    /// Session cookie to send, as `name=value`.
    #[arg(long)]
    pub cookie: Option<String>,
}

/// Arguments for the navigate command.
#[derive(Args)]
pub struct NavigateArgs {
    /// Paths to visit, in order.
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Answer the user-info endpoint locally instead of calling the backend.
    #[arg(long = "as", value_enum)]
    pub persona: Option<Persona>,

    /// Session cookie to send, as `name=value`.
    #[arg(long)]
    pub cookie: Option<String>,
}

/// Scripted session for offline navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Persona {
    /// No session: the user-info endpoint answers 401.
    Guest,
    /// Signed in without admin rights.
    Customer,
    /// Signed in as a store administrator.
    Admin,
}
