//! API request handlers

mod app_deployments;
mod health;
mod resolve;

pub use app_deployments::*;
pub use health::*;
pub use resolve::*;
