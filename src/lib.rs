#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Task-management REST backend: accounts and sessions, role-gated routes, tasks"]
#![doc = "with comments, and notifications fanned out from task and comment mutations."]
#![doc = "The binary (`main.rs`) wires these modules into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod notify;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
