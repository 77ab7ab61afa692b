pub mod activity;
pub mod conversations;
mod error;
pub mod ingest;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod users;

pub use routes::router;
pub use state::{AppState, AppStateInner};
