pub mod handlers;
pub mod request_id;
pub mod routes;
pub mod state;

pub use request_id::REQUEST_ID_HEADER;
pub use routes::create_router;
pub use state::AppState;
