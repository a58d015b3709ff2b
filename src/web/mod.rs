pub mod auth;
pub mod landing;
pub mod router;
pub mod session;
pub mod state;
pub mod templates;
pub mod upload;

pub use state::AppState;
