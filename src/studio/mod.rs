pub mod render;
pub mod server;
pub mod session;
pub mod state;

pub use server::{routes, run, AppState};
pub use session::SessionStore;
pub use state::{GalleryView, PendingGeneration, StudioState};
