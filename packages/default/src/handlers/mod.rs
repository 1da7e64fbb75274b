pub mod environments;
pub mod state;
pub mod status;

pub use state::AppState;
