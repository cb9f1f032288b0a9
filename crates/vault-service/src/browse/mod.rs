//! Navigation state for a UI layer: the browse session (folder scope,
//! search query, sort) and the dashboard interaction state machine.

pub mod dashboard;
pub mod session;

pub use dashboard::{DashboardState, ItemRef};
pub use session::BrowseSession;
