//! Console sections

mod dashboard;
mod resources;

pub use dashboard::Dashboard;
pub use resources::ResourcePage;
