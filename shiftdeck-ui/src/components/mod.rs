//! Reusable UI components

mod data_table;
mod modal;
mod sidebar;
mod stat_card;
mod status_badge;
mod toast;
mod top_bar;

pub use data_table::DataTable;
pub use modal::Modal;
pub use sidebar::Sidebar;
pub use stat_card::StatCard;
pub use status_badge::StatusBadge;
pub use toast::ToastList;
pub use top_bar::TopBar;
