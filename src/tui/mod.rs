//! Interactive terminal dashboard
//!
//! - `dashboard` - role-scoped ticket queues, ticket actions and statistics

pub mod components;
pub mod dashboard;
pub mod theme;

pub use dashboard::{Dashboard, DashboardContext, DashboardProps};
pub use theme::Theme;
