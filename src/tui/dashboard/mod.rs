//! Helpdesk dashboard: one tab per ticket queue plus statistics, with
//! modals for the ticket actions the signed-in user may take.

pub mod model;
pub mod view;


pub use model::{
    ActionModal, DashboardAction, DashboardState, DashboardViewModel, Tab,
    compute_dashboard_view_model, key_to_action, reduce_dashboard_state, submit_request,
};
pub use view::{Dashboard, DashboardContext, DashboardProps};
