//! Interactive dashboard command (`helpdesk dashboard`)
//!
//! Tickets are grouped in tabs by role-scoped view. Actions open modals and
//! results are reported as toasts.

use std::sync::Arc;

use iocraft::prelude::*;

use super::connect;
use crate::dispatch::ActionDispatcher;
use crate::error::{HelpdeskError, Result};
use crate::notify::{Notifier, ToastQueue};
use crate::tui::{Dashboard, DashboardContext};

/// Launch the dashboard TUI
pub async fn cmd_dashboard() -> Result<()> {
    let repository = connect()?;
    let toasts = Arc::new(ToastQueue::default());
    let notifier: Arc<dyn Notifier> = toasts.clone();
    let context = Arc::new(DashboardContext {
        dispatcher: Arc::new(ActionDispatcher::new(repository, notifier)),
        toasts,
    });

    element!(Dashboard(context: Some(context)))
        .fullscreen()
        .await
        .map_err(|e| HelpdeskError::Other(format!("TUI error: {e}")))
}
