//! Toast bar for notifications raised by the dispatcher.

use std::time::Duration;

use iocraft::prelude::*;

use crate::notify::Notification;
use crate::tui::theme::theme;

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Render the toast bar, or nothing when there is no toast.
pub fn render_toast(toast: &Option<Notification>) -> Option<AnyElement<'static>> {
    toast.as_ref().map(|t| {
        let color = theme().notification_color(t.kind);
        element! {
            View(
                width: 100pct,
                height: 3,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                background_color: Color::Black,
                border_edges: Edges::Top,
                border_style: BorderStyle::Single,
                border_color: color,
            ) {
                Text(content: t.message.clone(), color: color)
            }
        }
        .into_any()
    })
}
