//! Reusable dashboard components.

pub mod footer;
pub mod modal;
pub mod toast;

pub use footer::{Footer, Shortcut};
pub use modal::{Modal, ModalTone};
pub use toast::{TOAST_TTL, render_toast};
