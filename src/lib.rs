pub mod ai;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod notify;
pub mod policy;
pub mod repository;
pub mod session;
pub mod stats;
pub mod ticket;
pub mod tui;
pub mod types;
pub mod user;

pub use api::{HelpdeskApi, HttpApi, TicketView};
pub use config::Config;
pub use dispatch::{ActionDispatcher, ActionRequest, Outcome};
pub use error::{HelpdeskError, Result};
pub use notify::{Notification, NotificationKind, Notifier, ToastQueue};
pub use policy::{Action, can_perform, legal_actions};
pub use repository::TicketRepository;
pub use session::Session;
pub use ticket::{NewTicket, Ticket};
pub use types::{AccessLevel, TicketPriority, TicketStatus};
