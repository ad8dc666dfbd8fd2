use clap::{Args, Parser, Subcommand};

use crate::ai::AiFeedback;
use crate::api::TicketView;
use crate::commands::{NewTicketOptions, UserFields};
use crate::types::{AccessLevel, TicketPriority};

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Terminal client for the helpdesk ticketing backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the configured user and what they may access
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tickets: mine (default), pending or escalated
    #[command(visible_alias = "ls")]
    Tickets {
        /// View to list
        #[arg(default_value = "mine", value_parser = parse_view)]
        view: TicketView,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a ticket and the actions available on it
    #[command(visible_alias = "s")]
    Show {
        /// Ticket number
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a new ticket
    New {
        /// Category (e.g. Hardware, Software, Rede)
        #[arg(short, long)]
        category: String,

        /// Short description of the problem
        #[arg(short, long)]
        problem: String,

        /// Priority: 1-4 or baixa, media, alta, urgente (default: 2)
        #[arg(long, default_value = "2", value_parser = parse_priority)]
        priority: TicketPriority,

        /// Optional title
        #[arg(short, long)]
        title: Option<String>,

        /// Detailed description
        #[arg(short, long)]
        description: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a ticket (access level 3+)
    Approve {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reject a ticket (access level 3+)
    Reject {
        id: u64,

        /// Reason, at least 10 characters
        #[arg(short, long)]
        motivo: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a ticket handled by an analyst as resolved (access level 2+)
    Resolve {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Escalate a ticket to a manager (access level 2+)
    Escalate {
        id: u64,

        /// Reason, at least 10 characters
        #[arg(short, long)]
        motivo: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve an escalated ticket (access level 3+)
    ResolveEscalated {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the AI-suggested solution for one of your tickets
    Solution {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tell whether the AI solution worked: deu-certo or deu-errado
    Feedback {
        id: u64,

        #[arg(value_parser = parse_feedback)]
        feedback: AiFeedback,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage users (use --help for subcommands)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Ticket statistics (access level 3+)
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard
    #[command(visible_alias = "ui")]
    Dashboard,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// User fields shared by `users create` and `users edit`
#[derive(Args, Debug, Clone, Default)]
pub struct UserArgs {
    #[arg(long)]
    pub matricula: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub profile_id: Option<u64>,

    /// Access level 1-5
    #[arg(long, value_parser = parse_access_level)]
    pub access_level: Option<AccessLevel>,

    /// Id of the manager who approves this user's tickets
    #[arg(long)]
    pub approver_id: Option<u64>,
}

impl From<UserArgs> for UserFields {
    fn from(args: UserArgs) -> Self {
        UserFields {
            matricula: args.matricula,
            name: args.name,
            email: args.email,
            department: args.department,
            profile_id: args.profile_id,
            access_level: args.access_level,
            approver_id: args.approver_id,
        }
    }
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users (access level 4+)
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user
    Show {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a user (access level 4+)
    Create {
        #[command(flatten)]
        fields: UserArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a user; only the given fields change
    Edit {
        id: u64,

        #[command(flatten)]
        fields: UserArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deactivate a user (access level 4+)
    Deactivate {
        id: u64,

        /// Reason, at least 10 characters
        #[arg(short, long)]
        motivo: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List backups of deleted users
    Deleted {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a deleted user from its backup
    Restore {
        /// Backup id (see `users deleted`)
        backup_id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, request_timeout, session.email, session.name,
        /// session.access_level, session.user_id)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            cmd_approve, cmd_config_get, cmd_config_set, cmd_config_show, cmd_dashboard,
            cmd_escalate, cmd_feedback, cmd_new, cmd_reject, cmd_resolve, cmd_resolve_escalated,
            cmd_show, cmd_solution, cmd_stats, cmd_tickets, cmd_users_create,
            cmd_users_deactivate, cmd_users_deleted, cmd_users_edit, cmd_users_ls,
            cmd_users_restore, cmd_users_show, cmd_whoami,
        };

        match self {
            Commands::Whoami { json } => cmd_whoami(json),
            Commands::Tickets { view, json } => cmd_tickets(view, json).await,
            Commands::Show { id, json } => cmd_show(id, json).await,
            Commands::New {
                category,
                problem,
                priority,
                title,
                description,
                json,
            } => {
                let options = NewTicketOptions {
                    category,
                    problem,
                    priority,
                    title,
                    description,
                };
                cmd_new(options, json).await
            }

            Commands::Approve { id, json } => cmd_approve(id, json).await,
            Commands::Reject { id, motivo, json } => cmd_reject(id, &motivo, json).await,
            Commands::Resolve { id, json } => cmd_resolve(id, json).await,
            Commands::Escalate { id, motivo, json } => cmd_escalate(id, &motivo, json).await,
            Commands::ResolveEscalated { id, json } => cmd_resolve_escalated(id, json).await,
            Commands::Solution { id, json } => cmd_solution(id, json).await,
            Commands::Feedback { id, feedback, json } => cmd_feedback(id, feedback, json).await,

            Commands::Users { action } => match action {
                UsersAction::Ls { json } => cmd_users_ls(json).await,
                UsersAction::Show { id, json } => cmd_users_show(id, json).await,
                UsersAction::Create { fields, json } => {
                    cmd_users_create(fields.into(), json).await
                }
                UsersAction::Edit { id, fields, json } => {
                    cmd_users_edit(id, fields.into(), json).await
                }
                UsersAction::Deactivate { id, motivo, json } => {
                    cmd_users_deactivate(id, &motivo, json).await
                }
                UsersAction::Deleted { json } => cmd_users_deleted(json).await,
                UsersAction::Restore { backup_id, json } => {
                    cmd_users_restore(backup_id, json).await
                }
            },

            Commands::Stats { json } => cmd_stats(json).await,
            Commands::Dashboard => cmd_dashboard().await,

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            },
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_priority(s: &str) -> Result<TicketPriority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        &["1", "2", "3", "4", "baixa", "media", "alta", "urgente"],
    )
}

fn parse_view(s: &str) -> Result<TicketView, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "view",
        &["mine", "pending", "escalated"],
    )
}

fn parse_feedback(s: &str) -> Result<AiFeedback, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "feedback",
        &["deu-certo", "deu-errado"],
    )
}

fn parse_access_level(s: &str) -> Result<AccessLevel, String> {
    parse_with_validation(
        s,
        |v| {
            let level: u8 = v.parse().map_err(|_| String::new())?;
            AccessLevel::new(level).map_err(|_| String::new())
        },
        "access level",
        &["1", "2", "3", "4", "5"],
    )
}
