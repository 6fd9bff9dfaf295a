use crate::models::Role;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "admin-console")]
#[command(version, about = "Administer users, players and dashboard data", long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/base.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "ADMIN_CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Clear the local session and revoke it remotely
    Logout,
    /// Show the signed-in operator, revalidated against the backend
    Whoami {
        /// Print the cached snapshot without a network call
        #[arg(long)]
        cached: bool,
    },
    /// Show local session state without any network call
    Status,
    /// Create a new account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Read from stdin when omitted
        #[arg(long, env = "ADMIN_CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Ask for a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Change the signed-in operator's password
    ChangePassword {
        #[arg(long, env = "ADMIN_CONSOLE_OLD_PASSWORD", hide_env_values = true)]
        old_password: String,
        #[arg(long, env = "ADMIN_CONSOLE_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Update the signed-in operator's profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// User management (admin only)
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Player management
    Players {
        #[command(subcommand)]
        command: PlayersCommand,
    },
    /// Dashboard counters
    Stats,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_CONSOLE_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value_t = Role::Player)]
        role: Role,
        /// Create the account disabled
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Delete {
        id: String,
    },
    Activate {
        id: String,
    },
    Deactivate {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct PlayerFields {
    #[arg(long)]
    pub position: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub nationality: Option<String>,
    #[arg(long)]
    pub club: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PlayersCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        position: Option<String>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[command(flatten)]
        fields: PlayerFields,
    },
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[command(flatten)]
        fields: PlayerFields,
    },
    Delete {
        id: String,
    },
    UploadPhoto {
        id: String,
        file: PathBuf,
    },
}
