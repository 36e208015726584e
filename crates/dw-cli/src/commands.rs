use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Sign in and persist the session
    Login {
        username: String,
        /// Password (falls back to DW_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account (does not sign in)
    Register {
        username: String,
        email: String,
        /// Password (falls back to DW_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the persisted session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Authorized GET against the API, e.g. `dw get /stats`
    Get { path: String },

    /// List user accounts (admin only)
    Users,

    /// Tail the live threat feed until Ctrl+C
    Feed {
        /// Only print events flagged as critical
        #[arg(long)]
        critical_only: bool,

        /// Print raw events as JSON lines
        #[arg(long)]
        json: bool,
    },
}
