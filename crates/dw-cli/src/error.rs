use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] dw_config::ConfigError),

    #[error("{}", .0.message())]
    Session(#[from] dw_session::SessionError),

    #[error("{0}")]
    Api(#[from] dw_session::ApiError),

    #[error("Not signed in. Run `dw login <username>` first.")]
    NotSignedIn,

    #[error("Access denied: {route} requires the admin role")]
    Forbidden { route: String },

    #[error("No password given. Pass --password or set {env}.")]
    MissingPassword { env: &'static str },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
