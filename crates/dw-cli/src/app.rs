use crate::{
    commands::Commands,
    error::{CliError, Result as CliResult},
    render,
};

use dw_config::{ApiConfig, Config, FeedConfig};
use dw_feed::{FeedSettings, LiveFeedClient};
use dw_session::{
    ApiClient, ApiSettings, FileStore, Registration, Route, RouteDecision, SessionManager, guard,
};

use std::sync::Arc;

use log::{info, warn};
use serde_json::{Value, json};

/// Environment variable consulted when `--password` is omitted.
pub const PASSWORD_ENV: &str = "DW_PASSWORD";

const ADMIN_USERS_PATH: &str = "/admin/users";

/// Session manager and API client built from the effective config.
pub struct App {
    config: Config,
    session: SessionManager,
    api: ApiClient,
}

impl App {
    pub fn new(config: Config) -> CliResult<Self> {
        let settings = api_settings(&config.api);
        let store = FileStore::new(config.session_path()?);
        let session = SessionManager::new(settings.clone(), Arc::new(store))?;
        session.restore();

        let api = ApiClient::new(&settings, session.clone())?;

        Ok(Self {
            config,
            session,
            api,
        })
    }

    /// Run one command. `None` means the command produced its own output.
    pub async fn run(&self, command: Commands, pretty: bool) -> CliResult<Option<Value>> {
        match command {
            Commands::Login { username, password } => {
                let password = resolve_password(password)?;
                self.session.login(&username, &password).await?;
                Ok(Some(self.whoami()))
            }
            Commands::Register {
                username,
                email,
                password,
            } => {
                let password = resolve_password(password)?;
                let registration = Registration::self_service(username, email, password);
                self.session.register(&registration).await?;
                Ok(Some(json!({
                    "registered": registration.username,
                    "message": "Account created. Sign in with `dw login` to continue.",
                })))
            }
            Commands::Logout => {
                self.session.logout();
                Ok(Some(json!({ "authenticated": false })))
            }
            Commands::Whoami => Ok(Some(self.whoami())),
            Commands::Get { path } => {
                self.authorize(Route::Dashboard)?;
                Ok(Some(self.api.get(&path).await?))
            }
            Commands::Users => {
                self.authorize(Route::UserManagement)?;
                Ok(Some(self.api.get(ADMIN_USERS_PATH).await?))
            }
            Commands::Feed {
                critical_only,
                json,
            } => {
                self.authorize(Route::LiveOps)?;
                let options = render::FeedOptions {
                    critical_only,
                    json,
                    pretty,
                };
                self.tail_feed(options).await?;
                Ok(None)
            }
        }
    }

    fn whoami(&self) -> Value {
        let session = self.session.session();
        json!({
            "authenticated": session.is_authenticated(),
            "username": session.identity().map(|i| i.username.clone()),
            "role": session.role().map(|r| r.as_str()),
            "admin": session.is_admin(),
        })
    }

    fn authorize(&self, route: Route) -> CliResult<()> {
        match guard(&self.session.session(), route) {
            RouteDecision::Render => Ok(()),
            RouteDecision::Forbidden => Err(CliError::Forbidden {
                route: format!("{route:?}"),
            }),
            RouteDecision::Wait | RouteDecision::Redirect(_) => Err(CliError::NotSignedIn),
        }
    }

    async fn tail_feed(&self, options: render::FeedOptions) -> CliResult<()> {
        let client = LiveFeedClient::new(feed_settings(&self.config.feed));
        let mut state_rx = client.subscribe_state();
        let mut events_rx = client.subscribe_events();
        let mut seen = 0;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        client.connect();
        info!("Tailing {} (Ctrl+C to stop)", self.config.feed.url);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl+C: {e}");
                    }
                    break;
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *state_rx.borrow_and_update();
                    eprintln!("{}", render::state_line(state));
                }
                changed = events_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let fresh = {
                        let window = events_rx.borrow_and_update();
                        let fresh = render::fresh_events(&window, seen);
                        seen = window.total_received();
                        fresh
                    };
                    for event in fresh.iter().filter(|e| !options.critical_only || e.is_critical()) {
                        println!("{}", render::event_output(event, &options)?);
                    }
                }
            }
        }

        client.teardown().await;
        if client.parse_failures() > 0 {
            warn!("{} malformed feed messages dropped", client.parse_failures());
        }

        Ok(())
    }
}

/// Map the `[api]` section onto session/API client settings.
pub fn api_settings(config: &ApiConfig) -> ApiSettings {
    let mut settings = ApiSettings::new(&config.base_url);
    settings.login_path = config.login_path.clone();
    settings.register_path = config.register_path.clone();
    settings.api_key = config.api_key.clone();
    settings.timeout = config.timeout();
    settings
}

/// Map the `[feed]` section onto live feed settings.
pub fn feed_settings(config: &FeedConfig) -> FeedSettings {
    let mut settings = FeedSettings::new(config.url.clone());
    settings.reconnect_delay = config.reconnect_delay();
    settings.window_size = config.window_size;
    settings
}

pub(crate) fn resolve_password(password: Option<String>) -> CliResult<String> {
    password
        .filter(|p| !p.is_empty())
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .ok_or(CliError::MissingPassword { env: PASSWORD_ENV })
}
