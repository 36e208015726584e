use crate::Session;

/// Screens and command surfaces an operator can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Dashboard,
    LiveOps,
    Intelligence,
    Forensics,
    Network,
    Admin,
    Reports,
    Settings,
    /// The user-management tab of settings, admins only
    UserManagement,
}

impl Route {
    pub const PROTECTED: [Route; 9] = [
        Route::Dashboard,
        Route::LiveOps,
        Route::Intelligence,
        Route::Forensics,
        Route::Network,
        Route::Admin,
        Route::Reports,
        Route::Settings,
        Route::UserManagement,
    ];

    pub fn requires_admin(self) -> bool {
        matches!(self, Route::UserManagement)
    }
}

/// What the consumer should do for a route given the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still restoring, show nothing yet
    Wait,
    Render,
    Redirect(Route),
    /// Signed in, but the role does not allow this route
    Forbidden,
}

/// Decide how to handle `route` for `session`.
///
/// Pure function of the session, so re-evaluating it on every session
/// change is what moves an operator from the login screen to the
/// dashboard after a successful sign-in (and back after sign-out).
pub fn guard(session: &Session, route: Route) -> RouteDecision {
    if session.is_loading() {
        return RouteDecision::Wait;
    }

    let signed_in = session.is_authenticated();

    match route {
        Route::Login if signed_in => RouteDecision::Redirect(Route::Dashboard),
        Route::Login => RouteDecision::Render,
        Route::Root if signed_in => RouteDecision::Redirect(Route::Dashboard),
        _ if !signed_in => RouteDecision::Redirect(Route::Login),
        r if r.requires_admin() && !session.is_admin() => RouteDecision::Forbidden,
        _ => RouteDecision::Render,
    }
}
