//! Who is making the request.
//!
//! Identity is an injected capability: an [`Identity`] maps a request to an
//! optional [`UserId`], and the [`Authenticate`] hoop resolves that id to a
//! [`Viewer`] stored in the depot for the handlers further down the chain.
//! Production uses [`SessionIdentity`]; tests plug in their own.

use std::fmt::{self, Debug, Formatter};

use salvo::prelude::*;
use salvo::session::{CookieStore, SessionDepotExt, SessionHandler};
use yatube_store::{Store, User, UserId};

use crate::config::{ConfigError, MIN_SESSION_SECRET_LEN};

/// Session key holding the logged in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

/// Resolves the user behind a request.
pub trait Identity: Send + Sync + 'static {
    /// Returns the authenticated user id, or `None` for anonymous requests.
    fn current_user(&self, req: &Request, depot: &Depot) -> Option<UserId>;
}

/// Reads the user id stored in the salvo session.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionIdentity;

impl Identity for SessionIdentity {
    fn current_user(&self, _req: &Request, depot: &Depot) -> Option<UserId> {
        depot.session()?.get::<i64>(SESSION_USER_KEY).map(UserId)
    }
}

/// Builds the cookie session hoop that [`SessionIdentity`] reads from.
pub fn session_handler(secret: &[u8]) -> Result<SessionHandler<CookieStore>, ConfigError> {
    if secret.len() < MIN_SESSION_SECRET_LEN {
        return Err(ConfigError::Invalid {
            key: "YATUBE_SESSION_SECRET",
            reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes long"),
        });
    }
    SessionHandler::builder(CookieStore::new(), secret)
        .build()
        .map_err(|e| ConfigError::Invalid {
            key: "YATUBE_SESSION_SECRET",
            reason: e.to_string(),
        })
}

/// The user a request is made on behalf of.
#[derive(Clone, Debug, Default)]
pub struct Viewer(Option<User>);

impl Viewer {
    /// A viewer logged in as `user`.
    #[must_use]
    pub fn user(user: User) -> Self {
        Self(Some(user))
    }

    /// An anonymous viewer.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn as_user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.id)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// Returns `true` if the viewer is the user with `id`.
    #[must_use]
    pub fn is(&self, id: UserId) -> bool {
        self.id() == Some(id)
    }

    /// The viewer injected by [`Authenticate`], anonymous if the hoop did not run.
    #[must_use]
    pub fn from_depot(depot: &Depot) -> Self {
        depot.obtain::<Self>().cloned().unwrap_or_default()
    }
}

/// Resolves the request's [`Identity`] to a [`Viewer`] in the depot.
///
/// Ids that no longer name a user degrade to an anonymous viewer.
pub struct Authenticate<I> {
    identity: I,
    store: Store,
}

impl<I> Debug for Authenticate<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticate").finish_non_exhaustive()
    }
}

impl<I: Identity> Authenticate<I> {
    pub fn new(identity: I, store: Store) -> Self {
        Self { identity, store }
    }
}

#[async_trait]
impl<I: Identity> Handler for Authenticate<I> {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, _res: &mut Response, _ctrl: &mut FlowCtrl) {
        let viewer = match self.identity.current_user(req, depot) {
            Some(id) => match self.store.find_user(id).await {
                Ok(Some(user)) => Viewer::user(user),
                Ok(None) => {
                    tracing::debug!(%id, "identity names an unknown user");
                    Viewer::anonymous()
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to load viewer");
                    Viewer::anonymous()
                }
            },
            None => Viewer::anonymous(),
        };
        depot.inject(viewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_handler_rejects_short_secret() {
        assert!(session_handler(b"short").is_err());
        assert!(session_handler(&[7u8; 64]).is_ok());
    }

    #[test]
    fn test_anonymous_viewer() {
        let depot = Depot::new();
        let viewer = Viewer::from_depot(&depot);
        assert!(!viewer.is_authenticated());
        assert!(!viewer.is(UserId(1)));
        assert_eq!(SessionIdentity.current_user(&Request::new(), &depot), None);
    }
}
