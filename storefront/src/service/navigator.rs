//! Navigation state
//!
//! Keeps track of the current location and runs the route guard on every navigation and on
//! every session change.

use guard::{Access, Outcome, View};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::service::session::{Session, SessionStore};

pub struct Navigator {
    /// Followed session
    session: watch::Receiver<Session>,
    /// Current view
    location: View,
    /// View the user was redirected to login from
    return_to: Option<View>,
}

impl Navigator {
    /// Creates a navigator starting at the home view
    pub fn new(store: &SessionStore) -> Self {
        Self {
            session: store.subscribe(),
            location: View::Home,
            return_to: None,
        }
    }

    pub fn location(&self) -> View {
        self.location
    }

    pub fn access(&self) -> Access {
        self.session.borrow().access()
    }

    /// Navigation links for the current session
    pub fn links(&self) -> Vec<View> {
        guard::nav_links(self.access())
    }

    /// Navigates to `view`, running the guard against the current session
    #[instrument(skip(self))]
    pub fn navigate(&mut self, view: View) -> Outcome {
        let access = self.session.borrow_and_update().access();
        let outcome = guard::navigate(view, access);

        match outcome {
            Outcome::Redirect { from, .. } => self.return_to = Some(from),
            // Redirection target is kept while the login view is shown
            Outcome::Render(View::Login) => (),
            Outcome::Render(_) | Outcome::Unauthorized(_) => self.return_to = None,
        }

        self.location = outcome.location();
        debug!(?access, ?outcome, "Navigated");
        outcome
    }

    /// Navigates to the view mounted at `path`
    pub fn open(&mut self, path: &str) -> Outcome {
        self.navigate(View::from_path(path))
    }

    /// Waits for the next session change and re-runs the guard for the current location
    ///
    /// Returns `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<Outcome> {
        self.session.changed().await.ok()?;

        let location = self.location;
        let outcome = self.navigate(location);
        if !outcome.renders(location) {
            info!(%location, ?outcome, "Session changed, leaving the view");
        }

        Some(outcome)
    }

    /// Moves on after a successful login
    ///
    /// Goes back to the view the user was redirected from. Without one, administrators land
    /// on the admin panel and users on the product list.
    pub fn after_login(&mut self) -> Outcome {
        let target = match self.return_to.take() {
            Some(view) => view,
            None if self.access() == Access::AuthenticatedAdmin => View::Admin,
            None => View::Products,
        };

        self.navigate(target)
    }

    /// Moves on to the order history after placing an order
    pub fn after_checkout(&mut self) -> Outcome {
        self.navigate(View::Orders)
    }

    /// Moves on after logout
    pub fn after_logout(&mut self) -> Outcome {
        self.return_to = None;
        self.navigate(View::Home)
    }
}
