//! Storefront route guard
//!
//! Decides whether a view is reachable for the current session. Everything here is a pure
//! function of the session's access state, so it can be evaluated on every navigation and on
//! every session change without side effects.

mod view;

pub use view::View;

/// Resolved user profile, as far as the guard is concerned
pub trait Principal {
    /// Server asserted administrator flag
    fn is_admin(&self) -> bool;
}

/// Session state derived from the resolved user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// No resolved user
    #[default]
    Anonymous,
    /// Regular user
    Authenticated,
    /// User with administrator rights
    AuthenticatedAdmin,
}

impl Access {
    /// Computes the access state for an optional user
    pub fn of<P: Principal>(user: Option<&P>) -> Self {
        match user {
            None => Access::Anonymous,
            Some(user) if user.is_admin() => Access::AuthenticatedAdmin,
            Some(_) => Access::Authenticated,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self != Access::Anonymous
    }
}

/// Access requirement declared by a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    Public,
    RequiresAuth,
    RequiresAdmin,
}

/// Guard decision for a single requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    /// Signed in, but without the role the view needs
    Unauthorized,
}

impl Requirement {
    pub fn decide(self, access: Access) -> Decision {
        use Access::*;

        match (self, access) {
            (Requirement::Public, _) => Decision::Allow,
            (Requirement::RequiresAuth, Anonymous) => Decision::RedirectToLogin,
            (Requirement::RequiresAuth, Authenticated | AuthenticatedAdmin) => Decision::Allow,
            (Requirement::RequiresAdmin, Anonymous) => Decision::RedirectToLogin,
            (Requirement::RequiresAdmin, Authenticated) => Decision::Unauthorized,
            (Requirement::RequiresAdmin, AuthenticatedAdmin) => Decision::Allow,
        }
    }
}

/// Result of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Requested view is rendered
    Render(View),
    /// Navigation ends up on the login view instead of `from`
    Redirect { to: View, from: View },
    /// Requested view is replaced by the unauthorized page
    Unauthorized(View),
}

impl Outcome {
    /// View the navigation lands on
    pub fn location(self) -> View {
        match self {
            Outcome::Render(view) | Outcome::Unauthorized(view) => view,
            Outcome::Redirect { to, .. } => to,
        }
    }

    /// Checks if the view content is shown (and so its data may be fetched)
    pub fn renders(self, view: View) -> bool {
        self == Outcome::Render(view)
    }
}

/// Runs the guard for a navigation to `view`
pub fn navigate(view: View, access: Access) -> Outcome {
    match view.requirement().decide(access) {
        Decision::Allow => Outcome::Render(view),
        Decision::RedirectToLogin => Outcome::Redirect {
            to: View::Login,
            from: view,
        },
        Decision::Unauthorized => Outcome::Unauthorized(view),
    }
}

/// Navigation links shown for the access state, in display order
///
/// The last link is the account entry: `Profile` when signed in, `Login` otherwise.
pub fn nav_links(access: Access) -> Vec<View> {
    let mut links = vec![View::Products];
    if access.is_authenticated() {
        links.extend([View::Cart, View::Orders]);
    }
    if access == Access::AuthenticatedAdmin {
        links.push(View::Admin);
    }

    links.push(if access.is_authenticated() {
        View::Profile
    } else {
        View::Login
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Profile {
        is_admin: bool,
    }

    impl Principal for Profile {
        fn is_admin(&self) -> bool {
            self.is_admin
        }
    }

    #[test]
    fn access_from_profile() {
        assert_eq!(Access::of::<Profile>(None), Access::Anonymous);
        assert_eq!(
            Access::of(Some(&Profile { is_admin: false })),
            Access::Authenticated
        );
        assert_eq!(
            Access::of(Some(&Profile { is_admin: true })),
            Access::AuthenticatedAdmin
        );
    }

    #[test]
    fn public_views_are_always_reachable() {
        for access in [
            Access::Anonymous,
            Access::Authenticated,
            Access::AuthenticatedAdmin,
        ] {
            assert_eq!(navigate(View::Products, access), Outcome::Render(View::Products));
            assert_eq!(navigate(View::Login, access), Outcome::Render(View::Login));
            assert_eq!(navigate(View::NotFound, access), Outcome::Render(View::NotFound));
        }
    }

    #[test]
    fn protected_views_redirect_anonymous() {
        for view in [
            View::Profile,
            View::Cart,
            View::Orders,
            View::Admin,
            View::Assistant,
        ] {
            assert_eq!(
                navigate(view, Access::Anonymous),
                Outcome::Redirect {
                    to: View::Login,
                    from: view
                }
            );
        }
    }

    #[test]
    fn protected_views_render_for_users() {
        for access in [Access::Authenticated, Access::AuthenticatedAdmin] {
            for view in [View::Profile, View::Cart, View::Orders, View::Assistant] {
                assert_eq!(navigate(view, access), Outcome::Render(view));
            }
        }
    }

    #[test]
    fn admin_view_for_regular_user_is_unauthorized_not_redirect() {
        let outcome = navigate(View::Admin, Access::Authenticated);
        assert_eq!(outcome, Outcome::Unauthorized(View::Admin));
        assert_eq!(outcome.location(), View::Admin);
        assert!(!outcome.renders(View::Admin));

        assert_eq!(
            navigate(View::Admin, Access::AuthenticatedAdmin),
            Outcome::Render(View::Admin)
        );
    }

    #[test]
    fn links_follow_access() {
        assert_eq!(
            nav_links(Access::Anonymous),
            vec![View::Products, View::Login]
        );
        assert_eq!(
            nav_links(Access::Authenticated),
            vec![View::Products, View::Cart, View::Orders, View::Profile]
        );
        assert_eq!(
            nav_links(Access::AuthenticatedAdmin),
            vec![
                View::Products,
                View::Cart,
                View::Orders,
                View::Admin,
                View::Profile
            ]
        );
    }
}
