//! Storefront views and the route table

use crate::Requirement;

/// Navigable storefront view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Products,
    Login,
    Profile,
    Cart,
    Orders,
    Admin,
    /// Shopping assistant and recommendations
    Assistant,
    /// Anything not in the route table
    NotFound,
}

impl View {
    /// Every routable view, in route table order
    pub const ROUTES: [View; 8] = [
        View::Home,
        View::Products,
        View::Login,
        View::Profile,
        View::Cart,
        View::Orders,
        View::Admin,
        View::Assistant,
    ];

    /// Path the view is mounted at
    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Products => "/products",
            View::Login => "/login",
            View::Profile => "/profile",
            View::Cart => "/cart",
            View::Orders => "/orders",
            View::Admin => "/admin",
            View::Assistant => "/assistant",
            View::NotFound => "/404",
        }
    }

    /// Resolves a path into a view
    ///
    /// Query strings, fragments and trailing slashes are ignored. Unknown paths resolve to
    /// `NotFound`.
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        match path {
            "" => View::Home,
            "/products" => View::Products,
            "/login" => View::Login,
            "/profile" => View::Profile,
            "/cart" => View::Cart,
            "/orders" => View::Orders,
            "/admin" => View::Admin,
            "/assistant" => View::Assistant,
            _ => View::NotFound,
        }
    }

    /// Declared access requirement of the view
    pub fn requirement(self) -> Requirement {
        match self {
            View::Home | View::Products | View::Login | View::NotFound => Requirement::Public,
            View::Profile | View::Cart | View::Orders | View::Assistant => {
                Requirement::RequiresAuth
            }
            View::Admin => Requirement::RequiresAdmin,
        }
    }

    /// Human readable title
    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Products => "Products",
            View::Login => "Login",
            View::Profile => "Profile",
            View::Cart => "Cart",
            View::Orders => "Orders",
            View::Admin => "Admin",
            View::Assistant => "Assistant",
            View::NotFound => "Not Found",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}
