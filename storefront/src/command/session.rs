//! Account views

use color_eyre::Result;
use color_eyre::eyre::WrapErr;

use crate::opt::Credentials;
use crate::service::Gate;
use crate::service::session::SessionStore;

pub async fn login(gate: &Gate, credentials: &Credentials) -> Result<()> {
    let user = gate
        .login(&credentials.email, &credentials.password)
        .await
        .wrap_err("Login failed")?;

    println!("Logged in as {} ({})", user.email, user.role());
    Ok(())
}

pub async fn register(gate: &Gate, credentials: &Credentials) -> Result<()> {
    let user = gate
        .register(&credentials.email, &credentials.password)
        .await
        .wrap_err("Registration failed")?;

    println!("Account created for {}", user.email);
    login_hint();
    Ok(())
}

/// Profile of the logged in user
pub fn profile(store: &SessionStore) {
    let session = store.current();
    let Some(user) = session.user() else {
        return;
    };

    println!("Email: {}", user.email);
    println!("Role: {}", user.role());
    if let Some(created_at) = user.created_at {
        println!("Member since: {}", created_at.format("%Y-%m-%d"));
    }
}

pub fn login_hint() {
    println!("Log in with: storefront login --email <email>");
}
