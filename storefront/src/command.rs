//! Terminal storefront
//!
//! Every command is a navigation: the route guard decides first, and the view fetches its data
//! only once it is rendered.

pub mod assistant;
pub mod orders;
pub mod products;
pub mod session;

use std::future::Future;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use guard::{Outcome, View};
use tracing::debug;

use crate::model::products::{Page, ProductId};
use crate::model::users::UserId;
use crate::opt::{AdminAction, CartAction, Command};
use crate::service::Gate;
use crate::service::navigator::Navigator;
use crate::service::session::Restored;
use crate::service::shop;

/// Executes the command on behalf of the session restored on start
pub async fn run(command: Command, gate: &Gate, restored: Restored) -> Result<()> {
    report(&restored);

    let mut navigator = Navigator::new(gate.store());
    let shop = gate.shop();

    let result = match command {
        Command::Login(credentials) => {
            session::login(gate, &credentials).await?;
            show(gate, navigator.after_login()).await
        }
        Command::Register(credentials) => return session::register(gate, &credentials).await,
        Command::Logout => {
            gate.logout().await;
            println!("Logged out");
            show(gate, navigator.after_logout()).await
        }
        Command::Open { path } => show(gate, navigator.open(&path)).await,
        Command::Watch { path } => return watch(gate, navigator, &path).await,
        Command::Profile => show(gate, navigator.navigate(View::Profile)).await,
        Command::Products { skip, limit } => {
            let page = Page { skip, limit };
            guarded(gate, &mut navigator, View::Products, products::list(shop, page)).await
        }
        Command::Product { id } => {
            let id = ProductId::new(id);
            guarded(gate, &mut navigator, View::Products, products::detail(shop, id)).await
        }
        Command::Cart { action: None } => {
            guarded(gate, &mut navigator, View::Cart, orders::cart(shop)).await
        }
        Command::Cart {
            action: Some(CartAction::Add {
                product_id,
                quantity,
            }),
        } => {
            let add = orders::add(shop, ProductId::new(product_id), quantity);
            guarded(gate, &mut navigator, View::Cart, add).await
        }
        Command::Cart {
            action: Some(CartAction::Remove { item_id }),
        } => guarded(gate, &mut navigator, View::Cart, orders::remove(shop, item_id)).await,
        Command::Checkout => {
            match guarded(gate, &mut navigator, View::Cart, orders::checkout(shop)).await {
                // Placed orders are shown right away
                Ok(()) if navigator.location() == View::Cart => {
                    show(gate, navigator.after_checkout()).await
                }
                result => result,
            }
        }
        Command::Orders => guarded(gate, &mut navigator, View::Orders, orders::list(shop)).await,
        Command::Assistant { message: None } => {
            let suggestions = assistant::suggestions(shop);
            guarded(gate, &mut navigator, View::Assistant, suggestions).await
        }
        Command::Assistant {
            message: Some(message),
        } => {
            let ask = assistant::ask(shop, &message);
            guarded(gate, &mut navigator, View::Assistant, ask).await
        }
        Command::Similar { product_id } => {
            let similar = assistant::similar(shop, ProductId::new(product_id));
            guarded(gate, &mut navigator, View::Products, similar).await
        }
        Command::Recommend { user } => {
            let recommend = assistant::recommend(shop, user.map(UserId::new));
            guarded(gate, &mut navigator, View::Assistant, recommend).await
        }
        Command::Admin { action: None } => {
            guarded(gate, &mut navigator, View::Admin, products::panel(shop)).await
        }
        Command::Admin {
            action: Some(AdminAction::Create(product)),
        } => {
            let create = products::create(shop, product.into());
            guarded(gate, &mut navigator, View::Admin, create).await
        }
        Command::Admin {
            action: Some(AdminAction::Update { id, product }),
        } => {
            let update = products::update(shop, ProductId::new(id), product.into());
            guarded(gate, &mut navigator, View::Admin, update).await
        }
        Command::Admin {
            action: Some(AdminAction::Delete { id }),
        } => {
            let delete = products::delete(shop, ProductId::new(id));
            guarded(gate, &mut navigator, View::Admin, delete).await
        }
    };

    settle(&mut navigator, result)
}

/// Formats an amount of money
pub(crate) fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn report(restored: &Restored) {
    match restored {
        Restored::Expired => eprintln!("Session expired, please log in again"),
        Restored::Offline => eprintln!("Backend unreachable, continuing without a session"),
        restored => debug!(?restored, "Session loaded"),
    }
}

/// Runs `render` only if the guard lets the user into `view`
async fn guarded(
    gate: &Gate,
    navigator: &mut Navigator,
    view: View,
    render: impl Future<Output = Result<(), shop::Error>>,
) -> Result<(), shop::Error> {
    let outcome = navigator.navigate(view);
    if !outcome.renders(view) {
        present(outcome);
        return Ok(());
    }

    heading(gate, view);
    render.await
}

/// Presents the navigation outcome with the default content of the view
async fn show(gate: &Gate, outcome: Outcome) -> Result<(), shop::Error> {
    let Outcome::Render(view) = outcome else {
        present(outcome);
        return Ok(());
    };

    heading(gate, view);
    match view {
        View::Home => {
            println!("Welcome to the storefront!");
            Ok(())
        }
        View::Products => products::list(gate.shop(), Page::new()).await,
        View::Login => {
            session::login_hint();
            Ok(())
        }
        View::Profile => {
            session::profile(gate.store());
            Ok(())
        }
        View::Cart => orders::cart(gate.shop()).await,
        View::Orders => orders::list(gate.shop()).await,
        View::Assistant => assistant::suggestions(gate.shop()).await,
        View::Admin => products::panel(gate.shop()).await,
        View::NotFound => {
            println!("Page not found");
            Ok(())
        }
    }
}

/// Title of the rendered view with the navigation bar
fn heading(gate: &Gate, view: View) {
    let access = gate.store().current().access();
    let links: Vec<_> = guard::nav_links(access)
        .into_iter()
        .map(View::title)
        .collect();

    println!("[{}]", links.join(" | "));
    println!("== {} ==", view.title());
}

/// Presents the outcomes that don't render the requested view
fn present(outcome: Outcome) {
    match outcome {
        Outcome::Render(_) => (),
        Outcome::Redirect { to, from } => {
            println!("{} requires logging in, redirected to {to}", from.title());
            session::login_hint();
        }
        Outcome::Unauthorized(_) => {
            println!("Unauthorized Access");
            println!("You don't have permission to access this page.");
        }
    }
}

/// Reports the failure of the rendered view
///
/// A rejected session sends the user away from the view.
fn settle(navigator: &mut Navigator, result: Result<(), shop::Error>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(shop::Error::SessionExpired) => {
            let location = navigator.location();
            let outcome = navigator.navigate(location);
            debug!(?outcome, "Session lost");
            present(outcome);
            Err(shop::Error::SessionExpired.into())
        }
        Err(err) => Err(err).wrap_err_with(|| format!("Cannot show {}", navigator.location())),
    }
}

/// Shows the view at `path`, following session changes until interrupted
async fn watch(gate: &Gate, mut navigator: Navigator, path: &str) -> Result<()> {
    let mut outcome = navigator.open(path);

    loop {
        if let Err(err) = show(gate, outcome).await {
            // Rejected session shows up as the next change
            eprintln!("{err}");
        }

        tokio::select! {
            changed = navigator.changed() => match changed {
                Some(next) => outcome = next,
                None => return Ok(()),
            },
            interrupted = tokio::signal::ctrl_c() => {
                interrupted.wrap_err("Cannot listen for interruption")?;
                return Ok(());
            }
        }
    }
}
