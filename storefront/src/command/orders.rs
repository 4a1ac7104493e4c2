//! Cart and order history views

use crate::command::money;
use crate::model::orders::{Cart, Line, NewCartItem};
use crate::model::products::ProductId;
use crate::service::shop::{Error, Shop};

fn line(line: &Line) {
    println!(
        "{:<6} {:<32} x{:<4} {:>10}",
        format!("#{}", line.id),
        line.product.name,
        line.quantity,
        money(line.subtotal())
    );
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    cart.items.iter().for_each(line);
    println!("Total: {}", money(cart.total));
}

pub async fn cart(shop: &Shop) -> Result<(), Error> {
    print_cart(&shop.cart().await?);
    Ok(())
}

pub async fn add(shop: &Shop, product_id: ProductId, quantity: u32) -> Result<(), Error> {
    let cart = shop
        .add_to_cart(NewCartItem {
            product_id,
            quantity,
        })
        .await?;

    println!("Added to cart");
    print_cart(&cart);
    Ok(())
}

pub async fn remove(shop: &Shop, item_id: i64) -> Result<(), Error> {
    let cart = shop.remove_from_cart(item_id).await?;

    println!("Removed from cart");
    print_cart(&cart);
    Ok(())
}

pub async fn checkout(shop: &Shop) -> Result<(), Error> {
    let order = shop.checkout().await?;

    println!("Order #{} placed, total {}", order.id, money(order.total()));
    Ok(())
}

/// Order history
pub async fn list(shop: &Shop) -> Result<(), Error> {
    let orders = shop.orders().await?;
    if orders.is_empty() {
        println!("No orders yet");
    }

    for order in &orders {
        println!(
            "Order #{} from {} [{}]",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.status.as_deref().unwrap_or("unknown")
        );
        order.items.iter().for_each(line);
        println!("Total: {}", money(order.total()));
    }
    Ok(())
}
