//! Catalog and admin panel views

use tracing::info;

use crate::command::money;
use crate::model::products::{NewProduct, Page, Product, ProductId};
use crate::service::shop::{Error, Shop};

/// Products shown on the admin panel
const PANEL_PAGE: Page = Page {
    skip: 0,
    limit: 100,
};

fn row(product: &Product) {
    println!(
        "{:<6} {:<32} {:>10}  {} in stock",
        format!("#{}", product.id),
        product.name,
        money(product.price),
        product.stock
    );
}

pub async fn list(shop: &Shop, page: Page) -> Result<(), Error> {
    let products = shop.products(page).await?;
    if products.is_empty() {
        println!("No products found");
    }

    products.iter().for_each(row);
    Ok(())
}

pub async fn detail(shop: &Shop, id: ProductId) -> Result<(), Error> {
    let product = shop.product(id).await?;

    println!("{} (#{})", product.name, product.id);
    if let Some(description) = &product.description {
        println!("{description}");
    }
    if let Some(category) = &product.category {
        println!("Category: {category}");
    }
    println!("Price: {}", money(product.price));
    println!("In stock: {}", product.stock);
    Ok(())
}

/// Catalog management overview
pub async fn panel(shop: &Shop) -> Result<(), Error> {
    println!("Manage products");
    list(shop, PANEL_PAGE).await
}

pub async fn create(shop: &Shop, product: NewProduct) -> Result<(), Error> {
    let product = shop.create_product(&product).await?;
    info!(id = %product.id, "Product created");

    println!("Created product:");
    row(&product);
    Ok(())
}

pub async fn update(shop: &Shop, id: ProductId, product: NewProduct) -> Result<(), Error> {
    let product = shop.update_product(id, &product).await?;

    println!("Updated product:");
    row(&product);
    Ok(())
}

pub async fn delete(shop: &Shop, id: ProductId) -> Result<(), Error> {
    shop.delete_product(id).await?;
    info!(%id, "Product deleted");

    println!("Deleted product #{id}");
    Ok(())
}
