//! Shopping assistant and recommendation views

use crate::model::products::ProductId;
use crate::model::users::UserId;
use crate::service::shop::{Error, Shop};

/// Example questions to try
pub async fn suggestions(shop: &Shop) -> Result<(), Error> {
    let suggestions = shop.suggestions().await?;

    println!("Try asking:");
    for suggestion in suggestions {
        println!("  {suggestion}");
    }
    Ok(())
}

pub async fn ask(shop: &Shop, message: &str) -> Result<(), Error> {
    let answer = shop.ask(message).await?;

    println!("{}", answer.response);
    if let Some(query) = &answer.sql_query {
        println!("Query: {query}");
    }
    for product in answer.products.iter().flatten() {
        println!("  {product}");
    }
    Ok(())
}

fn ids(products: &[ProductId]) {
    if products.is_empty() {
        println!("Nothing to recommend yet");
        return;
    }

    let ids: Vec<_> = products.iter().map(|id| format!("#{id}")).collect();
    println!("{}", ids.join(" "));
}

pub async fn similar(shop: &Shop, id: ProductId) -> Result<(), Error> {
    let similar = shop.similar(id).await?;

    println!("Similar to #{id}:");
    ids(&similar);
    Ok(())
}

pub async fn recommend(shop: &Shop, user: Option<UserId>) -> Result<(), Error> {
    let recommended = shop.recommendations(user).await?;

    match user {
        Some(user) => println!("Recommended for user #{user}:"),
        None => println!("Recommended for you:"),
    }
    ids(&recommended);
    Ok(())
}
