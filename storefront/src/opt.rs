use clap::{Args, Parser, Subcommand};

use crate::model::products::NewProduct;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Terminal storefront client")]
pub struct Opt {
    /// Config file path
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: clio::Input,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Logs in, replacing the current session
    Login(Credentials),
    /// Creates an account
    Register(Credentials),
    /// Logs out
    Logout,
    /// Shows the logged in user
    Profile,
    /// Opens the view mounted at the path
    Open { path: String },
    /// Shows the view at the path and follows session changes until interrupted
    Watch {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Lists products
    Products {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Shows product details
    Product { id: i64 },
    /// Shows or modifies the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Places an order for the cart content
    Checkout,
    /// Lists placed orders
    Orders,
    /// Asks the shopping assistant, or lists example questions
    Assistant { message: Option<String> },
    /// Lists products similar to the given one
    Similar { product_id: i64 },
    /// Lists products recommended for the logged in user
    Recommend {
        /// Another user, administrators only
        #[arg(long)]
        user: Option<i64>,
    },
    /// Admin panel
    Admin {
        #[command(subcommand)]
        action: Option<AdminAction>,
    },
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Adds a product to the cart
    Add {
        product_id: i64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Removes a line from the cart
    Remove { item_id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Adds a product to the catalog
    Create(ProductArgs),
    /// Replaces product details
    Update {
        id: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Removes a product from the catalog
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
            category: args.category,
            image_url: args.image_url,
        }
    }
}
