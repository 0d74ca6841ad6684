//! Home page route handler: the product grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use techmart_core::Product;

use crate::error::Result;
use crate::filters;
use crate::routes::cart::load_cart;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: filters::format_money(product.price.amount()),
            image: product.image_ref.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    pub count: u64,
}

/// Display the catalog.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let cart = load_cart(&state, &session).await?;
    let products = state
        .catalog()
        .products()
        .iter()
        .map(ProductCardView::from)
        .collect();

    Ok(HomeTemplate {
        products,
        count: cart.summary().item_count,
    })
}
