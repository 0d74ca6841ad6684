//! The read-only product catalog.
//!
//! A [`Catalog`] is supplied once at startup and never mutated afterwards.
//! Product order is preserved so the storefront can render the grid in the
//! order the data source listed it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Errors that can occur when building a [`Catalog`].
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Two products share the same id.
    #[error("duplicate product id {0} in catalog")]
    DuplicateId(ProductId),
    /// The catalog document could not be parsed.
    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Image URL or asset path, passed through to the renderer untouched.
    #[serde(alias = "image")]
    pub image_ref: String,
}

/// A fixed, ordered set of products with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products, index })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// Prices are decimal strings (`"99.99"`) or numbers.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] for malformed documents, negative
    /// prices, or duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index
            .get(&id)
            .and_then(|&position| self.products.get(position))
    }

    /// Whether a product with this id exists.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.index.contains_key(&id)
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The built-in demo catalog of six gadgets.
    #[must_use]
    pub fn demo() -> Self {
        let products = vec![
            demo_product(
                1,
                "Wireless Headphones",
                "High-quality wireless headphones with noise cancellation.",
                9999,
                "Headphones",
            ),
            demo_product(
                2,
                "Smart Watch",
                "Feature-rich smartwatch with fitness tracking.",
                19999,
                "Smartwatch",
            ),
            demo_product(
                3,
                "Bluetooth Speaker",
                "Portable speaker with 20-hour battery life.",
                7999,
                "Speaker",
            ),
            demo_product(
                4,
                "Laptop Backpack",
                "Durable backpack with USB charging port.",
                4999,
                "Backpack",
            ),
            demo_product(
                5,
                "Wireless Mouse",
                "Ergonomic wireless mouse with silent clicks.",
                2999,
                "Mouse",
            ),
            demo_product(
                6,
                "External Hard Drive",
                "1TB portable hard drive with USB 3.0.",
                5999,
                "Hard+Drive",
            ),
        ];

        let index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.id, position))
            .collect();
        Self { products, index }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

impl TryFrom<Vec<Product>> for Catalog {
    type Error = CatalogError;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        Self::new(products)
    }
}

impl From<Catalog> for Vec<Product> {
    fn from(catalog: Catalog) -> Self {
        catalog.products
    }
}

fn demo_product(id: i32, name: &str, description: &str, cents: u32, label: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        price: Price::from_cents(cents),
        image_ref: format!("https://via.placeholder.com/300x300?text={label}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, cents: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            image_ref: String::new(),
        }
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let result = Catalog::new(vec![product(1, 100), product(2, 200), product(1, 300)]);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateId(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_get_and_contains() {
        let catalog = Catalog::new(vec![product(10, 100), product(20, 200)]).unwrap();
        assert_eq!(catalog.get(ProductId::new(20)).unwrap().price, Price::from_cents(200));
        assert!(catalog.contains(ProductId::new(10)));
        assert!(!catalog.contains(ProductId::new(30)));
        assert!(catalog.get(ProductId::new(30)).is_none());
    }

    #[test]
    fn test_order_is_preserved() {
        let catalog = Catalog::new(vec![product(3, 1), product(1, 1), product(2, 1)]).unwrap();
        let ids: Vec<i32> = catalog.products().iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_demo_catalog() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.len(), 6);
        let headphones = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(headphones.name, "Wireless Headphones");
        assert_eq!(headphones.price.to_string(), "99.99");
        assert_eq!(
            catalog.get(ProductId::new(6)).unwrap().price,
            Price::from_cents(5999)
        );
    }

    #[test]
    fn test_demo_catalog_ids_are_indexed() {
        let catalog = Catalog::demo();
        for product in catalog.products() {
            assert_eq!(catalog.get(product.id), Some(product));
        }
    }

    #[test]
    fn test_from_json_accepts_image_alias() {
        let json = r#"[
            {"id": 1, "name": "Cable", "description": "USB-C", "price": "9.50", "image": "/img/cable.png"}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let cable = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(cable.image_ref, "/img/cable.png");
        assert_eq!(cable.price, Price::from_cents(950));
    }

    #[test]
    fn test_from_json_rejects_negative_price() {
        let json = r#"[{"id": 1, "name": "x", "description": "", "price": "-1.00", "image_ref": ""}]"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_from_json_rejects_oversized_price() {
        let json = r#"[{"id": 1, "name": "x", "description": "", "price": "79228162514264337593543950335", "image_ref": ""}]"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let json = r#"[
            {"id": 1, "name": "a", "description": "", "price": "1.00", "image_ref": ""},
            {"id": 1, "name": "b", "description": "", "price": "2.00", "image_ref": ""}
        ]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_keeps_order() {
        let catalog = Catalog::demo();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
