//! Store products and the moments each one credits.

use serde::Serialize;

use haven_shared::errors::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Consumable,
    /// Credited once per renewal receipt.
    Subscription,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ProductKind,
    pub credits: i32,
}

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "haven.moments.10",
        name: "10 Moments",
        kind: ProductKind::Consumable,
        credits: 10,
    },
    Product {
        id: "haven.moments.50",
        name: "50 Moments",
        kind: ProductKind::Consumable,
        credits: 50,
    },
    Product {
        id: "haven.moments.150",
        name: "150 Moments",
        kind: ProductKind::Consumable,
        credits: 150,
    },
    Product {
        id: "haven.plus.monthly",
        name: "Haven Plus (monthly)",
        kind: ProductKind::Subscription,
        credits: 300,
    },
    Product {
        id: "haven.plus.yearly",
        name: "Haven Plus (yearly)",
        kind: ProductKind::Subscription,
        credits: 4000,
    },
];

pub fn find(product_id: &str) -> AppResult<&'static Product> {
    PRODUCTS
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| {
            AppError::new(ErrorCode::UnknownProduct, format!("unknown product {product_id}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_are_unique_and_credit_something() {
        for (i, product) in PRODUCTS.iter().enumerate() {
            assert!(product.credits > 0, "{}", product.id);
            assert!(PRODUCTS[i + 1..].iter().all(|other| other.id != product.id));
        }
    }

    #[test]
    fn unknown_product_is_rejected() {
        assert_eq!(find("haven.moments.50").unwrap().credits, 50);
        assert!(find("haven.moments.9999").unwrap_err().is(ErrorCode::UnknownProduct));
    }
}
