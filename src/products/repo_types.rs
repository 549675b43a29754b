use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub qty: i32,
    pub price: Decimal,
    pub discount: Decimal,
    #[serde(rename = "category_id")]
    pub category_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub qty: i32,
    pub price: Decimal,
    pub discount: Decimal,
    pub category_id: Option<i64>,
}

/// `None` keeps the stored value. A product's category can be changed but
/// not cleared through a patch.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub qty: Option<i32>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub category_id: Option<i64>,
}
