use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub qty: i32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub qty: Option<i32>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
}
