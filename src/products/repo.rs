use async_trait::async_trait;

use super::repo_types::{NewProduct, Product, ProductPatch};
use crate::{
    db::PgStore,
    repository::{Entity, Store, StoreError},
};

impl Entity for Product {
    type New = NewProduct;
    type Patch = ProductPatch;

    const NAME: &'static str = "Product";
    const PLURAL: &'static str = "Products";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> i64 {
        self.id
    }
    fn unique_key(&self) -> &str {
        &self.name
    }
    fn new_key(new: &NewProduct) -> &str {
        &new.name
    }
    fn patch_key(patch: &ProductPatch) -> Option<&str> {
        patch.name.as_deref()
    }
}

#[async_trait]
impl Store<Product> for PgStore {
    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, qty, price, discount, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, qty, price, discount, category_id,
                      created_at, updated_at
            "#,
        )
        .bind(new.name)
        .bind(new.description)
        .bind(new.qty)
        .bind(new.price)
        .bind(new.discount)
        .bind(new.category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, qty, price, discount, category_id,
                   created_at, updated_at
            FROM products
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, qty, price, discount, category_id,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_key(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, qty, price, discount, category_id,
                   created_at, updated_at
            FROM products
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
               SET name        = COALESCE($2, name),
                   description = COALESCE($3, description),
                   qty         = COALESCE($4, qty),
                   price       = COALESCE($5, price),
                   discount    = COALESCE($6, discount),
                   category_id = COALESCE($7, category_id),
                   updated_at  = now()
             WHERE id = $1
            RETURNING id, name, description, qty, price, discount, category_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.qty)
        .bind(patch.price)
        .bind(patch.discount)
        .bind(patch.category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
