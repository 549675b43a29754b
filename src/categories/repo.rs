use async_trait::async_trait;

use super::repo_types::{Category, CategoryPatch, NewCategory};
use crate::{
    db::PgStore,
    repository::{Entity, Store, StoreError},
};

impl Entity for Category {
    type New = NewCategory;
    type Patch = CategoryPatch;

    const NAME: &'static str = "Category";
    const PLURAL: &'static str = "Categories";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> i64 {
        self.id
    }
    fn unique_key(&self) -> &str {
        &self.name
    }
    fn new_key(new: &NewCategory) -> &str {
        &new.name
    }
    fn patch_key(patch: &CategoryPatch) -> Option<&str> {
        patch.name.as_deref()
    }
}

#[async_trait]
impl Store<Category> for PgStore {
    async fn insert(&self, new: NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(new.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, created_at, updated_at FROM categories"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, created_at, updated_at FROM categories WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_key(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, created_at, updated_at FROM categories WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
               SET name = COALESCE($2, name),
                   updated_at = now()
             WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
