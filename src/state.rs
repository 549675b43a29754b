use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{jwt::JwtKeys, password::Hasher},
    categories::Category,
    config::AppConfig,
    db::{self, PgStore},
    products::Product,
    repository::{Repository, Store},
    users::User,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub hasher: Hasher,
    pub users: Repository<User>,
    pub products: Repository<Product>,
    pub categories: Repository<Category>,
}

impl AppState {
    /// Loads config, connects to Postgres and applies migrations.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let store = Arc::new(PgStore::new(pool));
        Self::from_parts(
            config,
            store.clone() as Arc<dyn Store<User>>,
            store.clone() as Arc<dyn Store<Product>>,
            store as Arc<dyn Store<Category>>,
        )
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn Store<User>>,
        products: Arc<dyn Store<Product>>,
        categories: Arc<dyn Store<Category>>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtKeys::from(&config.jwt);
        let hasher = Hasher::new(&config.password)?;
        Ok(Self {
            config: Arc::new(config),
            jwt,
            hasher,
            users: Repository::new(users),
            products: Repository::new(products),
            categories: Repository::new(categories),
        })
    }
}
