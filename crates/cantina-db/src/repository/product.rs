//! # Product Repository
//!
//! The menu catalog (`pos_products`) and its categories (`pos_categories`).
//! The catalog is edited elsewhere and handed over whole, so writes replace
//! the document.

use cantina_core::{search_products, Category, Product};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::storage::{get_json_or_default, set_json, StorageKey};

/// Repository for the catalog.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        get_json_or_default(&mut conn, StorageKey::Products).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.list().await?.into_iter().find(|p| p.id == id))
    }

    /// Case-insensitive match on name, sku and description.
    ///
    /// An empty or blank term returns the whole catalog.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        debug!(term = %term, "Searching products");
        let products = self.list().await?;
        let found: Vec<Product> = search_products(&products, term)
            .into_iter()
            .cloned()
            .collect();
        debug!(count = found.len(), "Search returned products");
        Ok(found)
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.list().await?.len())
    }

    /// Replaces the catalog.
    pub async fn replace_all(&self, products: &[Product]) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, StorageKey::Products, products).await?;
        info!(count = products.len(), "Catalog replaced");
        Ok(())
    }

    pub async fn categories(&self) -> DbResult<Vec<Category>> {
        let mut conn = self.pool.acquire().await?;
        get_json_or_default(&mut conn, StorageKey::Categories).await
    }

    pub async fn replace_categories(&self, categories: &[Category]) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, StorageKey::Categories, categories).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cantina_core::Money;

    fn product(id: &str, name: &str, sku: &str, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            sku: sku.to_string(),
            category_id: None,
            price_pesos: Money::from_major(45),
            price_dollars: Money::from_cents(250),
            variants: vec![],
            modifiers: vec![],
        }
    }

    #[tokio::test]
    async fn test_search_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.replace_all(&[
            product("1", "Tacos al Pastor", "TAC-001", "Con piña"),
            product("2", "Agua de Horchata", "BEB-010", "Vaso grande"),
            product("3", "Quesadilla", "ANT-003", "Tortilla de maíz con queso"),
        ])
        .await
        .unwrap();

        let ids = |found: Vec<Product>| found.into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(repo.search("PASTOR").await.unwrap()), vec!["1"]);
        assert_eq!(ids(repo.search("beb-").await.unwrap()), vec!["2"]);
        assert_eq!(ids(repo.search("queso").await.unwrap()), vec!["3"]);
        assert_eq!(repo.search("  ").await.unwrap().len(), 3);
        assert!(repo.search("pizza").await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.products().list().await.unwrap().is_empty());
        assert!(db.products().categories().await.unwrap().is_empty());
        assert!(db.products().get("1").await.unwrap().is_none());
    }
}
