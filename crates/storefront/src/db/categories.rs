//! Category repository: flat lookups with live product counts, and the
//! recursive ancestor/descendant traversals.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use marigold_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryNode, CategoryUpdate, NewCategory};

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    parent_id: Option<CategoryId>,
    parent_name: Option<String>,
    is_active: bool,
    sort_order: i32,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            parent_id: row.parent_id,
            parent_name: row.parent_name,
            is_active: row.is_active,
            sort_order: row.sort_order,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryDepthRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    depth: i32,
}

/// The product count is over active products directly in the category,
/// not rolled up from descendants.
const CATEGORY_SELECT: &str = r"
SELECT c.id, c.name, c.description, c.image_url, c.parent_id,
       p.name AS parent_name, c.is_active, c.sort_order,
       (SELECT COUNT(*) FROM products pr
        WHERE pr.category_id = c.id AND pr.is_active = TRUE) AS product_count,
       c.created_at, c.updated_at
FROM categories c
LEFT JOIN categories p ON p.id = c.parent_id
";

/// Repository for categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all active categories, ordered by sort order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "{CATEGORY_SELECT} WHERE c.is_active = TRUE ORDER BY c.sort_order, c.name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// List active root categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_roots(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "{CATEGORY_SELECT} WHERE c.parent_id IS NULL AND c.is_active = TRUE \
             ORDER BY c.sort_order, c.name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Fetch a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> =
            sqlx::query_as(&format!("{CATEGORY_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Category::from))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Conflict` if a category with the name exists.
    /// - `RepositoryError::Validation` if the parent does not exist.
    pub async fn create(&self, new_category: &NewCategory) -> Result<Category, RepositoryError> {
        let id: CategoryId = sqlx::query_scalar(
            r"
INSERT INTO categories (name, description, image_url, parent_id, sort_order)
VALUES ($1, $2, $3, $4, $5)
RETURNING id
",
        )
        .bind(&new_category.name)
        .bind(new_category.description.as_deref())
        .bind(new_category.image_url.as_deref())
        .bind(new_category.parent_id)
        .bind(new_category.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!(
                    "category '{}' already exists",
                    new_category.name
                ))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::Validation("parent category does not exist".to_owned())
            }
            _ => RepositoryError::Database(e),
        })?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a typed update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty update or a
    /// category set as its own parent, and `RepositoryError::NotFound`
    /// if the category does not exist.
    pub async fn update(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Validation(
                "no valid fields to update".to_owned(),
            ));
        }
        if update.parent_id == Some(id) {
            return Err(RepositoryError::Validation(
                "a category cannot be its own parent".to_owned(),
            ));
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE categories SET updated_at = NOW()");
        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &update.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(image_url) = &update.image_url {
            qb.push(", image_url = ").push_bind(image_url);
        }
        if let Some(parent_id) = update.parent_id {
            qb.push(", parent_id = ").push_bind(parent_id);
        }
        if let Some(is_active) = update.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        if let Some(sort_order) = update.sort_order {
            qb.push(", sort_order = ").push_bind(sort_order);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a category with that name already exists".to_owned())
            }
            _ => RepositoryError::Database(e),
        })?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Refused while products or child categories
    /// still reference it.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Conflict` if products or children remain.
    /// - `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        if product_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category still has {product_count} products"
            )));
        }

        let child_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        if child_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category still has {child_count} subcategories"
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// The strict ancestors of a category, root first. The category
    /// itself is not included, so a root returns an empty vec.
    ///
    /// Also returns an empty vec for an unknown id; callers that need
    /// a 404 check existence separately.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ancestors(&self, id: CategoryId) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"
WITH RECURSIVE chain AS (
    SELECT c.*, 0 AS depth
    FROM categories c
    WHERE c.id = $1
    UNION ALL
    SELECT c.*, chain.depth + 1
    FROM categories c
    JOIN chain ON c.id = chain.parent_id
)
SELECT c.id, c.name, c.description, c.image_url, c.parent_id,
       p.name AS parent_name, c.is_active, c.sort_order,
       (SELECT COUNT(*) FROM products pr
        WHERE pr.category_id = c.id AND pr.is_active = TRUE) AS product_count,
       c.created_at, c.updated_at
FROM chain c
LEFT JOIN categories p ON p.id = c.parent_id
WHERE c.depth > 0
ORDER BY c.depth DESC
",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// The subtree below a category, breadth-ordered: children first,
    /// then grandchildren, siblings in sort order. The category itself
    /// is not included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn descendants(
        &self,
        id: CategoryId,
    ) -> Result<Vec<CategoryNode>, RepositoryError> {
        let rows: Vec<CategoryDepthRow> = sqlx::query_as(
            r"
WITH RECURSIVE subtree AS (
    SELECT c.*, 1 AS depth
    FROM categories c
    WHERE c.parent_id = $1
    UNION ALL
    SELECT c.*, subtree.depth + 1
    FROM categories c
    JOIN subtree ON c.parent_id = subtree.id
)
SELECT c.id, c.name, c.description, c.image_url, c.parent_id,
       p.name AS parent_name, c.is_active, c.sort_order,
       (SELECT COUNT(*) FROM products pr
        WHERE pr.category_id = c.id AND pr.is_active = TRUE) AS product_count,
       c.created_at, c.updated_at, c.depth
FROM subtree c
LEFT JOIN categories p ON p.id = c.parent_id
ORDER BY c.depth, c.sort_order, c.name
",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryNode {
                category: Category::from(row.category),
                depth: row.depth,
            })
            .collect())
    }
}
