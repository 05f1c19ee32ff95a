//! Review repository: creation with the one-per-user rule, per-product
//! aggregates, and the eligibility check.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use marigold_core::{OrderStatus, ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{
    NewReview, ProductReviewStats, RatingDistribution, Review, ReviewEligibility, ReviewUpdate,
};

/// Columns allowed in the review list ORDER BY. Anything else falls back
/// to newest-first.
const SORT_COLUMNS: [&str; 3] = ["created_at", "rating", "helpful_count"];

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    rating: i32,
    title: Option<String>,
    content: Option<String>,
    is_verified_purchase: bool,
    is_approved: bool,
    helpful_count: i32,
    user_display_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            rating: row.rating,
            title: row.title,
            content: row.content,
            is_verified_purchase: row.is_verified_purchase,
            is_approved: row.is_approved,
            helpful_count: row.helpful_count,
            user_display_name: row.user_display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatsRow {
    total_reviews: i64,
    average_rating: Option<f64>,
    one_star: i64,
    two_star: i64,
    three_star: i64,
    four_star: i64,
    five_star: i64,
    verified_purchases: i64,
}

/// The users join projects the reviewer as "First L." so a review never
/// exposes a full name.
const REVIEW_SELECT: &str = r"
SELECT r.id, r.product_id, r.user_id, r.rating, r.title, r.content,
       r.is_verified_purchase, r.is_approved, r.helpful_count,
       u.first_name || ' ' || LEFT(u.last_name, 1) || '.' AS user_display_name,
       r.created_at, r.updated_at
FROM reviews r
LEFT JOIN users u ON u.id = r.user_id
";

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review.
    ///
    /// The verified-purchase flag is computed here from the user's
    /// delivered orders; it is informational and never gates creation.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Validation` if the rating is outside 1..=5 or
    ///   the product does not exist.
    /// - `RepositoryError::Conflict` if the user has already reviewed
    ///   this product.
    pub async fn create(&self, new_review: &NewReview) -> Result<Review, RepositoryError> {
        if !new_review.rating_in_range() {
            return Err(RepositoryError::Validation(format!(
                "rating must be between {} and {}",
                NewReview::MIN_RATING,
                NewReview::MAX_RATING
            )));
        }

        let has_purchased = self
            .has_purchased(new_review.user_id, new_review.product_id)
            .await?;

        let id: ReviewId = sqlx::query_scalar(
            r"
INSERT INTO reviews (product_id, user_id, rating, title, content, is_verified_purchase)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING id
",
        )
        .bind(new_review.product_id)
        .bind(new_review.user_id)
        .bind(new_review.rating)
        .bind(new_review.title.as_deref())
        .bind(new_review.content.as_deref())
        .bind(has_purchased)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("you have already reviewed this product".to_owned())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::Validation("product or user does not exist".to_owned())
            }
            _ => RepositoryError::Database(e),
        })?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Fetch a review by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row: Option<ReviewRow> =
            sqlx::query_as(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Review::from))
    }

    /// List approved reviews for a product.
    ///
    /// `sort_by` accepts `created_at`, `rating`, and `helpful_count`;
    /// anything else sorts newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_product(
        &self,
        product_id: ProductId,
        sort_by: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sort = sort_by
            .filter(|s| SORT_COLUMNS.contains(s))
            .unwrap_or("created_at");

        let mut qb = QueryBuilder::<Postgres>::new(REVIEW_SELECT);
        qb.push(" WHERE r.product_id = ").push_bind(product_id);
        qb.push(" AND r.is_approved = TRUE");
        qb.push(format!(" ORDER BY r.{sort} DESC"));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows: Vec<ReviewRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Aggregate statistics over a product's approved reviews.
    ///
    /// The average is 0 when no approved reviews exist, never NULL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_stats(
        &self,
        product_id: ProductId,
    ) -> Result<ProductReviewStats, RepositoryError> {
        let row: StatsRow = sqlx::query_as(
            r"
SELECT COUNT(*) AS total_reviews,
       AVG(rating)::float8 AS average_rating,
       COUNT(*) FILTER (WHERE rating = 1) AS one_star,
       COUNT(*) FILTER (WHERE rating = 2) AS two_star,
       COUNT(*) FILTER (WHERE rating = 3) AS three_star,
       COUNT(*) FILTER (WHERE rating = 4) AS four_star,
       COUNT(*) FILTER (WHERE rating = 5) AS five_star,
       COUNT(*) FILTER (WHERE is_verified_purchase) AS verified_purchases
FROM reviews
WHERE product_id = $1 AND is_approved = TRUE
",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductReviewStats {
            total_reviews: row.total_reviews,
            average_rating: row.average_rating.unwrap_or(0.0),
            rating_distribution: RatingDistribution {
                one: row.one_star,
                two: row.two_star,
                three: row.three_star,
                four: row.four_star,
                five: row.five_star,
            },
            verified_purchases: row.verified_purchases,
        })
    }

    /// Whether a user may review a product.
    ///
    /// Eligibility depends only on not having reviewed it already; the
    /// purchase check rides along as a UI hint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn can_review(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ReviewEligibility, RepositoryError> {
        let has_reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        let has_purchased = self.has_purchased(user_id, product_id).await?;

        Ok(ReviewEligibility {
            can_review: !has_reviewed,
            has_purchased,
            has_reviewed,
        })
    }

    /// Apply a typed update to a review's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty update, or a
    /// rating outside 1..=5, and `RepositoryError::NotFound` if the
    /// review does not exist.
    pub async fn update(
        &self,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Review, RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Validation(
                "no valid fields to update".to_owned(),
            ));
        }
        if let Some(rating) = update.rating
            && !(NewReview::MIN_RATING..=NewReview::MAX_RATING).contains(&rating)
        {
            return Err(RepositoryError::Validation(format!(
                "rating must be between {} and {}",
                NewReview::MIN_RATING,
                NewReview::MAX_RATING
            )));
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reviews SET updated_at = NOW()");
        if let Some(rating) = update.rating {
            qb.push(", rating = ").push_bind(rating);
        }
        if let Some(title) = &update.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(content) = &update.content {
            qb.push(", content = ").push_bind(content);
        }
        if let Some(is_approved) = update.is_approved {
            qb.push(", is_approved = ").push_bind(is_approved);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Increment a review's helpful counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn increment_helpful(&self, id: ReviewId) -> Result<Review, RepositoryError> {
        let result = sqlx::query(
            "UPDATE reviews SET helpful_count = helpful_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Whether the user has a delivered order containing this product.
    async fn has_purchased(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let purchased: bool = sqlx::query_scalar(
            r"
SELECT EXISTS (
    SELECT 1
    FROM orders o
    JOIN order_items oi ON oi.order_id = o.id
    WHERE o.user_id = $1 AND oi.product_id = $2 AND o.status = $3
)
",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(OrderStatus::Delivered.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(purchased)
    }
}
