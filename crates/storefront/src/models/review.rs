//! Review model, creation input, and per-product aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{ProductId, ReviewId, UserId};

/// A product review. At most one exists per (product, user) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: i32,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    pub helpful_count: i32,
    pub user_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: i32,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NewReview {
    /// Ratings are integers from 1 to 5 inclusive.
    pub const MIN_RATING: i32 = 1;
    /// Ratings are integers from 1 to 5 inclusive.
    pub const MAX_RATING: i32 = 5;

    /// Whether the rating is inside the allowed range.
    #[must_use]
    pub const fn rating_in_range(&self) -> bool {
        self.rating >= Self::MIN_RATING && self.rating <= Self::MAX_RATING
    }
}

/// The mutable review fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_approved: Option<bool>,
}

impl ReviewUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.is_approved.is_none()
    }
}

/// Exact review counts per star rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    #[serde(rename = "1")]
    pub one: i64,
    #[serde(rename = "2")]
    pub two: i64,
    #[serde(rename = "3")]
    pub three: i64,
    #[serde(rename = "4")]
    pub four: i64,
    #[serde(rename = "5")]
    pub five: i64,
}

impl RatingDistribution {
    /// Count for a star rating; zero for anything outside 1..=5.
    #[must_use]
    pub const fn count(&self, rating: i32) -> i64 {
        match rating {
            1 => self.one,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            5 => self.five,
            _ => 0,
        }
    }
}

/// Aggregate review statistics for one product, over approved reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviewStats {
    pub total_reviews: i64,
    /// Arithmetic mean of approved ratings; 0 when there are none.
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
    pub verified_purchases: i64,
}

/// Whether a user may submit a review for a product.
///
/// `can_review` depends only on `has_reviewed`; `has_purchased` is
/// informational (shown as a "verified" hint in the UI, not enforced).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
    pub can_review: bool,
    pub has_purchased: bool,
    pub has_reviewed: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(rating: i32) -> NewReview {
        NewReview {
            product_id: ProductId::new(1),
            user_id: UserId::new(1),
            rating,
            title: None,
            content: None,
        }
    }

    #[test]
    fn test_rating_range() {
        assert!(!review(0).rating_in_range());
        assert!(review(1).rating_in_range());
        assert!(review(5).rating_in_range());
        assert!(!review(6).rating_in_range());
    }

    #[test]
    fn test_distribution_count() {
        let dist = RatingDistribution {
            one: 1,
            two: 0,
            three: 2,
            four: 5,
            five: 10,
        };
        assert_eq!(dist.count(5), 10);
        assert_eq!(dist.count(2), 0);
        assert_eq!(dist.count(0), 0);
        assert_eq!(dist.count(6), 0);
    }

    #[test]
    fn test_distribution_serializes_with_numeric_keys() {
        let dist = RatingDistribution {
            five: 3,
            ..RatingDistribution::default()
        };
        let json = serde_json::to_value(dist).unwrap();
        assert_eq!(json["5"], 3);
        assert_eq!(json["1"], 0);
    }
}
