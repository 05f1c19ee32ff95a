//! Order repository: the all-or-nothing creation transaction, cancellation
//! with stock restore, and status transitions.
//!
//! Every write path of an order runs on one pooled connection inside an
//! explicit transaction; a failure at any step rolls back everything, so a
//! partial order is never visible.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use marigold_core::{
    OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId, VariantId,
};

use super::RepositoryError;
use crate::models::{
    NewOrder, NewOrderAddress, Order, OrderAddress, OrderFilters, OrderItem, OrderUpdate,
};

/// Attempts at generating a fresh order number when an insert hits the
/// UNIQUE constraint. The number format is timestamp-derived, so a retry
/// virtually always succeeds.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: Option<UserId>,
    status: String,
    payment_status: String,
    subtotal: Decimal,
    tax_amount: Decimal,
    shipping_amount: Decimal,
    discount_amount: Decimal,
    total_amount: Decimal,
    payment_method: Option<String>,
    notes: Option<String>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(
        self,
        items: Vec<OrderItem>,
        shipping_address: Option<OrderAddress>,
        billing_address: Option<OrderAddress>,
    ) -> Result<Order, RepositoryError> {
        let status = OrderStatus::parse(&self.status)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let payment_status = PaymentStatus::parse(&self.payment_status)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            status,
            payment_status,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            shipping_amount: self.shipping_amount,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            notes: self.notes,
            items,
            shipping_address,
            billing_address,
            shipped_at: self.shipped_at,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    product_name: String,
    product_sku: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            product_name: row.product_name,
            product_sku: row.product_sku,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

#[derive(Debug, FromRow)]
struct AddressRow {
    address_type: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    street_address_1: String,
    street_address_2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl From<AddressRow> for OrderAddress {
    fn from(row: AddressRow) -> Self {
        Self {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            street_address_1: row.street_address_1,
            street_address_2: row.street_address_2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
        }
    }
}

const ORDER_COLUMNS: &str = r"
id, order_number, user_id, status, payment_status,
subtotal, tax_amount, shipping_amount, discount_amount, total_amount,
payment_method, notes, shipped_at, delivered_at, created_at, updated_at
";

/// Generate an order number: prefix, last 8 digits of the unix-millisecond
/// timestamp, 3 random digits. Not collision-free on its own; the column's
/// UNIQUE constraint plus retry covers the remainder.
#[must_use]
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let timestamp = millis.rem_euclid(100_000_000);
    let random: u32 = rand::rng().random_range(0..1000);
    format!("MG{timestamp:08}{random:03}")
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order atomically.
    ///
    /// Inside one transaction: insert the order row (total derived as
    /// `subtotal + tax + shipping − discount`), insert a frozen snapshot
    /// row per item, decrement each product's stock floored at zero, and
    /// insert the shipping/billing address snapshots when provided. Any
    /// failure rolls back every prior step.
    ///
    /// An order-number collision retries the whole transaction with a
    /// fresh number, up to [`ORDER_NUMBER_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Validation` if `items` is empty or an item
    ///   references an unknown product.
    /// - `RepositoryError::Database` for other failures.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        if new_order.items.is_empty() {
            return Err(RepositoryError::Validation(
                "order must contain at least one item".to_owned(),
            ));
        }

        let mut last_err: Option<RepositoryError> = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number();
            match self.create_attempt(new_order, &order_number).await {
                Ok(order) => return Ok(order),
                Err(RepositoryError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(order_number, "order number collision, retrying");
                    last_err = Some(RepositoryError::Database(e));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(RepositoryError::Conflict(
            "could not allocate a unique order number".to_owned(),
        )))
    }

    async fn create_attempt(
        &self,
        new_order: &NewOrder,
        order_number: &str,
    ) -> Result<Order, RepositoryError> {
        let total_amount = new_order.total_amount();
        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = sqlx::query_scalar(
            r"
INSERT INTO orders (
    order_number, user_id, subtotal, tax_amount, shipping_amount,
    discount_amount, total_amount, payment_method, notes
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING id
",
        )
        .bind(order_number)
        .bind(new_order.user_id)
        .bind(new_order.subtotal)
        .bind(new_order.tax_amount)
        .bind(new_order.shipping_amount)
        .bind(new_order.discount_amount)
        .bind(total_amount)
        .bind(new_order.payment_method.as_deref())
        .bind(new_order.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in &new_order.items {
            sqlx::query(
                r"
INSERT INTO order_items (
    order_id, product_id, variant_id, product_name, product_sku,
    quantity, unit_price, line_total
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(&item.product_name)
            .bind(item.product_sku.as_deref())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    RepositoryError::Validation(format!(
                        "order item references unknown product {}",
                        item.product_id
                    ))
                } else {
                    RepositoryError::Database(e)
                }
            })?;

            // Over-sell clamps at zero rather than rejecting; two
            // concurrent orders for the same product serialize on the
            // row lock this UPDATE takes.
            sqlx::query(
                "UPDATE products SET stock_quantity = GREATEST(0, stock_quantity - $1) WHERE id = $2",
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(shipping) = &new_order.shipping_address {
            insert_address(&mut tx, order_id, "shipping", shipping).await?;
        }
        if let Some(billing) = &new_order.billing_address {
            insert_address(&mut tx, order_id, "billing", billing).await?;
        }

        tx.commit().await?;

        self.find_by_id(order_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Fetch an order with its items and address snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        self.load_order(row).await.map(Some)
    }

    /// Fetch an order by its public order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        self.load_order(row).await.map(Some)
    }

    /// List orders matching the filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_all(&self, filters: &OrderFilters) -> Result<Vec<Order>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"
        ));
        if let Some(user_id) = filters.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(payment_status) = filters.payment_status {
            qb.push(" AND payment_status = ").push_bind(payment_status.as_str());
        }
        if let Some(date_from) = filters.date_from {
            qb.push(" AND created_at >= ").push_bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            qb.push(" AND created_at <= ").push_bind(date_to);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.push(" LIMIT ").push_bind(filters.limit);
        qb.push(" OFFSET ").push_bind(filters.offset);

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.load_order(row).await?);
        }
        Ok(orders)
    }

    /// Cancel an order: restore stock for every item, set the status to
    /// cancelled, and append the reason to the notes.
    ///
    /// Stock restore is an unbounded increment; concurrent restocking may
    /// legitimately have raised the level past its pre-order value.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the order does not exist.
    /// - `RepositoryError::Conflict` if the order is already delivered or
    ///   cancelled. State is left unchanged.
    pub async fn cancel(
        &self,
        id: OrderId,
        reason: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let row = row.ok_or(RepositoryError::NotFound)?;

        let status = OrderStatus::parse(&row.status)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        if status == OrderStatus::Delivered {
            return Err(RepositoryError::Conflict(
                "cannot cancel a delivered order".to_owned(),
            ));
        }
        if status == OrderStatus::Cancelled {
            return Err(RepositoryError::Conflict(
                "order is already cancelled".to_owned(),
            ));
        }

        sqlx::query(
            r"
UPDATE products p
SET stock_quantity = p.stock_quantity + oi.quantity
FROM order_items oi
WHERE oi.order_id = $1 AND oi.product_id = p.id
",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let notes = reason.map_or_else(
            || row.notes.clone(),
            |r| {
                let existing = row.notes.as_deref().unwrap_or_default();
                Some(format!("{existing}\nCancellation reason: {r}").trim().to_owned())
            },
        );

        sqlx::query(
            "UPDATE orders SET status = $1, notes = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(notes.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Transition the order status.
    ///
    /// Setting shipped or delivered stamps the corresponding timestamp the
    /// first time only; re-setting the same status never re-stamps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let row = row.ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        let shipped_at = match (status, row.shipped_at) {
            (OrderStatus::Shipped, None) => Some(now),
            _ => row.shipped_at,
        };
        let delivered_at = match (status, row.delivered_at) {
            (OrderStatus::Delivered, None) => Some(now),
            _ => row.delivered_at,
        };

        sqlx::query(
            r"
UPDATE orders
SET status = $1, shipped_at = $2, delivered_at = $3, updated_at = NOW()
WHERE id = $4
",
        )
        .bind(status.as_str())
        .bind(shipped_at)
        .bind(delivered_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set the payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(payment_status.as_str())
        .bind(id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a typed update to the allow-listed mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty update and
    /// `RepositoryError::NotFound` if the order does not exist.
    pub async fn update(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Validation(
                "no valid fields to update".to_owned(),
            ));
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE orders SET updated_at = NOW()");
        if let Some(status) = update.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(payment_status) = update.payment_status {
            qb.push(", payment_status = ").push_bind(payment_status.as_str());
        }
        if let Some(payment_method) = &update.payment_method {
            qb.push(", payment_method = ").push_bind(payment_method);
        }
        if let Some(notes) = &update.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        if let Some(shipped_at) = update.shipped_at {
            qb.push(", shipped_at = ").push_bind(shipped_at);
        }
        if let Some(delivered_at) = update.delivered_at {
            qb.push(", delivered_at = ").push_bind(delivered_at);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn load_order(&self, row: OrderRow) -> Result<Order, RepositoryError> {
        let items: Vec<OrderItemRow> = sqlx::query_as(
            r"
SELECT id, product_id, variant_id, product_name, product_sku,
       quantity, unit_price, line_total
FROM order_items
WHERE order_id = $1
ORDER BY id
",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let addresses: Vec<AddressRow> = sqlx::query_as(
            r"
SELECT address_type, first_name, last_name, email, phone,
       street_address_1, street_address_2, city, state, postal_code, country
FROM order_addresses
WHERE order_id = $1
ORDER BY address_type
",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let mut shipping = None;
        let mut billing = None;
        for address in addresses {
            match address.address_type.as_str() {
                "shipping" => shipping = Some(OrderAddress::from(address)),
                "billing" => billing = Some(OrderAddress::from(address)),
                other => {
                    return Err(RepositoryError::DataCorruption(format!(
                        "unknown address type: {other}"
                    )));
                }
            }
        }

        row.into_order(items.into_iter().map(OrderItem::from).collect(), shipping, billing)
    }
}

async fn insert_address(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    order_id: OrderId,
    address_type: &str,
    address: &NewOrderAddress,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
INSERT INTO order_addresses (
    order_id, address_type, first_name, last_name, email, phone,
    street_address_1, street_address_2, city, state, postal_code, country
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
",
    )
    .bind(order_id)
    .bind(address_type)
    .bind(&address.first_name)
    .bind(&address.last_name)
    .bind(address.email.as_deref())
    .bind(address.phone.as_deref())
    .bind(&address.street_address_1)
    .bind(address.street_address_2.as_deref())
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        assert!(number.starts_with("MG"));
        assert_eq!(number.len(), 13);
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_order_numbers_vary() {
        // The random suffix makes immediate duplicates unlikely; the
        // UNIQUE constraint covers the rest.
        let numbers: std::collections::HashSet<String> =
            (0..50).map(|_| generate_order_number()).collect();
        assert!(numbers.len() > 1);
    }
}
