//! Orders, stored one row per line item and grouped by `order_id`

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Database;
use crate::{Error, Result};

const ORDER_COLUMNS: &str = "uuid, order_id, created_at, contacted_at, sent_at, email, \
                             print_id, title, typ, quantity, price, status, has_paid";

/// Fulfilment state shared by every row of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Contacted,
    Shipped,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Placed, Self::Contacted, Self::Shipped];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Contacted => "CONTACTED",
            Self::Shipped => "SHIPPED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLACED" => Ok(Self::Placed),
            "CONTACTED" => Ok(Self::Contacted),
            "SHIPPED" => Ok(Self::Shipped),
            other => Err(Error::InvalidField(format!("unknown order status: {}", other))),
        }
    }
}

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrderStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

/// A single line item of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub uuid: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub contacted_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub email: String,
    pub print_id: String,
    pub title: String,
    pub typ: String,
    pub quantity: i64,
    pub price: f64,
    pub status: OrderStatus,
    pub has_paid: bool,
}

impl OrderRow {
    /// A freshly placed, unpaid row for `order_id`
    pub fn placed(
        order_id: &str,
        email: &str,
        print_id: &str,
        title: &str,
        typ: &str,
        quantity: i64,
        price: f64,
    ) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            created_at: Utc::now(),
            contacted_at: None,
            sent_at: None,
            email: email.to_string(),
            print_id: print_id.to_string(),
            title: title.to_string(),
            typ: typ.to_string(),
            quantity,
            price,
            status: OrderStatus::Placed,
            has_paid: false,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Rows sharing an `order_id`, summarized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub buyer_email: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub contacted_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub has_paid_all: bool,
    pub rows: Vec<OrderRow>,
    pub total_price: f64,
}

impl Order {
    /// Build an order from its rows. Returns `None` for an empty slice.
    pub fn from_rows(rows: Vec<OrderRow>) -> Option<Self> {
        let first = rows.first()?;

        Some(Self {
            buyer_email: first.email.clone(),
            order_id: first.order_id.clone(),
            created_at: first.created_at,
            contacted_at: first.contacted_at,
            sent_at: first.sent_at,
            status: first.status,
            has_paid_all: rows.iter().all(|row| row.has_paid),
            total_price: rows.iter().map(OrderRow::line_total).sum(),
            rows,
        })
    }
}

fn insert_order_row(conn: &Connection, row: &OrderRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            ORDER_COLUMNS
        ),
        params![
            row.uuid,
            row.order_id,
            row.created_at,
            row.contacted_at,
            row.sent_at,
            row.email,
            row.print_id,
            row.title,
            row.typ,
            row.quantity,
            row.price,
            row.status,
            row.has_paid,
        ],
    )?;
    debug!("Added order row {} to order {}", row.uuid, row.order_id);
    Ok(())
}

pub(super) fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS orders (
            uuid TEXT PRIMARY KEY,
            order_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            contacted_at TEXT,
            sent_at TEXT,
            email TEXT NOT NULL,
            print_id TEXT NOT NULL,
            title TEXT NOT NULL,
            typ TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL NOT NULL,
            status TEXT NOT NULL,
            has_paid BOOLEAN NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_orders_order_id ON orders(order_id)",
        [],
    )?;
    Ok(())
}

fn order_row_from_row(row: &Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        uuid: row.get(0)?,
        order_id: row.get(1)?,
        created_at: row.get(2)?,
        contacted_at: row.get(3)?,
        sent_at: row.get(4)?,
        email: row.get(5)?,
        print_id: row.get(6)?,
        title: row.get(7)?,
        typ: row.get(8)?,
        quantity: row.get(9)?,
        price: row.get(10)?,
        status: row.get(11)?,
        has_paid: row.get(12)?,
    })
}

/// Group rows by order id, keeping the order in which ids first appear
fn group_orders(rows: Vec<OrderRow>) -> Vec<Order> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<OrderRow>> = Vec::new();

    for row in rows {
        match index.get(&row.order_id) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(row.order_id.clone(), groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups.into_iter().filter_map(Order::from_rows).collect()
}

impl Database {
    pub async fn add_order_row(&self, row: OrderRow) -> Result<()> {
        self.call(move |conn| insert_order_row(conn, &row)).await
    }

    /// Store all rows of an order in one transaction; either every row is
    /// written or none is.
    pub async fn add_order(&self, rows: Vec<OrderRow>) -> Result<()> {
        self.call(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for row in &rows {
                insert_order_row(&tx, row)?;
            }
            tx.commit()?;
            info!("Stored order with {} rows", rows.len());
            Ok(())
        })
        .await
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        let order_id = order_id.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM orders WHERE order_id = ?1 ORDER BY rowid ASC",
                ORDER_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![order_id], order_row_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Order::from_rows(rows))
        })
        .await
    }

    /// All orders, newest first
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM orders ORDER BY created_at DESC, rowid ASC",
                ORDER_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], order_row_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(group_orders(rows))
        })
        .await
    }

    /// Move every row of an order to `status`, stamping the matching timestamp
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        let order_id = order_id.to_string();
        self.call(move |conn| {
            let current: Option<OrderStatus> = conn
                .query_row(
                    "SELECT status FROM orders WHERE order_id = ?1 LIMIT 1",
                    params![order_id],
                    |row| row.get(0),
                )
                .optional()?;

            let current = current.ok_or_else(|| Error::NotFound(format!("order {}", order_id)))?;
            if current == status {
                debug!("Order {} already {}", order_id, status);
                return Ok(());
            }

            let now = Utc::now();
            match status {
                OrderStatus::Contacted => conn.execute(
                    "UPDATE orders SET status = ?1, contacted_at = ?2 WHERE order_id = ?3",
                    params![status, now, order_id],
                )?,
                OrderStatus::Shipped => conn.execute(
                    "UPDATE orders SET status = ?1, sent_at = ?2 WHERE order_id = ?3",
                    params![status, now, order_id],
                )?,
                OrderStatus::Placed => conn.execute(
                    "UPDATE orders SET status = ?1 WHERE order_id = ?2",
                    params![status, order_id],
                )?,
            };

            info!("Order {} moved from {} to {}", order_id, current, status);
            Ok(())
        })
        .await
    }

    pub async fn set_order_row_paid(&self, row_uuid: &str, paid: bool) -> Result<()> {
        let row_uuid = row_uuid.to_string();
        self.call(move |conn| {
            let affected = conn.execute(
                "UPDATE orders SET has_paid = ?1 WHERE uuid = ?2",
                params![paid, row_uuid],
            )?;
            if affected == 0 {
                return Err(Error::NotFound(format!("order row {}", row_uuid)));
            }
            Ok(())
        })
        .await
    }
}
