use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result, Row};

use crate::core::error::AppResult;
use crate::core::types::{Order, Product, Sticker, Supply};
use crate::storage::migrations::run_migrations;

/// Структура, представляющая пользователя бота в базе данных.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Telegram chat ID пользователя
    pub id: i64,
    /// Полное имя пользователя в Telegram
    pub full_name: String,
    /// Дата регистрации
    pub registered_at: DateTime<Utc>,
    /// Администратор получает запросы на регистрацию
    pub is_admin: bool,
    /// Отключённые пользователи считаются незарегистрированными
    pub is_active: bool,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and applies schema migrations.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use wbstickers::storage::db;
///
/// let pool = db::create_pool("bot.db")?;
/// # Ok::<(), wbstickers::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn user_from_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        registered_at: row.get(2)?,
        is_admin: row.get(3)?,
        is_active: row.get(4)?,
    })
}

/// Регистрирует владельца бота как единственного администратора.
///
/// Снимает флаг администратора со всех остальных пользователей и создаёт владельца,
/// если его ещё нет в базе.
pub fn prepare_db(conn: &DbConnection, owner_id: i64, owner_full_name: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE users SET is_admin = 0 WHERE is_admin = 1 AND id != ?1",
        params![owner_id],
    )?;
    tx.execute(
        "INSERT INTO users (id, full_name, registered_at, is_admin, is_active) VALUES (?1, ?2, ?3, 1, 1)
         ON CONFLICT(id) DO UPDATE SET is_admin = 1, is_active = 1",
        params![owner_id, owner_full_name, Utc::now()],
    )?;
    tx.commit()
}

/// Создает нового пользователя в базе данных.
///
/// Повторная регистрация уже существующего пользователя снова активирует его.
pub fn create_user(conn: &DbConnection, user_id: i64, full_name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, full_name, registered_at, is_admin, is_active) VALUES (?1, ?2, ?3, 0, 1)
         ON CONFLICT(id) DO UPDATE SET full_name = excluded.full_name, is_active = 1",
        params![user_id, full_name, Utc::now()],
    )?;
    Ok(())
}

/// Отключает пользователя, создавая неактивную запись, если его ещё нет.
///
/// Администратор не отключается.
pub fn deactivate_user(conn: &DbConnection, user_id: i64, full_name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, full_name, registered_at, is_admin, is_active) VALUES (?1, ?2, ?3, 0, 0)
         ON CONFLICT(id) DO UPDATE SET is_active = 0 WHERE users.is_admin = 0",
        params![user_id, full_name, Utc::now()],
    )?;
    Ok(())
}

/// Получает пользователя из базы данных по chat ID.
pub fn get_user(conn: &DbConnection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, full_name, registered_at, is_admin, is_active FROM users WHERE id = ?1",
        params![user_id],
        user_from_row,
    )
    .optional()
}

/// Проверяет, зарегистрирован ли (и активен ли) пользователь.
pub fn is_registered(conn: &DbConnection, user_id: i64) -> Result<bool> {
    Ok(get_user(conn, user_id)?.map(|u| u.is_active).unwrap_or(false))
}

/// Возвращает chat ID администратора, если он есть.
pub fn get_admin_id(conn: &DbConnection) -> Result<Option<i64>> {
    conn.query_row("SELECT id FROM users WHERE is_admin = 1 LIMIT 1", [], |row| row.get(0))
        .optional()
}

// ---------------------------------------------------------------------------
// Supplies
// ---------------------------------------------------------------------------

/// Inserts or refreshes supplies fetched from the vendor.
pub fn upsert_supplies(conn: &DbConnection, supplies: &[Supply]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO supplies (id, name, created_at, closed_at, done) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, created_at = excluded.created_at,
                 closed_at = excluded.closed_at, done = excluded.done",
        )?;
        for supply in supplies {
            stmt.execute(params![
                supply.id,
                supply.name,
                supply.created_at,
                supply.closed_at,
                supply.done
            ])?;
        }
    }
    tx.commit()?;
    Ok(supplies.len())
}

pub fn get_supply(conn: &DbConnection, supply_id: &str) -> Result<Option<Supply>> {
    conn.query_row(
        "SELECT id, name, created_at, closed_at, done FROM supplies WHERE id = ?1",
        params![supply_id],
        |row| {
            Ok(Supply {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                closed_at: row.get(3)?,
                done: row.get(4)?,
            })
        },
    )
    .optional()
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

fn order_from_row(row: &Row<'_>) -> Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        article: row.get(1)?,
        created_at: row.get(2)?,
        supply_id: row.get(3)?,
        sticker: row.get(4)?,
    })
}

/// Caches orders of a supply.
///
/// Every referenced article gets a placeholder product row so that the label pipeline can
/// rely on a product existing for each order. A sticker already cached for an order is kept.
pub fn upsert_orders(conn: &DbConnection, supply_id: Option<&str>, orders: &[Order]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut product_stmt = tx.prepare("INSERT OR IGNORE INTO products (article, name, barcode) VALUES (?1, '', '')")?;
        let mut order_stmt = tx.prepare(
            "INSERT INTO orders (id, article, created_at, supply_id, sticker) VALUES (?1, ?2, ?3, ?4, NULL)
             ON CONFLICT(id) DO UPDATE SET article = excluded.article, created_at = excluded.created_at,
                 supply_id = COALESCE(excluded.supply_id, orders.supply_id)",
        )?;
        for order in orders {
            let supply = supply_id.or(order.supply_id.as_deref());
            product_stmt.execute(params![order.article])?;
            order_stmt.execute(params![order.id, order.article, order.created_at, supply])?;
        }
    }
    tx.commit()?;
    Ok(orders.len())
}

/// Returns the cached orders of a supply in id order.
pub fn get_orders_for_supply(conn: &DbConnection, supply_id: &str) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(
        "SELECT id, article, created_at, supply_id, sticker FROM orders WHERE supply_id = ?1 ORDER BY id",
    )?;
    let orders = stmt
        .query_map(params![supply_id], order_from_row)?
        .collect::<Result<Vec<_>>>()?;
    Ok(orders)
}

pub fn get_order(conn: &DbConnection, order_id: i64) -> Result<Option<Order>> {
    conn.query_row(
        "SELECT id, article, created_at, supply_id, sticker FROM orders WHERE id = ?1",
        params![order_id],
        order_from_row,
    )
    .optional()
}

/// Stores vendor stickers on the matching orders. Returns how many orders were updated.
pub fn add_stickers_to_orders(conn: &DbConnection, stickers: &[Sticker]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut updated = 0;
    {
        let mut stmt = tx.prepare("UPDATE orders SET sticker = ?1 WHERE id = ?2")?;
        for sticker in stickers {
            let changed = stmt.execute(params![sticker.file, sticker.order_id])?;
            if changed == 0 {
                log::warn!("Sticker for unknown order {} ignored", sticker.order_id);
            }
            updated += changed;
        }
    }
    tx.commit()?;
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

pub fn get_product(conn: &DbConnection, article: &str) -> Result<Option<Product>> {
    conn.query_row(
        "SELECT article, name, barcode FROM products WHERE article = ?1",
        params![article],
        |row| {
            Ok(Product {
                article: row.get(0)?,
                name: row.get(1)?,
                barcode: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Writes product name and barcode, creating the product row if needed.
pub fn set_products_name_and_barcode(conn: &DbConnection, products: &[Product]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO products (article, name, barcode) VALUES (?1, ?2, ?3)
             ON CONFLICT(article) DO UPDATE SET name = excluded.name, barcode = excluded.barcode",
        )?;
        for product in products {
            stmt.execute(params![product.article, product.name, product.barcode])?;
        }
    }
    tx.commit()?;
    Ok(products.len())
}
