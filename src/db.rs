use rusqlite::{Connection, Result};
use std::path::Path;

pub fn init_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 内存数据库，用于测试和临时会话
pub fn init_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA encoding = 'UTF-8'", [])?;

    // 进程级偏好设置（与书籍、用户无关）
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS books_read (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            book_id TEXT NOT NULL,
            pages_read INTEGER NOT NULL,
            genre TEXT NOT NULL,
            logged_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}
