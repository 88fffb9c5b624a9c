use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Key prefix of conversation entries in `cursorDiskKV`.
pub const CONVERSATION_PREFIX: &str = "bubbleId:";

/// Key prefix of message-request-context entries in `cursorDiskKV`.
pub const CONTEXT_PREFIX: &str = "messageRequestContext:";

/// Pick the first existing candidate store path: the live database, then the
/// `.backup` copy Cursor keeps beside it. Errors name both attempted paths so
/// the user can tell what was looked for.
pub fn locate_store(primary: &Path, backup: &Path) -> Result<PathBuf> {
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }
    if backup.exists() {
        return Ok(backup.to_path_buf());
    }
    Err(eyre!(
        "Database not found at {} or {}",
        primary.display(),
        backup.display()
    ))
}

/// Open a read-only connection to the located store.
pub fn open_store(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .wrap_err_with(|| format!("Failed to open database: {}", path.display()))
}

/// Fetch all conversation rows, ordered by key ascending.
pub fn fetch_conversations(conn: &Connection) -> Result<Vec<(String, String)>> {
    fetch_prefixed(
        conn,
        "SELECT key, value FROM cursorDiskKV WHERE key LIKE 'bubbleId:%' ORDER BY key",
    )
}

/// Fetch all message-request-context rows in natural fetch order.
pub fn fetch_contexts(conn: &Connection) -> Result<Vec<(String, String)>> {
    fetch_prefixed(
        conn,
        "SELECT key, value FROM cursorDiskKV WHERE key LIKE 'messageRequestContext:%'",
    )
}

fn fetch_prefixed(conn: &Connection, sql: &str) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(sql).wrap_err("Failed to prepare query")?;
    let mut rows = stmt.query([]).wrap_err("Failed to execute query")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().wrap_err("Failed to read row")? {
        let key: String = row.get(0)?;
        let value: String = row.get(1)?;
        out.push((key, value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, &str)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value TEXT)",
            [],
        )
        .unwrap();
        for (k, v) in entries {
            conn.execute("INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)", [k, v])
                .unwrap();
        }
        conn
    }

    #[test]
    fn conversations_are_key_sorted() {
        let conn = store_with(&[
            ("bubbleId:zz", "{}"),
            ("bubbleId:aa", "{}"),
            ("composerData:ignored", "{}"),
        ]);
        let rows = fetch_conversations(&conn).unwrap();
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["bubbleId:aa", "bubbleId:zz"]);
    }

    #[test]
    fn context_fetch_ignores_conversation_keys() {
        let conn = store_with(&[
            ("bubbleId:aa", "{}"),
            ("messageRequestContext:req1", "{\"x\":1}"),
        ]);
        let rows = fetch_contexts(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "messageRequestContext:req1");
    }

    #[test]
    fn locate_prefers_primary() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("state.vscdb");
        let backup = dir.path().join("state.vscdb.backup");
        std::fs::write(&primary, b"").unwrap();
        std::fs::write(&backup, b"").unwrap();
        assert_eq!(locate_store(&primary, &backup).unwrap(), primary);
    }

    #[test]
    fn locate_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("state.vscdb");
        let backup = dir.path().join("state.vscdb.backup");
        std::fs::write(&backup, b"").unwrap();
        assert_eq!(locate_store(&primary, &backup).unwrap(), backup);
    }

    #[test]
    fn locate_error_names_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("state.vscdb");
        let backup = dir.path().join("state.vscdb.backup");
        let err = locate_store(&primary, &backup).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("state.vscdb"));
        assert!(msg.contains("state.vscdb.backup"));
    }
}
