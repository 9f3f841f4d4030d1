use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cache directory could not be created: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache connection lock poisoned")]
    Poisoned,
}

/// Keyword-scoped folder cache shared between the keystroke fast path and scan workers.
pub trait CacheStore: Send + Sync {
    /// Folder paths of every keyword that starts with `keyword`, in insertion order.
    fn prefix_lookup(&self, keyword: &str) -> Result<Vec<String>, CacheError>;

    /// Drops all rows for exactly `keyword` and stores `paths` in their place.
    fn replace_entries(&self, keyword: &str, paths: &[String]) -> Result<(), CacheError>;
}

/// Lowercased, trimmed form used as the cache key.
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        tracing::debug!(path = %path.display(), "opened folder cache");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Flushes and closes the underlying connection.
    pub fn close(self) -> Result<(), CacheError> {
        let conn = self.conn.into_inner().map_err(|_| CacheError::Poisoned)?;
        conn.close().map_err(|(_, err)| CacheError::Sqlite(err))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }
}

impl CacheStore for SqliteCache {
    fn prefix_lookup(&self, keyword: &str) -> Result<Vec<String>, CacheError> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        // substr instead of LIKE: no wildcard escaping, no ASCII-only case folding.
        let mut statement = conn.prepare(
            r#"
            SELECT folder_path
            FROM cache
            WHERE substr(keyword, 1, length(?1)) = ?1
            GROUP BY folder_path
            ORDER BY MIN(rowid)
            "#,
        )?;
        let rows = statement.query_map(params![keyword], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CacheError::from)
    }

    fn replace_entries(&self, keyword: &str, paths: &[String]) -> Result<(), CacheError> {
        let keyword = normalize_keyword(keyword);
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM cache WHERE keyword = ?1", params![keyword])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO cache (keyword, folder_path) VALUES (?1, ?2)")?;
            for path in paths {
                insert.execute(params![keyword, path])?;
            }
        }
        tx.commit()?;

        tracing::debug!(%keyword, removed, inserted = paths.len(), "replaced cache entries");
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cache (
            keyword TEXT,
            folder_path TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_cache_keyword ON cache(keyword);
        ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raw `(keyword, folder_path)` rows stored for exactly `keyword`.
    fn rows_for(cache: &SqliteCache, keyword: &str) -> Vec<(String, String)> {
        let conn = cache.lock().unwrap();
        let mut statement = conn
            .prepare("SELECT keyword, folder_path FROM cache WHERE keyword = ?1 ORDER BY rowid")
            .unwrap();
        let rows = statement
            .query_map(params![keyword], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .unwrap();
        rows.collect::<Result<Vec<_>, _>>().unwrap()
    }

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replace_then_lookup_returns_same_paths_in_order() {
        let cache = SqliteCache::open_in_memory().unwrap();
        let stored = paths(&["/subs/Ocean Heart", "/subs/ocean-waves"]);

        cache.replace_entries("ocean", &stored).unwrap();

        assert_eq!(cache.prefix_lookup("ocean").unwrap(), stored);
    }

    #[test]
    fn lookup_matches_stored_keywords_by_prefix() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache
            .replace_entries("ocean", &paths(&["/subs/Ocean Heart", "/subs/ocean-waves"]))
            .unwrap();

        assert_eq!(cache.prefix_lookup("oc").unwrap().len(), 2);
        assert_eq!(cache.prefix_lookup("OC").unwrap().len(), 2);
        assert!(cache.prefix_lookup("cean").unwrap().is_empty());
        assert!(cache.prefix_lookup("oceans").unwrap().is_empty());
    }

    #[test]
    fn replacing_one_keyword_leaves_others_alone() {
        let cache = SqliteCache::open_in_memory().unwrap();
        let first = paths(&["/subs/Desert Sun"]);
        cache.replace_entries("desert", &first).unwrap();
        cache.replace_entries("ocean", &paths(&["/subs/Ocean Heart"])).unwrap();

        assert_eq!(cache.prefix_lookup("desert").unwrap(), first);
    }

    #[test]
    fn replace_is_a_full_swap_not_a_merge() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache
            .replace_entries("ocean", &paths(&["/a/ocean-1", "/a/ocean-2"]))
            .unwrap();
        cache.replace_entries("ocean", &paths(&["/a/ocean-3"])).unwrap();

        assert_eq!(cache.prefix_lookup("ocean").unwrap(), paths(&["/a/ocean-3"]));

        cache.replace_entries("ocean", &[]).unwrap();
        assert!(rows_for(&cache, "ocean").is_empty());
    }

    #[test]
    fn replace_is_idempotent() {
        let cache = SqliteCache::open_in_memory().unwrap();
        let stored = paths(&["/x/one", "/x/two"]);
        cache.replace_entries("x", &stored).unwrap();
        let once = cache.prefix_lookup("x").unwrap();
        cache.replace_entries("x", &stored).unwrap();

        assert_eq!(cache.prefix_lookup("x").unwrap(), once);
        assert_eq!(rows_for(&cache, "x").len(), 2);
    }

    #[test]
    fn keywords_are_normalized_before_storage() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache
            .replace_entries("  Ocean ", &paths(&["/subs/Ocean Heart"]))
            .unwrap();

        assert_eq!(
            rows_for(&cache, "ocean"),
            vec![("ocean".to_string(), "/subs/Ocean Heart".to_string())]
        );
    }

    #[test]
    fn overlapping_keywords_do_not_duplicate_paths() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.replace_entries("oce", &paths(&["/s/Ocean Heart"])).unwrap();
        cache
            .replace_entries("ocean", &paths(&["/s/Ocean Heart", "/s/ocean-waves"]))
            .unwrap();

        assert_eq!(
            cache.prefix_lookup("oc").unwrap(),
            paths(&["/s/Ocean Heart", "/s/ocean-waves"])
        );
    }

    #[test]
    fn wildcard_characters_are_literal() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.replace_entries("50%_off", &paths(&["/s/50%_off"])).unwrap();
        cache.replace_entries("50xyoff", &paths(&["/s/50xyoff"])).unwrap();

        assert_eq!(cache.prefix_lookup("50%").unwrap(), paths(&["/s/50%_off"]));
    }

    #[test]
    fn unicode_keywords_are_lowercased() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.replace_entries("ÉTÉ", &paths(&["/s/Été indien"])).unwrap();

        assert_eq!(cache.prefix_lookup("ét").unwrap(), paths(&["/s/Été indien"]));
    }

    #[test]
    fn empty_keyword_lookup_returns_nothing() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.replace_entries("ocean", &paths(&["/s/ocean"])).unwrap();

        assert!(cache.prefix_lookup("   ").unwrap().is_empty());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("cache.db");
        let stored = paths(&["/subs/Ocean Heart"]);

        let cache = SqliteCache::open(&db).unwrap();
        cache.replace_entries("ocean", &stored).unwrap();
        cache.close().unwrap();

        let reopened = SqliteCache::open(&db).unwrap();
        assert_eq!(reopened.prefix_lookup("oc").unwrap(), stored);
    }
}
