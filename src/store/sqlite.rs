use anyhow::Result;
use rusqlite::{Connection, params};

use crate::domain::email::{MessageId, MessageSummary};
use crate::store::repo::MessageRepository;

pub struct SqliteRepo {
    conn: Connection,
}

impl SqliteRepo {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.migrate()?;
        Ok(repo)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS messages (
                id          TEXT PRIMARY KEY,
                from_addr   TEXT NOT NULL,
                subject     TEXT NOT NULL,
                snippet     TEXT NOT NULL,
                date_epoch  INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key   TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl MessageRepository for SqliteRepo {
    fn upsert_summaries(&mut self, items: &[MessageSummary]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO messages (id, from_addr, subject, snippet, date_epoch)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                  from_addr=excluded.from_addr,
                  subject=excluded.subject,
                  snippet=excluded.snippet,
                  date_epoch=excluded.date_epoch
                "#,
            )?;

            for it in items {
                stmt.execute(params![it.id, it.from, it.subject, it.snippet, it.date_epoch])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_summary(&self, id: &MessageId) -> Result<Option<MessageSummary>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, from_addr, subject, snippet, date_epoch FROM messages WHERE id=?1"#,
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(r) = rows.next()? {
            Ok(Some(MessageSummary {
                id: r.get(0)?,
                from: r.get(1)?,
                subject: r.get(2)?,
                snippet: r.get(3)?,
                date_epoch: r.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }

    fn list_recent(&self, limit: u32) -> Result<Vec<MessageSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, from_addr, subject, snippet, date_epoch
            FROM messages
            ORDER BY date_epoch DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let mut rows = stmt.query(params![limit as i64])?;
        let mut out = Vec::new();

        while let Some(r) = rows.next()? {
            out.push(MessageSummary {
                id: r.get(0)?,
                from: r.get(1)?,
                subject: r.get(2)?,
                snippet: r.get(3)?,
                date_epoch: r.get(4)?,
            });
        }
        Ok(out)
    }

    fn prune_keep_recent(&mut self, keep: usize) -> Result<()> {
        self.conn.execute(
            r#"
            DELETE FROM messages
            WHERE id NOT IN (
              SELECT id FROM messages
              ORDER BY date_epoch DESC, id DESC
              LIMIT ?1
            )
            "#,
            params![keep as i64],
        )?;
        Ok(())
    }

    fn get_meta_i64(&self, key: &str) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT value FROM meta WHERE key=?1"#)?;
        let mut rows = stmt.query(params![key])?;
        if let Some(r) = rows.next()? {
            Ok(Some(r.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn set_meta_i64(&mut self, key: &str, value: i64) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO meta (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value=excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}
