use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::models::Post;

/// Storage operations the HTTP layer and the seeder rely on.
pub trait PostRepository: Send + Sync {
    fn find_all(&self) -> Result<Vec<Post>>;

    fn find_by_id(&self, id: i32) -> Result<Option<Post>>;

    fn find_by_title(&self, title: &str) -> Result<Option<Post>>;

    /// Inserts the post with version 0, or overwrites the row with the same id
    /// and bumps its version.
    fn save(&self, post: &Post) -> Result<Post>;

    /// Saves every post in a single transaction.
    fn save_all(&self, posts: &[Post]) -> Result<Vec<Post>>;

    /// Does nothing when no row has this id.
    fn delete_by_id(&self, id: i32) -> Result<()>;

    fn count(&self) -> Result<i64>;
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, body, version FROM post";

const UPSERT: &str = "INSERT INTO post (id, user_id, title, body, version)
     VALUES (?1, ?2, ?3, ?4, 0)
     ON CONFLICT(id) DO UPDATE SET
         user_id = excluded.user_id,
         title = excluded.title,
         body = excluded.body,
         version = COALESCE(post.version, 0) + 1
     RETURNING id, user_id, title, body, version";

pub struct SqlitePostRepository {
    conn: Mutex<Connection>,
}

impl SqlitePostRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS post (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                version INTEGER
            )",
            [],
        )?;
        Ok(SqlitePostRepository {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        version: row.get(4)?,
    })
}

fn upsert(conn: &Connection, post: &Post) -> rusqlite::Result<Post> {
    conn.query_row(
        UPSERT,
        params![post.id, post.user_id, post.title, post.body],
        row_to_post,
    )
}

impl PostRepository for SqlitePostRepository {
    fn find_all(&self) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let posts = stmt
            .query_map([], row_to_post)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Post>> {
        let conn = self.conn()?;
        let post = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    fn find_by_title(&self, title: &str) -> Result<Option<Post>> {
        let conn = self.conn()?;
        let post = conn
            .query_row(
                &format!("{} WHERE title = ?1 ORDER BY id LIMIT 1", SELECT_COLUMNS),
                [title],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    fn save(&self, post: &Post) -> Result<Post> {
        let conn = self.conn()?;
        let saved = upsert(&conn, post)?;
        debug!("Saved post {} at version {:?}", saved.id, saved.version);
        Ok(saved)
    }

    fn save_all(&self, posts: &[Post]) -> Result<Vec<Post>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let saved = posts
            .iter()
            .map(|post| upsert(&tx, post))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(saved)
    }

    fn delete_by_id(&self, id: i32) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
        debug!("Delete of post {} removed {} row(s)", id, removed);
        Ok(())
    }

    fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM post", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with_first_post() -> SqlitePostRepository {
        let repo = SqlitePostRepository::open_in_memory().unwrap();
        repo.save_all(&[Post::new(1, 1, "Hello, World!", "This is my first post")])
            .unwrap();
        repo
    }

    #[test]
    fn finds_post_by_title() {
        let repo = repo_with_first_post();
        let post = repo.find_by_title("Hello, World!").unwrap();
        assert_eq!(post.map(|p| p.id), Some(1));
    }

    #[test]
    fn wrong_title_finds_nothing() {
        let repo = repo_with_first_post();
        assert!(repo.find_by_title("Hello, Wrong Title!").unwrap().is_none());
    }

    #[test]
    fn insert_starts_at_version_zero() {
        let repo = SqlitePostRepository::open_in_memory().unwrap();
        let mut post = Post::new(7, 2, "title", "body");
        post.version = Some(41);
        let saved = repo.save(&post).unwrap();
        assert_eq!(saved.version, Some(0));
        assert_eq!(repo.find_by_id(7).unwrap(), Some(saved));
    }

    #[test]
    fn overwrite_bumps_version_and_replaces_fields() {
        let repo = repo_with_first_post();
        let saved = repo
            .save(&Post::new(1, 3, "changed", "changed body"))
            .unwrap();
        assert_eq!(saved.version, Some(1));
        assert_eq!(saved.user_id, 3);
        assert_eq!(saved.title, "changed");

        let again = repo.save(&saved).unwrap();
        assert_eq!(again.version, Some(2));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn find_all_returns_every_row_by_id() {
        let repo = SqlitePostRepository::open_in_memory().unwrap();
        assert!(repo.find_all().unwrap().is_empty());

        repo.save(&Post::new(2, 1, "Second Post", "This is my second post."))
            .unwrap();
        repo.save(&Post::new(1, 1, "Hello, World!", "This is my first post."))
            .unwrap();
        let ids: Vec<i32> = repo.find_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn delete_missing_id_is_a_no_op() {
        let repo = repo_with_first_post();
        repo.delete_by_id(999).unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        repo.delete_by_id(1).unwrap();
        repo.delete_by_id(1).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.find_by_id(1).unwrap().is_none());
    }

    #[test]
    fn save_all_rolls_back_on_failure() {
        let repo = SqlitePostRepository::open_in_memory().unwrap();
        repo.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON post
                 WHEN NEW.title = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = repo.save_all(&[
            Post::new(1, 1, "good", "body"),
            Post::new(2, 1, "bad", "body"),
        ]);
        assert!(matches!(result, Err(Error::Sqlite(_))));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.db");
        {
            let repo = SqlitePostRepository::open(&path).unwrap();
            repo.save(&Post::new(5, 1, "kept", "on disk")).unwrap();
        }
        let repo = SqlitePostRepository::open(&path).unwrap();
        assert_eq!(repo.find_by_id(5).unwrap().map(|p| p.title), Some("kept".to_string()));
    }
}
