use super::{DocumentStore, Mutation};
use crate::error::{BmtreeError, Result};
use crate::models::{FolderDocument, FolderId};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Document store on an embedded SQLite database.
///
/// Each folder is one row holding its JSON document; `parent_id` and `position` are
/// generated columns read out of the document so there is a single source of truth.
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
}

const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
        SELECT id FROM folders WHERE id = ?1
        UNION
        SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id
    )";

impl SqliteStore {
    pub fn init_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        store.setup_tables()?;
        Ok(store)
    }

    /// Open (or create) the store file. Any failure to reach it is a connection error.
    pub fn init(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        let unreachable =
            |e: rusqlite::Error| BmtreeError::Connection(format!("{}: {}", db_path.display(), e));

        let conn = Connection::open(db_path).map_err(unreachable)?;
        conn.busy_timeout(busy_timeout).map_err(unreachable)?;
        // Ping: fails here when the file exists but is not a database
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(unreachable)?;

        let store = Self {
            conn,
            db_path: db_path.to_path_buf(),
        };
        store.setup_tables()?;
        log::debug!("Opened document store at {}", db_path.display());
        Ok(store)
    }

    /// Get the database file path
    pub fn get_path(&self) -> &Path {
        &self.db_path
    }

    fn setup_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS folders (
                id TEXT PRIMARY KEY NOT NULL,
                doc TEXT NOT NULL CHECK (json_valid(doc) AND json_extract(doc, '$.id') = id),
                parent_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.parent_id')) VIRTUAL,
                position INTEGER GENERATED ALWAYS AS (json_extract(doc, '$.position')) VIRTUAL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id)",
            [],
        )?;

        Ok(())
    }

    fn query_docs<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<FolderDocument>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(serde_json::from_str(&row?)?);
        }
        Ok(documents)
    }

    fn find_in(conn: &Connection, id: &FolderId) -> Result<Option<FolderDocument>> {
        let text: Option<String> = conn
            .query_row(
                "SELECT doc FROM folders WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match text {
            Some(text) => Some(serde_json::from_str(&text)?),
            None => None,
        })
    }

    fn write_transaction(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl DocumentStore for SqliteStore {
    fn find(&self, id: &FolderId) -> Result<Option<FolderDocument>> {
        Self::find_in(&self.conn, id)
    }

    fn find_root(&self) -> Result<Option<FolderDocument>> {
        let mut roots = Self::query_docs(
            &self.conn,
            "SELECT doc FROM folders WHERE parent_id IS NULL ORDER BY rowid",
            [],
        )?;
        if roots.len() > 1 {
            log::warn!("Store has {} parentless folders, using the oldest", roots.len());
        }
        Ok(if roots.is_empty() {
            None
        } else {
            Some(roots.remove(0))
        })
    }

    fn find_children(&self, parent: &FolderId) -> Result<Vec<FolderDocument>> {
        Self::query_docs(
            &self.conn,
            "SELECT doc FROM folders WHERE parent_id = ?1 ORDER BY position, rowid",
            [parent.as_str()],
        )
    }

    fn find_subtree(&self, id: &FolderId) -> Result<Vec<FolderDocument>> {
        let sql = format!(
            "{} SELECT doc FROM folders WHERE id IN (SELECT id FROM subtree) ORDER BY position, rowid",
            SUBTREE_CTE
        );
        Self::query_docs(&self.conn, &sql, [id.as_str()])
    }

    fn find_by_id_prefix(&self, prefix: &str) -> Result<Vec<FolderDocument>> {
        Self::query_docs(
            &self.conn,
            "SELECT doc FROM folders WHERE substr(id, 1, length(?1)) = ?1 ORDER BY id",
            [prefix],
        )
    }

    fn find_all(&self) -> Result<Vec<FolderDocument>> {
        Self::query_docs(
            &self.conn,
            "SELECT doc FROM folders ORDER BY position, rowid",
            [],
        )
    }

    fn insert(&self, documents: &[FolderDocument]) -> Result<()> {
        let tx = self.write_transaction()?;
        for doc in documents {
            let json = serde_json::to_string(doc)?;
            tx.execute(
                "INSERT INTO folders (id, doc) VALUES (?1, ?2)",
                params![doc.id.as_str(), json],
            )?;
        }
        tx.commit()?;
        log::debug!("Inserted {} folder document(s)", documents.len());
        Ok(())
    }

    fn update_many(
        &self,
        ids: &[&FolderId],
        mutation: &mut Mutation<'_>,
    ) -> Result<Vec<FolderDocument>> {
        let unique: HashSet<&FolderId> = ids.iter().copied().collect();
        if unique.len() != ids.len() {
            return Err(BmtreeError::InvalidInput(
                "the same folder was listed twice in one write".to_string(),
            ));
        }

        let tx = self.write_transaction()?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            match Self::find_in(&tx, id)? {
                Some(doc) => documents.push(doc),
                None => return Err(BmtreeError::NotFound(format!("folder {}", id))),
            }
        }

        // An error here drops `tx`, which rolls back
        mutation(&mut documents)?;

        for (id, doc) in ids.iter().zip(&documents) {
            if doc.id != **id {
                return Err(BmtreeError::InvalidInput(format!(
                    "folder {} cannot change its id",
                    id
                )));
            }
            let json = serde_json::to_string(doc)?;
            tx.execute(
                "UPDATE folders SET doc = ?2 WHERE id = ?1",
                params![id.as_str(), json],
            )?;
        }

        tx.commit()?;
        log::debug!("Replaced {} folder document(s)", documents.len());
        Ok(documents)
    }

    fn reparent(
        &self,
        id: &FolderId,
        new_parent: &FolderId,
        mutation: &mut dyn FnMut(&mut FolderDocument) -> Result<()>,
    ) -> Result<FolderDocument> {
        let tx = self.write_transaction()?;

        let mut doc = Self::find_in(&tx, id)?
            .ok_or_else(|| BmtreeError::NotFound(format!("folder {}", id)))?;
        let target = Self::find_in(&tx, new_parent)?
            .ok_or_else(|| BmtreeError::NotFound(format!("folder {}", new_parent)))?;

        if doc.is_root() {
            return Err(BmtreeError::Cycle("the root folder cannot be moved".to_string()));
        }
        if id == new_parent {
            return Err(BmtreeError::Cycle(format!(
                "cannot move folder {} into itself",
                id
            )));
        }

        let mut visited = HashSet::new();
        let mut cursor = target.parent_id;
        while let Some(ancestor) = cursor {
            if ancestor == *id {
                return Err(BmtreeError::Cycle(format!(
                    "cannot move folder {} under its own descendant {}",
                    id, new_parent
                )));
            }
            if !visited.insert(ancestor.clone()) {
                return Err(BmtreeError::Cycle(format!(
                    "folder {} is part of a parent loop",
                    ancestor
                )));
            }
            cursor = tx
                .query_row(
                    "SELECT parent_id FROM folders WHERE id = ?1",
                    [ancestor.as_str()],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?
                .flatten()
                .map(FolderId::from);
        }

        let position: u32 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM folders WHERE parent_id = ?1",
            [new_parent.as_str()],
            |row| row.get(0),
        )?;
        doc.parent_id = Some(new_parent.clone());
        doc.position = position;
        mutation(&mut doc)?;

        let json = serde_json::to_string(&doc)?;
        tx.execute(
            "UPDATE folders SET doc = ?2 WHERE id = ?1",
            params![id.as_str(), json],
        )?;
        tx.commit()?;
        log::debug!("Re-parented folder {} under {}", id, new_parent);
        Ok(doc)
    }

    fn delete_leaf(&self, id: &FolderId) -> Result<bool> {
        let tx = self.write_transaction()?;
        let deleted = tx.execute(
            "DELETE FROM folders WHERE id = ?1
             AND NOT EXISTS (SELECT 1 FROM folders WHERE parent_id = ?1)",
            [id.as_str()],
        )?;

        if deleted == 0 {
            if Self::find_in(&tx, id)?.is_none() {
                return Err(BmtreeError::NotFound(format!("folder {}", id)));
            }
            return Ok(false);
        }

        tx.commit()?;
        log::debug!("Deleted folder {}", id);
        Ok(true)
    }

    fn delete_subtree(&self, id: &FolderId) -> Result<usize> {
        let tx = self.write_transaction()?;
        let sql = format!(
            "{} DELETE FROM folders WHERE id IN (SELECT id FROM subtree)",
            SUBTREE_CTE
        );
        let deleted = tx.execute(&sql, [id.as_str()])?;
        if deleted == 0 {
            return Err(BmtreeError::NotFound(format!("folder {}", id)));
        }
        tx.commit()?;
        log::debug!("Deleted {} folder(s) under {}", deleted, id);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrlEntry;
    use rstest::{fixture, rstest};
    use tempfile::tempdir;

    fn setup_test_store() -> SqliteStore {
        SqliteStore::init_in_memory().unwrap()
    }

    /// root -> [a -> [a1], b]
    struct Seeded {
        store: SqliteStore,
        root: FolderDocument,
        a: FolderDocument,
        a1: FolderDocument,
        b: FolderDocument,
    }

    #[fixture]
    fn seeded() -> Seeded {
        let store = setup_test_store();
        let root = FolderDocument::new("roots", None, 0);
        let a = FolderDocument::new("A", Some(root.id.clone()), 0);
        let b = FolderDocument::new("B", Some(root.id.clone()), 1);
        let a1 = FolderDocument::new("A1", Some(a.id.clone()), 0);
        store
            .insert(&[root.clone(), b.clone(), a.clone(), a1.clone()])
            .unwrap();
        Seeded {
            store,
            root,
            a,
            a1,
            b,
        }
    }

    #[rstest]
    fn test_insert_and_find(seeded: Seeded) {
        let found = seeded.store.find(&seeded.a.id).unwrap().unwrap();
        assert_eq!(found, seeded.a);
        assert!(seeded.store.find(&FolderId::generate()).unwrap().is_none());
    }

    #[rstest]
    fn test_find_root(seeded: Seeded) {
        let root = seeded.store.find_root().unwrap().unwrap();
        assert_eq!(root.id, seeded.root.id);
    }

    #[test]
    fn test_find_root_on_empty_store() {
        let store = setup_test_store();
        assert!(store.find_root().unwrap().is_none());
    }

    #[rstest]
    fn test_children_ordered_by_position(seeded: Seeded) {
        let children = seeded.store.find_children(&seeded.root.id).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[rstest]
    fn test_find_subtree(seeded: Seeded) {
        let subtree = seeded.store.find_subtree(&seeded.a.id).unwrap();
        let mut ids: Vec<_> = subtree.iter().map(|d| d.id.clone()).collect();
        ids.sort();
        let mut expected = vec![seeded.a.id.clone(), seeded.a1.id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        assert_eq!(seeded.store.find_subtree(&seeded.root.id).unwrap().len(), 4);
        assert!(seeded
            .store
            .find_subtree(&FolderId::generate())
            .unwrap()
            .is_empty());
    }

    #[rstest]
    fn test_find_by_id_prefix(seeded: Seeded) {
        let prefix = &seeded.b.id.as_str()[..8];
        let found = seeded.store.find_by_id_prefix(prefix).unwrap();
        assert!(found.iter().any(|d| d.id == seeded.b.id));
        assert!(seeded.store.find_by_id_prefix("zzzz").unwrap().is_empty());
    }

    #[rstest]
    fn test_duplicate_insert_rolls_back(seeded: Seeded) {
        let fresh = FolderDocument::new("Fresh", Some(seeded.root.id.clone()), 2);
        let result = seeded.store.insert(&[fresh.clone(), seeded.a.clone()]);
        assert!(result.is_err());
        // The first document of the failed batch was not kept
        assert!(seeded.store.find(&fresh.id).unwrap().is_none());
    }

    #[rstest]
    fn test_update_changes_only_target(seeded: Seeded) {
        let updated = seeded
            .store
            .update(&seeded.a.id, &mut |doc| {
                doc.urls.push(UrlEntry::new("Rust", "https://www.rust-lang.org/"));
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.urls.len(), 1);

        let stored = seeded.store.find(&seeded.a.id).unwrap().unwrap();
        assert_eq!(stored.urls[0].name, "Rust");
        assert_eq!(seeded.store.find(&seeded.b.id).unwrap().unwrap(), seeded.b);
        assert_eq!(seeded.store.find(&seeded.a1.id).unwrap().unwrap(), seeded.a1);
    }

    #[rstest]
    fn test_failed_mutation_writes_nothing(seeded: Seeded) {
        let result = seeded.store.update(&seeded.a.id, &mut |doc| {
            doc.name = "Changed".to_string();
            Err(BmtreeError::Validation("rejected".to_string()))
        });
        assert!(matches!(result, Err(BmtreeError::Validation(_))));
        assert_eq!(seeded.store.find(&seeded.a.id).unwrap().unwrap().name, "A");
    }

    #[rstest]
    fn test_update_missing_folder(seeded: Seeded) {
        let result = seeded
            .store
            .update(&FolderId::generate(), &mut |_| Ok(()));
        assert!(matches!(result, Err(BmtreeError::NotFound(_))));
    }

    #[rstest]
    fn test_update_many_is_all_or_nothing(seeded: Seeded) {
        let ghost = FolderId::generate();
        let result = seeded
            .store
            .update_many(&[&seeded.a.id, &ghost], &mut |_| Ok(()));
        assert!(matches!(result, Err(BmtreeError::NotFound(_))));

        let docs = seeded
            .store
            .update_many(&[&seeded.a.id, &seeded.b.id], &mut |docs| {
                docs[0].name = "A2".to_string();
                docs[1].name = "B2".to_string();
                Ok(())
            })
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(seeded.store.find(&seeded.a.id).unwrap().unwrap().name, "A2");
        assert_eq!(seeded.store.find(&seeded.b.id).unwrap().unwrap().name, "B2");
    }

    #[rstest]
    fn test_update_many_rejects_repeated_id(seeded: Seeded) {
        let result = seeded
            .store
            .update_many(&[&seeded.a.id, &seeded.a.id], &mut |_| Ok(()));
        assert!(matches!(result, Err(BmtreeError::InvalidInput(_))));
    }

    #[rstest]
    fn test_update_cannot_change_id(seeded: Seeded) {
        let result = seeded.store.update(&seeded.b.id, &mut |doc| {
            doc.id = FolderId::generate();
            Ok(())
        });
        assert!(matches!(result, Err(BmtreeError::InvalidInput(_))));
        assert!(seeded.store.find(&seeded.b.id).unwrap().is_some());
    }

    #[rstest]
    fn test_move_by_parent_id(seeded: Seeded) {
        seeded
            .store
            .update(&seeded.b.id, &mut |doc| {
                doc.parent_id = Some(seeded.a.id.clone());
                Ok(())
            })
            .unwrap();
        let children = seeded.store.find_children(&seeded.a.id).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(seeded.store.find_children(&seeded.root.id).unwrap().len(), 1);
    }

    #[rstest]
    fn test_reparent_appends_after_siblings(seeded: Seeded) {
        let moved = seeded
            .store
            .reparent(&seeded.a1.id, &seeded.root.id, &mut |_| Ok(()))
            .unwrap();
        assert_eq!(moved.parent_id.as_ref(), Some(&seeded.root.id));
        assert_eq!(moved.position, 2);
        assert_eq!(seeded.store.find(&seeded.a1.id).unwrap().unwrap(), moved);
    }

    #[rstest]
    fn test_reparent_rejects_cycles(seeded: Seeded) {
        let before = seeded.store.find_all().unwrap();
        let mut noop = |_: &mut FolderDocument| -> Result<()> { Ok(()) };

        let result = seeded.store.reparent(&seeded.a.id, &seeded.a1.id, &mut noop);
        assert!(matches!(result, Err(BmtreeError::Cycle(_))));
        let result = seeded.store.reparent(&seeded.a.id, &seeded.a.id, &mut noop);
        assert!(matches!(result, Err(BmtreeError::Cycle(_))));
        let result = seeded.store.reparent(&seeded.root.id, &seeded.b.id, &mut noop);
        assert!(matches!(result, Err(BmtreeError::Cycle(_))));
        let result = seeded
            .store
            .reparent(&seeded.a.id, &FolderId::generate(), &mut noop);
        assert!(matches!(result, Err(BmtreeError::NotFound(_))));

        assert_eq!(seeded.store.find_all().unwrap(), before);
    }

    #[rstest]
    fn test_reparent_failed_mutation_writes_nothing(seeded: Seeded) {
        let result = seeded.store.reparent(&seeded.b.id, &seeded.a.id, &mut |_| {
            Err(BmtreeError::Validation("rejected".to_string()))
        });
        assert!(matches!(result, Err(BmtreeError::Validation(_))));
        assert_eq!(seeded.store.find(&seeded.b.id).unwrap().unwrap(), seeded.b);
    }

    #[test]
    fn test_crossed_moves_from_two_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        let first = SqliteStore::init(&path, Duration::from_millis(100)).unwrap();
        let second = SqliteStore::init(&path, Duration::from_millis(100)).unwrap();

        let root = FolderDocument::new("roots", None, 0);
        let x = FolderDocument::new("X", Some(root.id.clone()), 0);
        let y = FolderDocument::new("Y", Some(root.id.clone()), 1);
        first.insert(&[root.clone(), x.clone(), y.clone()]).unwrap();

        first.reparent(&x.id, &y.id, &mut |_| Ok(())).unwrap();
        // The second handle sees the committed move inside its own write
        let result = second.reparent(&y.id, &x.id, &mut |_| Ok(()));
        assert!(matches!(result, Err(BmtreeError::Cycle(_))));
        assert_eq!(
            second.find(&y.id).unwrap().unwrap().parent_id,
            Some(root.id)
        );
    }

    #[rstest]
    fn test_delete_leaf(seeded: Seeded) {
        assert!(!seeded.store.delete_leaf(&seeded.a.id).unwrap());
        assert!(seeded.store.find(&seeded.a.id).unwrap().is_some());

        assert!(seeded.store.delete_leaf(&seeded.a1.id).unwrap());
        assert!(seeded.store.find(&seeded.a1.id).unwrap().is_none());

        let result = seeded.store.delete_leaf(&seeded.a1.id);
        assert!(matches!(result, Err(BmtreeError::NotFound(_))));
    }

    #[rstest]
    fn test_delete_subtree(seeded: Seeded) {
        assert_eq!(seeded.store.delete_subtree(&seeded.a.id).unwrap(), 2);
        assert!(seeded.store.find(&seeded.a1.id).unwrap().is_none());
        assert_eq!(seeded.store.find_all().unwrap().len(), 2);

        let result = seeded.store.delete_subtree(&seeded.a.id);
        assert!(matches!(result, Err(BmtreeError::NotFound(_))));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        let root = FolderDocument::new("roots", None, 0);
        {
            let store = SqliteStore::init(&path, Duration::from_millis(100)).unwrap();
            store.insert(&[root.clone()]).unwrap();
            assert_eq!(store.get_path(), path.as_path());
        }
        let reopened = SqliteStore::init(&path, Duration::from_millis(100)).unwrap();
        assert_eq!(reopened.find_root().unwrap().unwrap(), root);
    }

    #[test]
    fn test_unreachable_store_is_connection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("bookmarks.db");
        let result = SqliteStore::init(&path, Duration::from_millis(100));
        assert!(matches!(result, Err(BmtreeError::Connection(_))));
    }

    #[test]
    fn test_non_database_file_is_connection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        std::fs::write(&path, b"this is definitely not an sqlite database file").unwrap();
        let result = SqliteStore::init(&path, Duration::from_millis(100));
        assert!(matches!(result, Err(BmtreeError::Connection(_))));
    }
}
