#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use todo004::db::backup::import_with_rollback;
    use todo004::db::db::Db;
    use todo004::db::migrations::SchemaState;
    use todo004::libs::category::{Category, CategoryKind};
    use todo004::libs::error::StoreError;
    use todo004::libs::store::TodoStore;
    use todo004::libs::todo::{NewTodo, TodoItem};

    struct BackupTestContext {
        temp_dir: TempDir,
    }

    impl AsyncTestContext for BackupTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            BackupTestContext { temp_dir }
        }
    }

    impl BackupTestContext {
        fn path(&self, name: &str) -> PathBuf {
            self.temp_dir.path().join(name)
        }

        /// Store with one extra category and a few items in different states.
        async fn populated_store(&self, name: &str) -> TodoStore {
            let mut store = TodoStore::at_path(self.path(name)).unwrap();
            let snapshot = store.load().await.unwrap();
            let dated = snapshot.list_category()[0].id;
            let plain = snapshot.list_category()[1].id;

            let work = store.add_category("Work", CategoryKind::Dated).await.unwrap().unwrap();
            store.add_todo(NewTodo::new(dated, "Dentist", "bring card", Some("2025-06-01"))).await.unwrap();
            let done = store.add_todo(NewTodo::new(work, "Release", "", Some("2025-06-03"))).await.unwrap();
            store.toggle_completion(done).await.unwrap();
            store.add_todo(NewTodo::new(plain, "Learn piano", "", None)).await.unwrap();
            store
        }

        /// Bytes of a legacy file whose category table cannot be read.
        fn broken_legacy_bytes(&self) -> Vec<u8> {
            let path = self.path("broken.sqlite3");
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE ms_category (id INTEGER PRIMARY KEY);
                 CREATE TABLE tr_todo (id INTEGER PRIMARY KEY);
                 INSERT INTO ms_category (id) VALUES (1);",
            )
            .unwrap();
            drop(conn);
            fs::read(&path).unwrap()
        }
    }

    impl BackupTestContext {
        /// Rewrites an exported image so its header selects WAL journaling.
        fn with_wal_journal(&self, bytes: &[u8]) -> Vec<u8> {
            let path = self.path("to_wal.db");
            fs::write(&path, bytes).unwrap();
            let conn = Connection::open(&path).unwrap();
            let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0)).unwrap();
            assert_eq!(mode, "wal");
            drop(conn);
            fs::read(&path).unwrap()
        }

        fn count_rows(&self, bytes: &[u8], sql: &str) -> i64 {
            let path = self.path("inspect.db");
            let _ = fs::remove_file(&path);
            fs::write(&path, bytes).unwrap();
            let conn = Connection::open(&path).unwrap();
            conn.query_row(sql, [], |row| row.get(0)).unwrap()
        }
    }

    fn state(store: &TodoStore) -> (Vec<Category>, Vec<TodoItem>) {
        let snapshot = store.snapshot();
        let todos = snapshot.current_todo().values().flatten().cloned().collect();
        (snapshot.list_category().to_vec(), todos)
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_export_then_import_round_trip(ctx: &mut BackupTestContext) {
        let mut source = ctx.populated_store("source.db").await;
        let bytes = source.export_snapshot().await.unwrap();
        assert!(bytes.starts_with(b"SQLite format 3\0"));

        let mut target = TodoStore::at_path(ctx.path("target.db")).unwrap();
        target.load().await.unwrap();
        let report = target.import_snapshot(bytes).await.unwrap();
        assert_eq!(report.state, SchemaState::Current);

        assert_eq!(state(&target), state(&source));
        assert!(target.is_initialized());
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_export_initializes_lazily(ctx: &mut BackupTestContext) {
        let mut store = TodoStore::at_path(ctx.path("lazy.db")).unwrap();
        assert!(!store.is_initialized());

        let bytes = store.export_snapshot().await.unwrap();
        assert!(store.is_initialized());
        assert!(bytes.starts_with(b"SQLite format 3\0"));
        assert_eq!(ctx.count_rows(&bytes, "SELECT COUNT(*) FROM ms_category"), 2);
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_export_includes_write_ahead_log(ctx: &mut BackupTestContext) {
        let mut source = ctx.populated_store("source.db").await;
        let wal_bytes = ctx.with_wal_journal(&source.export_snapshot().await.unwrap());

        let mut store = TodoStore::at_path(ctx.path("wal.db")).unwrap();
        store.load().await.unwrap();
        store.import_snapshot(wal_bytes).await.unwrap();
        let category = store.snapshot().list_category()[0].id;
        store.add_todo(NewTodo::new(category, "Fresh", "", Some("2025-07-01"))).await.unwrap();

        let exported = store.export_snapshot().await.unwrap();
        assert_eq!(ctx.count_rows(&exported, "SELECT COUNT(*) FROM tr_todo WHERE title = 'Fresh'"), 1);
        assert_eq!(ctx.count_rows(&exported, "SELECT COUNT(*) FROM tr_todo"), 4);
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_failed_import_restores_write_ahead_log_content(ctx: &mut BackupTestContext) {
        let mut source = ctx.populated_store("source.db").await;
        let wal_bytes = ctx.with_wal_journal(&source.export_snapshot().await.unwrap());

        let mut store = TodoStore::at_path(ctx.path("wal.db")).unwrap();
        store.load().await.unwrap();
        store.import_snapshot(wal_bytes).await.unwrap();
        let category = store.snapshot().list_category()[0].id;
        store.add_todo(NewTodo::new(category, "Fresh", "", Some("2025-07-01"))).await.unwrap();
        let before = state(&store);

        let result = store.import_snapshot(ctx.broken_legacy_bytes()).await;
        assert!(matches!(result, Err(StoreError::Migration(_))));

        assert_eq!(state(&store), before);
        assert!(store.search_titles("Fre", 5).await.unwrap().contains(&"Fresh".to_string()));
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_failed_migration_restores_backup(ctx: &mut BackupTestContext) {
        let mut store = ctx.populated_store("main.db").await;
        let before = state(&store);

        let result = store.import_snapshot(ctx.broken_legacy_bytes()).await;
        assert!(matches!(result, Err(StoreError::Migration(_))));

        assert!(store.is_initialized());
        assert_eq!(state(&store), before);

        // Still usable afterwards.
        store.add_category("After", CategoryKind::Plain).await.unwrap();
        assert_eq!(store.snapshot().list_category().len(), before.0.len() + 1);
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_unreadable_file_restores_backup(ctx: &mut BackupTestContext) {
        let mut store = ctx.populated_store("main.db").await;
        let before = state(&store);

        let garbage = b"definitely not an sqlite database ".repeat(200);
        let result = store.import_snapshot(garbage).await;
        assert!(matches!(result, Err(StoreError::Connection(_))));

        assert_eq!(state(&store), before);
        assert!(store.search_titles("Dent", 5).await.unwrap().contains(&"Dentist".to_string()));
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_failed_restore_keeps_import_error(ctx: &mut BackupTestContext) {
        // The current file opens but cannot be migrated, so the restore fails too.
        let path = ctx.path("unmigrated.db");
        fs::write(&path, ctx.broken_legacy_bytes()).unwrap();
        let mut db = Db::at(&path);
        db.open().unwrap();

        let garbage = b"definitely not an sqlite database ".repeat(200);
        let result = import_with_rollback(&mut db, &garbage);
        assert!(matches!(result, Err(StoreError::Connection(_))));
        assert!(!db.is_open());
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_failed_import_without_backup_propagates(ctx: &mut BackupTestContext) {
        let mut store = TodoStore::at_path(ctx.path("first.db")).unwrap();

        let result = store.import_snapshot(ctx.broken_legacy_bytes()).await;
        assert!(matches!(result, Err(StoreError::Migration(_))));
        assert!(!store.is_initialized());
    }

    #[test_context(BackupTestContext)]
    #[tokio::test]
    async fn test_import_migrates_legacy_file(ctx: &mut BackupTestContext) {
        let legacy = ctx.path("legacy.sqlite");
        let conn = Connection::open(&legacy).unwrap();
        conn.execute_batch(
            "CREATE TABLE ms_category (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE tr_todo (id INTEGER PRIMARY KEY, id_category INTEGER, title TEXT, detail TEXT, do_at TEXT, created_at TEXT);
             INSERT INTO ms_category (id, name) VALUES (2, 'Imported');
             INSERT INTO tr_todo VALUES (1, 2, 'Carry over', '', '2023-12-24', '2023-12-01 08:00:00');",
        )
        .unwrap();
        drop(conn);

        let mut store = ctx.populated_store("main.db").await;
        let report = store.import_snapshot(fs::read(&legacy).unwrap()).await.unwrap();
        assert_eq!(report.state, SchemaState::Legacy);
        assert_eq!(report.todos_migrated, 1);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.list_category().len(), 1);
        assert_eq!(snapshot.current_for(2)[0].title, "Carry over");
    }
}
