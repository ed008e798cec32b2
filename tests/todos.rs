#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use todo004::libs::category::CategoryKind;
    use todo004::libs::error::StoreError;
    use todo004::libs::store::TodoStore;
    use todo004::libs::todo::{NewTodo, TodoItem};

    struct TodoTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
        store: TodoStore,
        dated: i64,
        plain: i64,
    }

    impl AsyncTestContext for TodoTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("todo004.db");
            let mut store = TodoStore::at_path(&db_path).unwrap();
            let snapshot = store.load().await.unwrap();
            let dated = snapshot.list_category()[0].id;
            let plain = snapshot.list_category()[1].id;
            TodoTestContext {
                _temp_dir: temp_dir,
                db_path,
                store,
                dated,
                plain,
            }
        }
    }

    impl TodoTestContext {
        async fn add(&mut self, title: &str, due: Option<&str>) -> i64 {
            self.store.add_todo(NewTodo::new(self.dated, title, "", due)).await.unwrap()
        }

        fn find(&self, id: i64) -> Option<TodoItem> {
            self.store.snapshot().current_todo().values().flatten().find(|todo| todo.id == id).cloned()
        }

        fn row_count(&self) -> i64 {
            let conn = Connection::open(&self.db_path).unwrap();
            conn.query_row("SELECT COUNT(*) FROM tr_todo", [], |row| row.get(0)).unwrap()
        }
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_dated_item_shows_in_calendar(ctx: &mut TodoTestContext) {
        let id = ctx.add("Dentist", Some("2025-06-01")).await;

        let snapshot = ctx.store.snapshot();
        let calendar = snapshot.calendar_todo();
        let bucket = &calendar[&date("2025-06-01")][&ctx.dated];
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].id, id);
        assert_eq!(snapshot.date_span(), vec![date("2025-06-01")]);
        assert!(!calendar[&date("2025-06-01")].contains_key(&ctx.plain));
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_snapshot_version_grows_per_mutation(ctx: &mut TodoTestContext) {
        let before = ctx.store.snapshot();
        ctx.add("Dentist", Some("2025-06-01")).await;
        let after = ctx.store.snapshot();

        assert_eq!(after.version, before.version + 1);
        // The old snapshot is untouched.
        assert!(before.current_for(ctx.dated).is_empty());
        assert_eq!(after.current_for(ctx.dated).len(), 1);
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_add_todo_validation(ctx: &mut TodoTestContext) {
        let blank = ctx.store.add_todo(NewTodo::new(ctx.dated, "   ", "", Some("2025-06-01"))).await;
        assert!(matches!(blank, Err(StoreError::Validation(_))));

        let unknown = ctx.store.add_todo(NewTodo::new(9999, "Lost", "", Some("2025-06-01"))).await;
        assert!(matches!(unknown, Err(StoreError::Validation(_))));

        let missing_date = ctx.store.add_todo(NewTodo::new(ctx.dated, "Undated", "", None)).await;
        assert!(missing_date.unwrap_err().is_validation());

        let bad_date = ctx.store.add_todo(NewTodo::new(ctx.dated, "Bad date", "", Some("2025-02-30"))).await;
        assert!(bad_date.unwrap_err().is_validation());

        assert_eq!(ctx.row_count(), 0);
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_due_date_input_is_normalized(ctx: &mut TodoTestContext) {
        let id = ctx.add("Flight", Some("2025-07-04T18:30:00Z")).await;
        assert_eq!(ctx.find(id).unwrap().due_date, Some(date("2025-07-04")));

        let id = ctx.add("Train", Some("2025/07/05")).await;
        assert_eq!(ctx.find(id).unwrap().due_date, Some(date("2025-07-05")));
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_plain_category_never_stores_due_date(ctx: &mut TodoTestContext) {
        let id = ctx.store.add_todo(NewTodo::new(ctx.plain, "Read a book", "someday", Some("2025-06-01"))).await.unwrap();
        let todo = ctx.find(id).unwrap();
        assert_eq!(todo.due_date, None);
        assert_eq!(todo.detail, "someday");
        assert!(ctx.store.snapshot().date_span().is_empty());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_kind_change_clears_open_due_dates_only(ctx: &mut TodoTestContext) {
        let open = ctx.add("Open", Some("2025-06-01")).await;
        let done = ctx.add("Done", Some("2025-06-02")).await;
        ctx.store.toggle_completion(done).await.unwrap();

        ctx.store.change_category_kind(ctx.dated, CategoryKind::Plain).await.unwrap();

        assert_eq!(ctx.find(open).unwrap().due_date, None);
        assert_eq!(ctx.find(done).unwrap().due_date, Some(date("2025-06-02")));
        assert_eq!(ctx.store.snapshot().category_kind(ctx.dated), CategoryKind::Plain);
        assert!(ctx.store.snapshot().date_span().is_empty());

        // Reopening in a plain category drops the kept date.
        ctx.store.toggle_completion(done).await.unwrap();
        assert_eq!(ctx.find(done).unwrap().due_date, None);

        let unknown = ctx.store.change_category_kind(9999, CategoryKind::Dated).await;
        assert!(unknown.unwrap_err().is_validation());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_toggle_completion_flips(ctx: &mut TodoTestContext) {
        let id = ctx.add("Laundry", Some("2025-06-01")).await;

        ctx.store.toggle_completion(id).await.unwrap();
        assert!(ctx.find(id).unwrap().is_completed());

        ctx.store.toggle_completion(id).await.unwrap();
        assert!(!ctx.find(id).unwrap().is_completed());

        let missing = ctx.store.toggle_completion(9999).await;
        assert!(missing.unwrap_err().is_validation());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_discard_requires_completion(ctx: &mut TodoTestContext) {
        let id = ctx.add("Taxes", Some("2025-04-15")).await;

        let early = ctx.store.discard(id).await;
        assert!(matches!(early, Err(StoreError::Validation(_))));
        let todo = ctx.find(id).unwrap();
        assert!(todo.deleted_at.is_none());
        assert!(todo.completed_at.is_none());

        ctx.store.toggle_completion(id).await.unwrap();
        ctx.store.discard(id).await.unwrap();
        assert!(ctx.find(id).is_none());

        let snapshot = ctx.store.load_completed(10, 0).await.unwrap();
        let history = &snapshot.completed_todo()[&ctx.dated];
        assert_eq!(history.len(), 1);
        assert!(history[0].deleted_at.is_some());
        assert!(history[0].completed_at.is_some());

        // Discarded items can no longer be toggled or discarded again.
        assert!(ctx.store.toggle_completion(id).await.unwrap_err().is_validation());
        assert!(ctx.store.discard(id).await.unwrap_err().is_validation());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_restore_clears_both_stamps(ctx: &mut TodoTestContext) {
        let id = ctx.add("Taxes", Some("2025-04-15")).await;
        ctx.store.toggle_completion(id).await.unwrap();
        ctx.store.discard(id).await.unwrap();

        ctx.store.restore(id).await.unwrap();
        let todo = ctx.find(id).unwrap();
        assert!(todo.completed_at.is_none());
        assert!(todo.deleted_at.is_none());
        assert_eq!(todo.due_date, Some(date("2025-04-15")));

        assert!(ctx.store.restore(9999).await.unwrap_err().is_validation());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_erase_only_open_items(ctx: &mut TodoTestContext) {
        let open = ctx.add("Typo", Some("2025-06-01")).await;
        let done = ctx.add("Finished", Some("2025-06-01")).await;
        ctx.store.toggle_completion(done).await.unwrap();

        ctx.store.erase_uncompleted(open).await.unwrap();
        assert!(ctx.find(open).is_none());

        let refused = ctx.store.erase_uncompleted(done).await;
        assert!(refused.unwrap_err().is_validation());
        assert!(ctx.find(done).is_some());
        assert_eq!(ctx.row_count(), 1);
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_current_order_open_first_then_by_date(ctx: &mut TodoTestContext) {
        let late = ctx.add("Late", Some("2025-06-10")).await;
        let early = ctx.add("Early", Some("2025-06-01")).await;
        let done = ctx.add("Done", Some("2025-05-01")).await;
        ctx.store.toggle_completion(done).await.unwrap();

        let ids: Vec<i64> = ctx.store.snapshot().current_for(ctx.dated).iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![early, late, done]);
        assert_eq!(ctx.store.snapshot().max_current_len(), 3);
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_completed_history_pages(ctx: &mut TodoTestContext) {
        for title in ["One", "Two", "Three"] {
            let id = ctx.add(title, Some("2025-06-01")).await;
            ctx.store.toggle_completion(id).await.unwrap();
        }

        let snapshot = ctx.store.load_completed(2, 0).await.unwrap();
        assert_eq!(snapshot.completed_todo()[&ctx.dated].len(), 2);

        let snapshot = ctx.store.load_completed(2, 2).await.unwrap();
        assert_eq!(snapshot.completed_todo()[&ctx.dated].len(), 1);

        // Non-positive limit uses the configured page size, negative offset starts at 0.
        let snapshot = ctx.store.load_completed(0, -5).await.unwrap();
        assert_eq!(snapshot.completed_todo()[&ctx.dated].len(), 3);

        // The requested page survives later mutations.
        ctx.add("Four", Some("2025-06-02")).await;
        assert_eq!(ctx.store.snapshot().completed_todo()[&ctx.dated].len(), 3);
        assert!(ctx.store.snapshot().completed_todo()[&ctx.plain].is_empty());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_search_titles_prefix_and_recency(ctx: &mut TodoTestContext) {
        for title in ["Buy milk", "Buy bread", "buy eggs", "Call mom", "Buy milk"] {
            ctx.add(title, Some("2025-06-01")).await;
        }

        let titles = ctx.store.search_titles("Buy", 10).await.unwrap();
        assert_eq!(titles, vec!["Buy milk", "Buy bread"]);

        let limited = ctx.store.search_titles("Buy", 1).await.unwrap();
        assert_eq!(limited, vec!["Buy milk"]);

        assert!(ctx.store.search_titles("   ", 10).await.unwrap().is_empty());
        assert!(ctx.store.search_titles("Buy", 0).await.unwrap().is_empty());
        assert!(ctx.store.search_titles("Sell", 10).await.unwrap().is_empty());
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_search_titles_escapes_wildcards(ctx: &mut TodoTestContext) {
        for title in ["100% juice", "1000 steps", "a_b", "axb", r"C:\temp"] {
            ctx.add(title, Some("2025-06-01")).await;
        }

        assert_eq!(ctx.store.search_titles("100%", 10).await.unwrap(), vec!["100% juice"]);
        assert_eq!(ctx.store.search_titles("a_", 10).await.unwrap(), vec!["a_b"]);
        assert_eq!(ctx.store.search_titles(r"C:\", 10).await.unwrap(), vec![r"C:\temp"]);
    }

    #[test_context(TodoTestContext)]
    #[tokio::test]
    async fn test_make_suggestions_keeps_result(ctx: &mut TodoTestContext) {
        ctx.add("Plan trip", Some("2025-06-01")).await;
        ctx.add("Plant tree", Some("2025-06-02")).await;

        let suggestions = ctx.store.make_suggestions("Plan").await.unwrap().to_vec();
        assert_eq!(suggestions, vec!["Plant tree", "Plan trip"]);
        assert_eq!(ctx.store.suggestions(), suggestions.as_slice());

        ctx.store.make_suggestions("").await.unwrap();
        assert!(ctx.store.suggestions().is_empty());
    }
}
