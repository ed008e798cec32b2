#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use todo004::db::categories::validate_permutation;
    use todo004::libs::category::CategoryKind;
    use todo004::libs::error::StoreError;
    use todo004::libs::store::TodoStore;
    use todo004::libs::todo::NewTodo;

    struct CategoryTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
        store: TodoStore,
    }

    impl AsyncTestContext for CategoryTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("todo004.db");
            let mut store = TodoStore::at_path(&db_path).unwrap();
            store.load().await.unwrap();
            CategoryTestContext {
                _temp_dir: temp_dir,
                db_path,
                store,
            }
        }
    }

    impl CategoryTestContext {
        fn order(&self) -> Vec<(i64, i64)> {
            self.store.snapshot().list_category().iter().map(|category| (category.id, category.sort_order)).collect()
        }
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_add_category_appends(ctx: &mut CategoryTestContext) {
        let id = ctx.store.add_category("  Work  ", CategoryKind::Plain).await.unwrap().unwrap();

        let snapshot = ctx.store.snapshot();
        let last = snapshot.list_category().last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.name, "Work");
        assert_eq!(last.kind, CategoryKind::Plain);
        assert_eq!(last.sort_order, 3);
        assert!(snapshot.current_todo().contains_key(&id));
        assert!(snapshot.completed_todo().contains_key(&id));
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_blank_category_name_is_ignored(ctx: &mut CategoryTestContext) {
        let version = ctx.store.snapshot().version;
        assert_eq!(ctx.store.add_category("   ", CategoryKind::Dated).await.unwrap(), None);
        assert_eq!(ctx.store.snapshot().list_category().len(), 2);
        assert!(ctx.store.snapshot().version > version);
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_reorder_assigns_positions(ctx: &mut CategoryTestContext) {
        let third = ctx.store.add_category("Third", CategoryKind::Dated).await.unwrap().unwrap();
        let ids: Vec<i64> = ctx.order().iter().map(|(id, _)| *id).collect();

        let reordered = vec![third, ids[0], ids[1]];
        ctx.store.reorder_categories(reordered.clone()).await.unwrap();

        assert_eq!(ctx.order(), vec![(third, 1), (ids[0], 2), (ids[1], 3)]);
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_reorder_rejects_non_permutations(ctx: &mut CategoryTestContext) {
        let before = ctx.order();
        let ids: Vec<i64> = before.iter().map(|(id, _)| *id).collect();

        let candidates = vec![
            vec![ids[0]],
            vec![ids[0], ids[0]],
            vec![ids[1], ids[0], 9999],
            vec![ids[0], 9999],
            vec![],
        ];
        for candidate in candidates {
            let result = ctx.store.reorder_categories(candidate.clone()).await;
            assert!(matches!(result, Err(StoreError::Validation(_))), "{:?} should be rejected", candidate);
            assert_eq!(ctx.order(), before);
        }
    }

    #[test]
    fn test_validate_permutation() {
        assert!(validate_permutation(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_permutation(&[], &[]).is_ok());
        assert!(validate_permutation(&[1, 2, 3], &[1, 2]).is_err());
        assert!(validate_permutation(&[1, 2, 3], &[1, 2, 2]).is_err());
        assert!(validate_permutation(&[1, 2, 3], &[1, 2, 4]).is_err());
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_soft_delete_cascades_with_one_timestamp(ctx: &mut CategoryTestContext) {
        let category = ctx.store.snapshot().list_category()[0].id;
        let open = ctx.store.add_todo(NewTodo::new(category, "Open", "", Some("2025-06-01"))).await.unwrap();
        let done = ctx.store.add_todo(NewTodo::new(category, "Done", "", Some("2025-06-02"))).await.unwrap();
        ctx.store.toggle_completion(done).await.unwrap();

        let deleted = ctx.store.soft_delete_category(category).await.unwrap();
        assert_eq!(deleted, 2);

        let snapshot = ctx.store.snapshot();
        assert!(snapshot.category(category).is_none());
        assert!(!snapshot.current_todo().contains_key(&category));
        assert_eq!(snapshot.category_kind(category), CategoryKind::Dated);

        let conn = Connection::open(&ctx.db_path).unwrap();
        let category_stamp: String = conn.query_row("SELECT deleted_at FROM ms_category WHERE id = ?1", [category], |row| row.get(0)).unwrap();
        for id in [open, done] {
            let stamp: String = conn.query_row("SELECT deleted_at FROM tr_todo WHERE id = ?1", [id], |row| row.get(0)).unwrap();
            assert_eq!(stamp, category_stamp);
        }

        // A cascaded item is the only way to be deleted without completion.
        let open_completed: Option<String> = conn.query_row("SELECT completed_at FROM tr_todo WHERE id = ?1", [open], |row| row.get(0)).unwrap();
        assert!(open_completed.is_none());

        assert!(ctx.store.soft_delete_category(category).await.unwrap_err().is_validation());
        let add = ctx.store.add_todo(NewTodo::new(category, "Late", "", Some("2025-06-03"))).await;
        assert!(add.unwrap_err().is_validation());
    }

    #[test_context(CategoryTestContext)]
    #[tokio::test]
    async fn test_deleted_category_leaves_reorder_set(ctx: &mut CategoryTestContext) {
        let ids: Vec<i64> = ctx.order().iter().map(|(id, _)| *id).collect();
        ctx.store.soft_delete_category(ids[0]).await.unwrap();

        assert!(ctx.store.reorder_categories(ids.clone()).await.unwrap_err().is_validation());
        ctx.store.reorder_categories(vec![ids[1]]).await.unwrap();
        assert_eq!(ctx.order(), vec![(ids[1], 1)]);
    }
}
