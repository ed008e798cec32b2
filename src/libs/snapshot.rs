//! Point-in-time view of the store.
//!
//! A [`Snapshot`] is rebuilt from scratch after every mutation and handed out
//! behind an `Arc`; holders keep reading the state they were given until they
//! ask the store for a newer one. `version` grows by one per rebuild.

use super::calendar::{self, Calendar};
use super::category::{Category, CategoryKind};
use super::sort::{self, SortDirection};
use super::todo::TodoItem;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    categories: Vec<Category>,
    current: BTreeMap<i64, Vec<TodoItem>>,
    completed: BTreeMap<i64, Vec<TodoItem>>,
}

impl Snapshot {
    /// Groups loaded rows by category. Every live category gets an entry in
    /// both maps; rows of unknown or deleted categories are left out.
    pub fn build(version: u64, categories: Vec<Category>, active: Vec<TodoItem>, completed: Vec<TodoItem>) -> Self {
        let mut current: BTreeMap<i64, Vec<TodoItem>> = categories.iter().map(|category| (category.id, Vec::new())).collect();
        let mut completed_map = current.clone();

        for todo in active {
            if let Some(bucket) = current.get_mut(&todo.category_id) {
                bucket.push(todo);
            }
        }
        for todo in completed {
            if let Some(bucket) = completed_map.get_mut(&todo.category_id) {
                bucket.push(todo);
            }
        }

        Snapshot {
            version,
            categories,
            current,
            completed: completed_map,
        }
    }

    /// Live categories in display order.
    pub fn list_category(&self) -> &[Category] {
        &self.categories
    }

    /// Items not soft-deleted, keyed by category id.
    pub fn current_todo(&self) -> &BTreeMap<i64, Vec<TodoItem>> {
        &self.current
    }

    /// The loaded page of completed history, keyed by category id.
    pub fn completed_todo(&self) -> &BTreeMap<i64, Vec<TodoItem>> {
        &self.completed
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Kind of a category; unknown ids read as `dated`.
    pub fn category_kind(&self, id: i64) -> CategoryKind {
        self.category(id).map(|category| category.kind).unwrap_or(CategoryKind::Dated)
    }

    pub fn dated_category_ids(&self) -> Vec<i64> {
        self.categories.iter().filter(|category| category.is_dated()).map(|category| category.id).collect()
    }

    pub fn current_for(&self, category_id: i64) -> &[TodoItem] {
        self.current.get(&category_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn date_span(&self) -> Vec<NaiveDate> {
        calendar::date_span(&self.categories, &self.current)
    }

    pub fn calendar_todo(&self) -> Calendar {
        calendar::calendar(&self.categories, &self.current)
    }

    /// Largest number of current items in any one category.
    pub fn max_current_len(&self) -> usize {
        self.categories.iter().map(|category| self.current_for(category.id).len()).max().unwrap_or(0)
    }

    pub fn sorted_by_date(&self, category_id: i64, direction: SortDirection, today: NaiveDate) -> Vec<TodoItem> {
        let mut items = self.current_for(category_id).to_vec();
        sort::sort_by_date(&mut items, self.category_kind(category_id), direction, today);
        items
    }

    pub fn sorted_by_title(&self, category_id: i64, direction: SortDirection) -> Vec<TodoItem> {
        let mut items = self.current_for(category_id).to_vec();
        sort::sort_by_title(&mut items, direction);
        items
    }
}
