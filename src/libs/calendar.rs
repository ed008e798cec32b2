//! Calendar projection of dated items.
//!
//! Pure functions over a loaded category list and current-item map. Only
//! categories of kind `dated` take part; plain categories never show up.

use super::category::Category;
use super::todo::TodoItem;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Date → category id → items due that day.
pub type Calendar = BTreeMap<NaiveDate, BTreeMap<i64, Vec<TodoItem>>>;

fn dated_categories(categories: &[Category]) -> impl Iterator<Item = &Category> {
    categories.iter().filter(|category| category.is_dated())
}

/// Every calendar day from the earliest to the latest due date found in a
/// dated category, inclusive. Empty when no dated item has a due date.
pub fn date_span(categories: &[Category], current: &BTreeMap<i64, Vec<TodoItem>>) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = dated_categories(categories)
        .filter_map(|category| current.get(&category.id))
        .flatten()
        .filter_map(|todo| todo.due_date)
        .collect();

    let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
        return Vec::new();
    };
    first.iter_days().take_while(|date| *date <= last).collect()
}

/// Buckets current items of dated categories by due date.
///
/// Every day of [`date_span`] is present with an (possibly empty) bucket for
/// each dated category, so callers can render a dense grid.
pub fn calendar(categories: &[Category], current: &BTreeMap<i64, Vec<TodoItem>>) -> Calendar {
    let mut calendar = Calendar::new();

    for date in date_span(categories, current) {
        let buckets = calendar.entry(date).or_default();
        for category in dated_categories(categories) {
            buckets.insert(category.id, Vec::new());
        }
    }

    for category in dated_categories(categories) {
        for todo in current.get(&category.id).into_iter().flatten() {
            let Some(date) = todo.due_date else {
                continue;
            };
            calendar.entry(date).or_default().entry(category.id).or_default().push(todo.clone());
        }
    }

    calendar
}
