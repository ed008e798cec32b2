//! Orderings for a category's item list.
//!
//! Sorting takes an explicit [`SortDirection`]; callers that flip direction
//! between requests keep that state themselves.

use super::category::CategoryKind;
use super::dates::date_key;
use super::todo::TodoItem;
use chrono::NaiveDate;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Primary collation key: canonical decomposition with combining marks
/// stripped, lowercased. "Éclair" and "eclair" share a key.
fn collation_key(title: &str) -> String {
    title.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Human ordering for titles. Letters compare without regard to accents or
/// case first; case-only differences come next, then the exact text.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Orders by schedule.
///
/// Plain categories order by creation time. Dated categories order by due
/// date, reading a missing one as `today`. Ties always fall back to the title
/// in ascending order.
pub fn sort_by_date(items: &mut [TodoItem], kind: CategoryKind, direction: SortDirection, today: NaiveDate) {
    items.sort_by(|a, b| {
        let primary = match kind {
            CategoryKind::Plain => a.created_at.cmp(&b.created_at),
            CategoryKind::Dated => a.due_date.unwrap_or(today).cmp(&b.due_date.unwrap_or(today)),
        };
        direction.apply(primary).then_with(|| compare_titles(&a.title, &b.title))
    });
}

/// Orders by title, then by due date (creation time when undated), both in
/// the requested direction.
pub fn sort_by_title(items: &mut [TodoItem], direction: SortDirection) {
    let schedule_key = |todo: &TodoItem| todo.due_date.map(date_key).unwrap_or_else(|| todo.created_at.clone());

    items.sort_by(|a, b| direction.apply(compare_titles(&a.title, &b.title).then_with(|| schedule_key(a).cmp(&schedule_key(b)))));
}
