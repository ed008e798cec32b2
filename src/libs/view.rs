use super::calendar::Calendar;
use super::category::Category;
use super::dates::date_key;
use super::snapshot::Snapshot;
use super::todo::TodoItem;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn categories(categories: &[Category], snapshot: &Snapshot) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "KIND", "ORDER", "OPEN"]);
        for category in categories {
            let open = snapshot.current_for(category.id).iter().filter(|todo| !todo.is_completed()).count();
            table.add_row(row![category.id, category.name, category.kind, category.sort_order, open]);
        }
        table.printstd();
    }

    pub fn todos(todos: &[TodoItem]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "DETAIL", "DUE", "STATUS"]);
        for todo in todos {
            let status = if todo.is_deleted() {
                "discarded"
            } else if todo.is_completed() {
                "done"
            } else {
                "open"
            };
            table.add_row(row![todo.id, todo.title, todo.detail, todo.due_date.map(date_key).unwrap_or_default(), status]);
        }
        table.printstd();
    }

    /// One row per date, one column per dated category.
    pub fn calendar(calendar: &Calendar, snapshot: &Snapshot) {
        let mut table = Table::new();
        let dated: Vec<&Category> = snapshot.list_category().iter().filter(|category| category.is_dated()).collect();

        let mut header = row!["DATE"];
        for category in &dated {
            header.add_cell(prettytable::Cell::new(&category.name));
        }
        table.add_row(header);

        for (date, buckets) in calendar {
            let mut line = row![date_key(*date)];
            for category in &dated {
                let titles = buckets
                    .get(&category.id)
                    .map(|todos| todos.iter().map(|todo| todo.title.as_str()).collect::<Vec<_>>().join("\n"))
                    .unwrap_or_default();
                line.add_cell(prettytable::Cell::new(&titles));
            }
            table.add_row(line);
        }
        table.printstd();
    }

    pub fn suggestions(titles: &[String]) {
        let mut table = Table::new();

        table.add_row(row!["#", "TITLE"]);
        for (index, title) in titles.iter().enumerate() {
            table.add_row(row![index + 1, title]);
        }
        table.printstd();
    }
}
