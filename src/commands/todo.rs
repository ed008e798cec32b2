//! Todo item commands.
//!
//! `list` shows one category at a time. Without `--sort` items appear in the
//! stored order (open first, then by due date); `--sort date|title` applies
//! the derived orderings, ascending unless `--desc` is given.

use crate::{
    libs::{dates::today, messages::Message, sort::SortDirection, store::TodoStore, todo::NewTodo, view::View},
    msg_error_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

#[derive(Debug, Args)]
pub struct TodoArgs {
    #[command(subcommand)]
    command: TodoCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortKey {
    Date,
    Title,
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    /// Add a todo to a category
    Add {
        /// Category id
        #[arg(short, long)]
        category: i64,
        title: String,
        #[arg(short, long, default_value = "")]
        detail: String,
        /// Due date, required for dated categories (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark a todo done, or open again
    Done { id: i64 },
    /// Discard a completed todo
    Discard { id: i64 },
    /// Clear completion and discard state
    Restore { id: i64 },
    /// Remove a todo that was never completed
    Erase { id: i64 },
    /// List todos of a category
    List {
        #[arg(short, long)]
        category: i64,
        #[arg(short, long, value_enum)]
        sort: Option<SortKey>,
        #[arg(long)]
        desc: bool,
        /// Also show this many completed todos
        #[arg(long)]
        completed: Option<i64>,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

pub async fn cmd(args: TodoArgs, mut store: TodoStore) -> Result<()> {
    match args.command {
        TodoCommand::Add { category, title, detail, due } => {
            let id = store.add_todo(NewTodo::new(category, &title, &detail, due.as_deref())).await?;
            msg_success!(Message::TodoCreated(id));
        }
        TodoCommand::Done { id } => {
            store.toggle_completion(id).await?;
            msg_success!(Message::TodoToggled(id));
        }
        TodoCommand::Discard { id } => {
            store.discard(id).await?;
            msg_success!(Message::TodoDiscarded(id));
        }
        TodoCommand::Restore { id } => {
            store.restore(id).await?;
            msg_success!(Message::TodoRestored(id));
        }
        TodoCommand::Erase { id } => {
            store.erase_uncompleted(id).await?;
            msg_success!(Message::TodoErased(id));
        }
        TodoCommand::List {
            category,
            sort,
            desc,
            completed,
            offset,
        } => handle_list(&mut store, category, sort, desc, completed, offset).await?,
    }
    Ok(())
}

async fn handle_list(store: &mut TodoStore, category_id: i64, sort: Option<SortKey>, desc: bool, completed: Option<i64>, offset: i64) -> Result<()> {
    let snapshot = match completed {
        Some(limit) => store.load_completed(limit, offset).await?,
        None => store.load().await?,
    };
    let Some(category) = snapshot.category(category_id) else {
        return Err(msg_error_anyhow!(Message::CategoryNotFound(category_id)));
    };

    let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
    let todos = match sort {
        Some(SortKey::Date) => snapshot.sorted_by_date(category_id, direction, today()),
        Some(SortKey::Title) => snapshot.sorted_by_title(category_id, direction),
        None => snapshot.current_for(category_id).to_vec(),
    };

    msg_print!(Message::TodosHeader(category.name.clone()), true);
    if todos.is_empty() {
        msg_info!(Message::NoTodos);
    } else {
        View::todos(&todos);
    }

    if completed.is_some() {
        let history = snapshot.completed_todo().get(&category_id).cloned().unwrap_or_default();
        msg_print!(Message::CompletedHeader(category.name.clone()), true);
        if history.is_empty() {
            msg_info!(Message::NoTodos);
        } else {
            View::todos(&history);
        }
    }
    Ok(())
}
