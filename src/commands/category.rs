use crate::{
    libs::{category::CategoryKind, messages::Message, store::TodoStore, view::View},
    msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    command: Option<CategoryCommand>,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// List categories in display order
    List,
    /// Create a category at the end of the list
    Add {
        /// Category name
        name: String,
        /// Whether items carry a due date
        #[arg(short, long, value_enum, default_value_t = CategoryKind::Dated)]
        kind: CategoryKind,
    },
    /// Change the kind of a category
    Kind {
        id: i64,
        #[arg(value_enum)]
        kind: CategoryKind,
    },
    /// Delete a category and all of its todos
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Set the display order; every category id exactly once
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

pub async fn cmd(args: CategoryArgs, mut store: TodoStore) -> Result<()> {
    match args.command {
        Some(CategoryCommand::Add { name, kind }) => match store.add_category(&name, kind).await? {
            Some(_) => msg_success!(Message::CategoryCreated(name.trim().to_string())),
            None => msg_warning!(Message::CategoryNameBlank),
        },
        Some(CategoryCommand::Kind { id, kind }) => {
            store.change_category_kind(id, kind).await?;
            msg_success!(Message::CategoryKindChanged(id, kind.to_string()));
        }
        Some(CategoryCommand::Delete { id, yes }) => handle_delete(&mut store, id, yes).await?,
        Some(CategoryCommand::Reorder { ids }) => {
            store.reorder_categories(ids).await?;
            msg_success!(Message::CategoriesReordered);
            handle_list(&mut store).await?;
        }
        Some(CategoryCommand::List) | None => handle_list(&mut store).await?,
    }
    Ok(())
}

async fn handle_list(store: &mut TodoStore) -> Result<()> {
    let snapshot = store.load().await?;
    msg_print!(Message::CategoriesHeader, true);
    View::categories(snapshot.list_category(), &snapshot);
    Ok(())
}

async fn handle_delete(store: &mut TodoStore, id: i64, yes: bool) -> Result<()> {
    let snapshot = store.load().await?;
    let name = snapshot.category(id).map(|category| category.name.clone()).unwrap_or_else(|| id.to_string());

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteCategory(name).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    let todos = store.soft_delete_category(id).await?;
    msg_success!(Message::CategoryDeleted(id, todos));
    Ok(())
}
