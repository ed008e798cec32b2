use crate::{
    libs::{messages::Message, store::TodoStore, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Beginning of the title, matched case-sensitively
    prefix: String,
}

pub async fn cmd(args: SuggestArgs, mut store: TodoStore) -> Result<()> {
    let titles = store.make_suggestions(&args.prefix).await?;
    if titles.is_empty() {
        msg_info!(Message::NoSuggestions);
        return Ok(());
    }

    msg_print!(Message::SuggestionsHeader(args.prefix.trim().to_string()), true);
    View::suggestions(titles);
    Ok(())
}
