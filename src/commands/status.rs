use crate::{
    libs::{messages::Message, store::TodoStore},
    msg_info, msg_print,
};
use anyhow::Result;

pub async fn cmd(mut store: TodoStore) -> Result<()> {
    let snapshot = store.load().await?;
    msg_print!(Message::StoreInitialized(store.path().display().to_string()));

    if let Some(report) = store.last_report() {
        msg_info!(Message::SchemaStateDetected(format!("{:?}", report.state)));
    }
    if let Some(version) = store.schema_version().await? {
        msg_info!(Message::SchemaVersion(version));
    }

    let open: usize = snapshot.current_todo().values().map(|todos| todos.iter().filter(|todo| !todo.is_completed()).count()).sum();
    msg_print!(Message::StatusSummary(snapshot.list_category().len(), open));
    Ok(())
}
