use crate::{
    libs::{dates::date_key, messages::Message, store::TodoStore, view::View},
    msg_info, msg_print,
};
use anyhow::Result;

pub async fn cmd(mut store: TodoStore) -> Result<()> {
    let snapshot = store.load().await?;
    let span = snapshot.date_span();

    let (Some(first), Some(last)) = (span.first(), span.last()) else {
        msg_info!(Message::CalendarEmpty);
        return Ok(());
    };

    msg_print!(Message::CalendarHeader(date_key(*first), date_key(*last)), true);
    View::calendar(&snapshot.calendar_todo(), &snapshot);
    Ok(())
}
