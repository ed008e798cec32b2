//! Whole-file export and import with rollback.
//!
//! Both operations run on the worker thread against the gateway, so no other
//! statement can interleave with the close/write/reopen sequence.

use super::db::Db;
use super::migrations::{MigrationReport, SchemaManager};
use crate::libs::error::StoreResult;
use crate::libs::messages::Message;
use crate::{msg_info, msg_warning};

/// Serialized image of the open database, committed log pages included.
pub fn export_bytes(db: &Db) -> StoreResult<Vec<u8>> {
    db.serialize()
}

/// Opens the gateway and brings whatever file is there to the current schema.
pub fn open_and_migrate(db: &mut Db) -> StoreResult<MigrationReport> {
    db.open()?;
    SchemaManager::new().ensure_schema(db.conn_mut()?)
}

/// Replaces the database file with `replacement` and migrates it.
///
/// The current database is captured first when one is open. If writing,
/// opening or migrating the replacement fails, the captured bytes are written
/// back, reopened and migrated, and the original failure is still returned.
/// With nothing captured, or when the restore fails as well, the original
/// failure propagates and the gateway is left closed.
pub fn import_with_rollback(db: &mut Db, replacement: &[u8]) -> StoreResult<MigrationReport> {
    let backup = if db.is_open() { Some(db.serialize()?) } else { None };

    db.close();
    let attempt = db.write_file(replacement).and_then(|()| open_and_migrate(db));
    let err = match attempt {
        Ok(report) => return Ok(report),
        Err(err) => err,
    };

    msg_warning!(Message::ImportFailed(err.to_string()));
    db.close();
    let Some(backup) = backup else {
        return Err(err);
    };

    if let Err(restore_err) = db.write_file(&backup).and_then(|()| open_and_migrate(db)) {
        msg_warning!(Message::RestoreFailed(restore_err.to_string()));
        db.close();
        return Err(err);
    }
    msg_info!(Message::BackupRestored);
    Err(err)
}
