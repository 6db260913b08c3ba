use crate::backup::LEDGER;
use crate::commands::{Backend, Out};
use crate::error::{ErrorType, IntoResult};
use crate::session::Session;
use crate::Result;
use std::path::PathBuf;

/// Downloads the four tabs and saves them as `ledger.YYYY-MM-DD-NNN.json` in the backups
/// directory, removing the oldest files beyond `backup_copies`.
pub async fn backup(backend: &Backend, session: &Session) -> Result<Out<PathBuf>> {
    let mut ledger = backend.ledger().await?;
    let data = ledger.get_data(session).await.pub_result(ErrorType::Sheet)?;
    let path = backend
        .config()
        .backup()
        .save_json(LEDGER, &data)
        .await
        .pub_result(ErrorType::Config)?;
    Ok(Out::new(
        format!("Saved a backup of the ledger to {}", path.display()),
        path,
    ))
}
