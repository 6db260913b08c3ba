use crate::args::EntryArgs;
use crate::commands::{Backend, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{parse_date, Categories, EntryInput, EntryKind, NewEntry};
use crate::session::Session;
use crate::Result;
use anyhow::Context;
use chrono::Local;
use tracing::debug;

/// Validates `args` and appends them as a new row of the assets or liabilities tab.
///
/// The date is stored as the last day of its month, so adding a value on 2025-02-10 records the
/// February 2025 snapshot. Nothing is written when validation fails.
pub async fn add_entry(
    backend: &Backend,
    session: &Session,
    kind: EntryKind,
    args: &EntryArgs,
) -> Result<Out<NewEntry>> {
    let schema = backend.config().schema();
    session
        .check_writable(schema.multi_user())
        .pub_result(ErrorType::Request)?;
    let date = match args.date() {
        Some(s) => parse_date(s)
            .with_context(|| format!("Unable to understand the date '{s}', use YYYY-MM-DD"))
            .pub_result(ErrorType::Request)?,
        None => Local::now().date_naive(),
    };

    let mut ledger = backend.ledger().await?;
    let rows = ledger
        .read(kind.categories(), session)
        .await
        .pub_result(ErrorType::Sheet)?;
    let categories = Categories::from_rows(kind, &rows);

    let input = EntryInput {
        date,
        category: args.category().to_string(),
        name: args.name().to_string(),
        value: args.value().value(),
        notes: args.notes().to_string(),
    };
    let entry = NewEntry::validate(kind, &input, &categories, schema, session)
        .pub_result(ErrorType::Request)?;
    debug!("Appending {entry:?}");

    ledger
        .append(kind.entries(), session, entry.to_row(schema))
        .await
        .pub_result(ErrorType::Sheet)?;

    let message = format!(
        "Recorded {kind} '{}' of {} for {}",
        entry.name(),
        args.value().display(backend.config().currency()),
        entry.month().label()
    );
    Ok(Out::new(message, entry))
}
