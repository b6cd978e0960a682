//! Client validation against the store.
//!
//! Runs the field rules from `tallerplus-core` first, then the document and
//! phone uniqueness lookups, stopping at the first violation. Lookups run on
//! the caller's connection so they see the caller's transaction.

use sqlx::SqliteConnection;
use tallerplus_core::{ClientFields, ValidationError};

use crate::db;
use crate::services::ClientError;

/// Validate `fields` for a new client (`exclude = None`) or for an update of
/// client `exclude`, which is ignored when checking uniqueness.
pub async fn validate_client(
    conn: &mut SqliteConnection,
    fields: &ClientFields,
    exclude: Option<i64>,
) -> Result<(), ClientError> {
    fields.check()?;

    if let Some(document) = &fields.document {
        if db::clients::find_document_holder(conn, document, exclude)
            .await?
            .is_some()
        {
            return Err(ValidationError::DuplicateDocument(document.clone()).into());
        }
    }

    if let Some(phone) = &fields.phone {
        if db::clients::find_phone_holder(conn, phone, exclude)
            .await?
            .is_some()
        {
            return Err(ValidationError::DuplicatePhone(phone.clone()).into());
        }
    }

    Ok(())
}

/// Translate a unique-index violation on `documento` or `telefono` into the
/// matching rule error. Covers writers that raced past [`validate_client`].
pub fn duplicate_from_constraint(err: sqlx::Error, fields: &ClientFields) -> ClientError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("clients.documento") {
                let document = fields.document.clone().unwrap_or_default();
                return ValidationError::DuplicateDocument(document).into();
            }
            if message.contains("clients.telefono") {
                let phone = fields.phone.clone().unwrap_or_default();
                return ValidationError::DuplicatePhone(phone).into();
            }
        }
    }
    ClientError::Database(err)
}
