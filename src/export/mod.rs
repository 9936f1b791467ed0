//! Encoders for the bookkeeping import dialects.
//!
//! Every encoder is a pure function of its input: the same accounts or
//! transactions always produce byte-identical text. Only the artifact
//! filename depends on a date, and that date is supplied by the caller.
//!
//! Row terminators differ on purpose: the account exporters join rows with
//! `\n`, the transaction exporter with `\r\n`. Downstream importers were
//! validated against exactly these bytes.

pub mod qbd;
pub mod qbo;
pub mod transactions;
pub mod xero;

use crate::error::{OnboardingError, Result};
use crate::schema::{Account, Transaction};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use qbd::{qbd_type, qbd_type_for, QbdEncoder, QBD_FALLBACK_TYPE};
pub use qbo::QboEncoder;
pub use xero::{xero_type, xero_type_for, XeroEncoder, XERO_FALLBACK_TYPE};

/// Encodes a chart of accounts into one import dialect.
pub trait AccountEncoder {
    fn encode(accounts: &[Account]) -> String;
}

/// Quotes a CSV field if and only if it contains a comma, a double quote,
/// `\r` or `\n`. Embedded quotes are doubled.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Inverse of [`escape_csv_field`].
pub fn unescape_csv_field(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

pub(crate) fn csv_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_csv_field)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Qbo,
    Qbd,
    Xero,
    Transactions,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Qbo | ExportFormat::Xero | ExportFormat::Transactions => "text/csv",
            ExportFormat::Qbd => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Qbd => "iif",
            ExportFormat::Qbo | ExportFormat::Xero | ExportFormat::Transactions => "csv",
        }
    }

    /// The artifact kind segment of the download filename.
    pub fn artifact_kind(&self) -> &'static str {
        match self {
            ExportFormat::Qbo => "QBO_CoA",
            ExportFormat::Qbd => "QBD_CoA",
            ExportFormat::Xero => "Xero_CoA",
            ExportFormat::Transactions => "Transactions",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Qbo => "qbo",
            ExportFormat::Qbd => "qbd",
            ExportFormat::Xero => "xero",
            ExportFormat::Transactions => "transactions",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

/// Keeps only `[A-Za-z0-9-_]`. Falls back to `"client"` when nothing survives.
pub fn sanitize_filename_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if sanitized.is_empty() {
        "client".to_string()
    } else {
        sanitized
    }
}

/// `<sanitized-name>_<ArtifactKind>_<YYYY-MM-DD>.<ext>`
pub fn artifact_filename(client_name: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_filename_component(client_name),
        format.artifact_kind(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Encodes a chart of accounts. An empty chart is refused rather than
/// exported as a header-only file.
pub fn export_chart(format: ExportFormat, accounts: &[Account]) -> Result<String> {
    if accounts.is_empty() {
        return Err(OnboardingError::EmptyChart);
    }

    let content = match format {
        ExportFormat::Qbo => QboEncoder::encode(accounts),
        ExportFormat::Qbd => QbdEncoder::encode(accounts),
        ExportFormat::Xero => XeroEncoder::encode(accounts),
        ExportFormat::Transactions => {
            return Err(OnboardingError::UnsupportedExport(format.to_string()))
        }
    };

    info!("Exported {} accounts as {}", accounts.len(), format);
    Ok(content)
}

pub fn export_transactions(transactions: &[Transaction]) -> Result<String> {
    let content = transactions::encode(transactions)?;
    info!("Exported {} transactions", transactions.len());
    Ok(content)
}

pub fn chart_artifact(
    client_name: &str,
    format: ExportFormat,
    accounts: &[Account],
    date: NaiveDate,
) -> Result<ExportArtifact> {
    let content = export_chart(format, accounts)?;
    Ok(ExportArtifact {
        filename: artifact_filename(client_name, format, date),
        mime_type: format.mime_type().to_string(),
        content,
    })
}

pub fn transactions_artifact(
    client_name: &str,
    transactions: &[Transaction],
    date: NaiveDate,
) -> Result<ExportArtifact> {
    let content = export_transactions(transactions)?;
    Ok(ExportArtifact {
        filename: artifact_filename(client_name, ExportFormat::Transactions, date),
        mime_type: ExportFormat::Transactions.mime_type().to_string(),
        content,
    })
}
