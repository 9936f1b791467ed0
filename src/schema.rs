use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level classification of an account.
///
/// Anything other than the five canonical names is kept verbatim in
/// [`AccountType::Other`] so a malformed account still reaches the encoders,
/// which map it to their fallback bucket instead of refusing the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
    Other(String),
}

impl AccountType {
    pub const CANONICAL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Income,
        AccountType::Expense,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expense => "Expense",
            AccountType::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, AccountType::Other(_))
    }

    /// Infers the conventional type from the leading digit of an account number
    /// (1 Asset, 2 Liability, 3 Equity, 4 Income, 5-7 Expense).
    ///
    /// The convention is advisory: callers log a mismatch, they never reject on it.
    pub fn from_account_number(number: &str) -> Option<AccountType> {
        match number.trim().chars().next()? {
            '1' => Some(AccountType::Asset),
            '2' => Some(AccountType::Liability),
            '3' => Some(AccountType::Equity),
            '4' => Some(AccountType::Income),
            '5' | '6' | '7' => Some(AccountType::Expense),
            _ => None,
        }
    }
}

impl From<String> for AccountType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asset" => AccountType::Asset,
            "liability" => AccountType::Liability,
            "equity" => AccountType::Equity,
            "income" => AccountType::Income,
            "expense" => AccountType::Expense,
            _ => AccountType::Other(raw),
        }
    }
}

impl From<&str> for AccountType {
    fn from(raw: &str) -> Self {
        AccountType::from(raw.to_string())
    }
}

impl From<AccountType> for String {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub number: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub detail_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl Account {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        detail_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            account_type,
            detail_type: detail_type.into(),
            description: description.into(),
            is_custom: false,
        }
    }

    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// Case-insensitive, whitespace-trimmed name used for duplicate detection.
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// An account proposed by the upstream classifier, after boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSuggestion {
    pub account: Account,
    pub reason: String,
    pub confidence: f64,
}

impl AccountSuggestion {
    pub fn new(account: Account, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            account: account.custom(),
            reason: reason.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Clamps an untrusted confidence value into `[0, 1]`. NaN becomes 0.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    BankStatement,
    Receipt,
    Invoice,
    TaxDocument,
    Payroll,
    Contract,
    Other,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 7] = [
        DocumentCategory::BankStatement,
        DocumentCategory::Receipt,
        DocumentCategory::Invoice,
        DocumentCategory::TaxDocument,
        DocumentCategory::Payroll,
        DocumentCategory::Contract,
        DocumentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::BankStatement => "bank_statement",
            DocumentCategory::Receipt => "receipt",
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::TaxDocument => "tax_document",
            DocumentCategory::Payroll => "payroll",
            DocumentCategory::Contract => "contract",
            DocumentCategory::Other => "other",
        }
    }

    /// Human readable plural used in findings and recommendations.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::BankStatement => "Bank statements",
            DocumentCategory::Receipt => "Receipts",
            DocumentCategory::Invoice => "Invoices",
            DocumentCategory::TaxDocument => "Tax documents",
            DocumentCategory::Payroll => "Payroll records",
            DocumentCategory::Contract => "Contracts",
            DocumentCategory::Other => "Other supporting documents",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a finding or recommendation. Orders `High < Medium < Low`, so an
/// ascending sort puts the most urgent items first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedDocument {
    pub category: DocumentCategory,
    pub year: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_metadata")]
    pub metadata: BTreeMap<String, MetadataValue>,
}

/// A scalar document attribute. Nested arrays and objects are not metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(MetadataValue::Null),
            serde_json::Value::Bool(b) => Some(MetadataValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(MetadataValue::Integer)
                .or_else(|| n.as_f64().map(MetadataValue::Float)),
            serde_json::Value::String(s) => Some(MetadataValue::Text(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

/// Keeps scalar metadata entries and drops nested values with a warning, so
/// one odd attribute from the classifier does not reject the whole document.
fn scalar_metadata<'de, D>(deserializer: D) -> Result<BTreeMap<String, MetadataValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match MetadataValue::from_json(value) {
            Some(scalar) => Some((key, scalar)),
            None => {
                warn!("Dropping non-scalar document metadata '{}'", key);
                None
            }
        })
        .collect())
}

impl ClassifiedDocument {
    pub fn new(category: DocumentCategory, year: Option<i32>) -> Self {
        Self {
            category,
            year,
            name: None,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted transaction. `amount` is an unsigned magnitude; the direction
/// of the monetary effect lives in `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub vendor: Option<String>,
    pub suggested_account_number: Option<String>,
    pub suggested_account_name: Option<String>,
    /// Also read from a plain `accountNumber` key, the shape an already
    /// categorized transaction arrives in.
    #[serde(alias = "accountNumber")]
    pub reviewed_account_number: Option<String>,
    #[serde(alias = "accountName")]
    pub reviewed_account_name: Option<String>,
    pub document_name: Option<String>,
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            transaction_type,
            vendor: None,
            suggested_account_number: None,
            suggested_account_name: None,
            reviewed_account_number: None,
            reviewed_account_name: None,
            document_name: None,
            category: None,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Reviewed account number, falling back to the suggested one.
    pub fn account_number(&self) -> Option<&str> {
        first_present(&self.reviewed_account_number, &self.suggested_account_number)
    }

    /// Reviewed account name, falling back to the suggested one.
    pub fn account_name(&self) -> Option<&str> {
        first_present(&self.reviewed_account_name, &self.suggested_account_name)
    }

    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

fn first_present<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    primary
        .as_deref()
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.as_deref().filter(|v| !v.is_empty()))
}
