use crate::error::{OnboardingError, Result};
use crate::schema::{clamp_confidence, Account, AccountSuggestion, AccountType};
use crate::templates::{validate_template, Industry, TemplateStore};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One account proposed by the classifier, exactly as it arrives over the wire.
/// This struct is serialized to JSON Schema and passed upstream.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAccountEntry {
    #[schemars(
        description = "Account number. Leading digit conventionally encodes the type: 1 Asset, 2 Liability, 3 Equity, 4 Income, 5-7 Expense."
    )]
    pub number: String,

    #[schemars(description = "Account name as it should appear in the bookkeeping system")]
    pub name: String,

    #[serde(rename = "type")]
    #[schemars(description = "One of Asset, Liability, Equity, Income, Expense")]
    pub account_type: String,

    #[serde(default)]
    #[schemars(description = "QuickBooks detail type, e.g. 'Office/General Administrative Expenses'")]
    pub detail_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[schemars(description = "Why this account is needed, citing the documents or transactions that motivated it")]
    pub reason: String,

    #[schemars(description = "Confidence between 0.0 and 1.0")]
    pub confidence: f64,
}

impl SuggestedAccountEntry {
    /// Converts a wire entry into a validated suggestion, or `None` when a
    /// required field is blank.
    pub fn into_suggestion(self) -> Option<AccountSuggestion> {
        let number = self.number.trim().to_string();
        let name = self.name.trim().to_string();
        if number.is_empty() || name.is_empty() {
            return None;
        }

        let account = Account::new(
            number,
            name,
            AccountType::from(self.account_type),
            self.detail_type,
            self.description,
        );
        Some(AccountSuggestion::new(account, self.reason, self.confidence))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionPayload {
    #[schemars(description = "Accounts to add on top of the industry template. Do not repeat template accounts.")]
    pub suggestions: Vec<SuggestedAccountEntry>,
}

impl SuggestionPayload {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SuggestionPayload)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Strictly parses an upstream suggestion response.
///
/// Accepts either `{"suggestions": [...]}` or a bare array. Entries that do
/// not match [`SuggestedAccountEntry`] or have a blank number/name are dropped
/// with a warning; only a payload that is not a list at all is an error.
pub fn parse_suggestions(json: &str) -> Result<Vec<AccountSuggestion>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut map) => match map.remove("suggestions") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => {
                return Err(OnboardingError::InvalidSuggestionPayload(
                    "expected a 'suggestions' array".to_string(),
                ))
            }
        },
        other => {
            return Err(OnboardingError::InvalidSuggestionPayload(format!(
                "expected an array or object, got {}",
                other
            )))
        }
    };

    let total = entries.len();
    let suggestions: Vec<AccountSuggestion> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            match serde_json::from_value::<SuggestedAccountEntry>(entry) {
                Ok(entry) => {
                    let suggestion = entry.into_suggestion();
                    if suggestion.is_none() {
                        warn!("Dropping suggestion #{}: blank number or name", idx);
                    }
                    suggestion
                }
                Err(e) => {
                    warn!("Dropping malformed suggestion #{}: {}", idx, e);
                    None
                }
            }
        })
        .collect();

    debug!(
        "Parsed {} of {} suggested accounts",
        suggestions.len(),
        total
    );

    Ok(suggestions)
}

/// Sorts suggestions by confidence, highest first, for display.
/// Equal confidences keep their input order.
pub fn rank_suggestions(suggestions: &[AccountSuggestion]) -> Vec<AccountSuggestion> {
    let mut ranked = suggestions.to_vec();
    ranked.sort_by(|a, b| {
        clamp_confidence(b.confidence).total_cmp(&clamp_confidence(a.confidence))
    });
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledChart {
    pub industry: Industry,
    pub accounts: Vec<Account>,
    pub rejected_count: usize,
}

impl ReconciledChart {
    pub fn custom_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(|a| a.is_custom)
    }

    pub fn custom_count(&self) -> usize {
        self.custom_accounts().count()
    }

    /// Discards custom accounts a reviewer rejected. Base accounts are never
    /// removed. Returns how many accounts were discarded.
    pub fn apply_review(&mut self, rejected_numbers: &[&str]) -> usize {
        let rejected: HashSet<&str> = rejected_numbers.iter().map(|n| n.trim()).collect();
        let before = self.accounts.len();

        self.accounts
            .retain(|a| !(a.is_custom && rejected.contains(a.number.trim())));

        let removed = before - self.accounts.len();
        self.rejected_count += removed;
        removed
    }

    pub fn summary(&self) -> ChartSummary {
        ChartSummary::from_accounts(&self.accounts)
    }
}

pub struct AccountReconciler<'a> {
    templates: &'a TemplateStore,
}

impl<'a> AccountReconciler<'a> {
    pub fn new(templates: &'a TemplateStore) -> Self {
        Self { templates }
    }

    pub fn reconcile(
        &self,
        industry: &str,
        suggestions: &[AccountSuggestion],
    ) -> Result<ReconciledChart> {
        let base = self.templates.accounts_for_key(industry)?;
        reconcile(industry, base, suggestions)
    }
}

/// Merges a base template with suggested accounts.
///
/// Base accounts come first, followed by accepted suggestions in input
/// order. A suggestion is rejected when its number or its case-insensitive
/// name matches an account already in the chart, or when either is blank.
pub fn reconcile(
    industry: &str,
    base_accounts: &[Account],
    suggestions: &[AccountSuggestion],
) -> Result<ReconciledChart> {
    let industry: Industry = industry.parse()?;
    validate_template(base_accounts)?;

    let mut numbers: HashSet<String> = base_accounts
        .iter()
        .map(|a| a.number.trim().to_string())
        .collect();
    let mut names: HashSet<String> = base_accounts.iter().map(Account::name_key).collect();

    let mut accounts = base_accounts.to_vec();
    let mut rejected_count = 0;

    for suggestion in suggestions {
        let account = &suggestion.account;
        let number = account.number.trim();
        let name_key = account.name_key();

        if number.is_empty() || name_key.is_empty() {
            warn!("Rejecting suggestion with blank number or name: {:?}", account);
            rejected_count += 1;
            continue;
        }

        if numbers.contains(number) || names.contains(&name_key) {
            debug!(
                "Dropping duplicate suggestion {} '{}'",
                account.number, account.name
            );
            rejected_count += 1;
            continue;
        }

        match AccountType::from_account_number(number) {
            Some(expected) if expected != account.account_type => debug!(
                "Suggested account {} '{}' is typed {} but its number suggests {}",
                number, account.name, account.account_type, expected
            ),
            _ => {}
        }

        numbers.insert(number.to_string());
        names.insert(name_key);

        let mut accepted = account.clone().custom();
        accepted.number = number.to_string();
        accounts.push(accepted);
    }

    info!(
        "Reconciled {} chart: {} base accounts, {} accepted, {} rejected",
        industry,
        base_accounts.len(),
        accounts.len() - base_accounts.len(),
        rejected_count
    );

    Ok(ReconciledChart {
        industry,
        accounts,
        rejected_count,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    pub total_accounts: usize,
    pub custom_accounts: usize,
    pub accounts_by_type: BTreeMap<String, usize>,
}

impl ChartSummary {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let mut accounts_by_type = BTreeMap::new();
        for account in accounts {
            *accounts_by_type
                .entry(account.account_type.to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_accounts: accounts.len(),
            custom_accounts: accounts.iter().filter(|a| a.is_custom).count(),
            accounts_by_type,
        }
    }
}
