//! # CoA Onboarding
//!
//! The normalization and export core of a client-onboarding workflow: it
//! turns classified documents, extracted transactions and AI-suggested
//! accounts into a reconciled Chart of Accounts, a completeness report and
//! bookkeeping import files.
//!
//! ## Core Concepts
//!
//! - **Template Store**: industry-keyed base charts, validated once and shared by reference
//! - **Reconciliation**: base template plus suggested accounts, duplicates dropped by number or name
//! - **Coverage**: missing document categories, year gaps, month gaps and a 0-100 completeness score
//! - **Encoders**: QuickBooks Online CSV, QuickBooks Desktop IIF, Xero CSV and a raw transaction CSV
//! - **Report**: transaction statistics, chart summary, status and ranked recommendations
//!
//! Everything is a pure function of its inputs. There is no I/O, no clock and
//! no shared mutable state; the only date the engine sees is the one passed in.
//!
//! ## Example
//!
//! ```rust,ignore
//! use coa_onboarding::*;
//! use chrono::NaiveDate;
//!
//! let engine = OnboardingEngine::with_defaults();
//! let suggestions = parse_suggestions(ai_response_json)?;
//! let chart = engine.reconcile("restaurant", &suggestions)?;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let report = engine.report(&client, &documents, &transactions, &chart, suggestions.len(), today)?;
//! let iif = engine.export_chart(&client.name, ExportFormat::Qbd, &chart, today)?;
//! ```

pub mod chart_of_accounts;
pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod report;
pub mod schema;
pub mod templates;
pub mod utils;

pub use chart_of_accounts::{
    parse_suggestions, rank_suggestions, reconcile, AccountReconciler, ChartSummary,
    ReconciledChart, SuggestedAccountEntry, SuggestionPayload,
};
pub use config::{EngineConfig, ReportPolicy, ScoringPolicy};
pub use coverage::{
    analyze, CategoryInfo, CoverageAnalyzer, CoverageReport, DateRangeCoverage, MissingFinding,
};
pub use error::{OnboardingError, Result};
pub use export::{
    artifact_filename, escape_csv_field, export_chart, export_transactions, unescape_csv_field,
    AccountEncoder, ExportArtifact, ExportFormat, QbdEncoder, QboEncoder, XeroEncoder,
};
pub use report::{
    aggregate, ClientInfo, OnboardingReport, Recommendation, ReportAggregator, ReportStatus,
    TransactionSummary, VendorTotal,
};
pub use schema::*;
pub use templates::{Industry, TemplateStore};
pub use utils::format_amount;

use chrono::NaiveDate;
use log::{debug, info, warn};

/// Templates and policy bundled behind one handle. Build it once at startup
/// and share it; every method takes `&self` and touches no mutable state.
#[derive(Debug, Clone, Default)]
pub struct OnboardingEngine {
    templates: TemplateStore,
    config: EngineConfig,
}

impl OnboardingEngine {
    pub fn new(templates: TemplateStore, config: EngineConfig) -> Result<Self> {
        templates.validate()?;
        config.validate()?;
        Ok(Self { templates, config })
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reconcile(
        &self,
        industry: &str,
        suggestions: &[AccountSuggestion],
    ) -> Result<ReconciledChart> {
        AccountReconciler::new(&self.templates).reconcile(industry, suggestions)
    }

    pub fn analyze(
        &self,
        documents: &[ClassifiedDocument],
        transactions: &[Transaction],
        reference_date: NaiveDate,
    ) -> CoverageReport {
        CoverageAnalyzer::new(self.config.scoring.clone()).analyze(
            documents,
            transactions,
            reference_date,
        )
    }

    pub fn report(
        &self,
        client: &ClientInfo,
        documents: &[ClassifiedDocument],
        transactions: &[Transaction],
        chart: &ReconciledChart,
        suggestion_count: usize,
        reference_date: NaiveDate,
    ) -> Result<OnboardingReport> {
        validate_transactions(transactions)?;

        info!(
            "Building onboarding report for {} ({})",
            client.name, client.industry
        );

        let coverage = self.analyze(documents, transactions, reference_date);
        Ok(ReportAggregator::new(self.config.report.clone()).aggregate(
            client,
            &coverage,
            transactions,
            &chart.accounts,
            suggestion_count,
        ))
    }

    pub fn export_chart(
        &self,
        client_name: &str,
        format: ExportFormat,
        chart: &ReconciledChart,
        date: NaiveDate,
    ) -> Result<ExportArtifact> {
        export::chart_artifact(client_name, format, &chart.accounts, date)
    }

    pub fn export_transactions(
        &self,
        client_name: &str,
        transactions: &[Transaction],
        date: NaiveDate,
    ) -> Result<ExportArtifact> {
        validate_transactions(transactions)?;
        export::transactions_artifact(client_name, transactions, date)
    }
}

/// Boundary check for extracted transactions: amounts are magnitudes and
/// must not be negative. A blank description is only logged; the row is
/// still reported and exported.
pub fn validate_transactions(transactions: &[Transaction]) -> Result<()> {
    for (index, tx) in transactions.iter().enumerate() {
        if tx.amount.is_sign_negative() && !tx.amount.is_zero() {
            return Err(OnboardingError::InvalidTransaction {
                index,
                details: format!(
                    "amount {} is negative; direction belongs in the transaction type",
                    tx.amount
                ),
            });
        }

        if tx.description.trim().is_empty() {
            warn!("Transaction #{} on {} has an empty description", index, tx.date);
        }
    }

    debug!("Validated {} transactions", transactions.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let transactions = vec![
            Transaction::new(date(2024, 1, 1), "Ok", dec!(5), TransactionType::Debit),
            Transaction::new(date(2024, 1, 2), "Refund", dec!(-5), TransactionType::Credit),
        ];
        let err = validate_transactions(&transactions).unwrap_err();
        assert!(matches!(err, OnboardingError::InvalidTransaction { index: 1, .. }));
    }

    #[test]
    fn test_blank_description_is_exported() {
        let engine = OnboardingEngine::with_defaults();
        let transactions = vec![
            Transaction::new(date(2024, 1, 1), "  ", dec!(5), TransactionType::Debit),
            Transaction::new(date(2024, 1, 2), "Coffee", dec!(4.5), TransactionType::Debit),
        ];
        assert!(validate_transactions(&transactions).is_ok());

        let artifact = engine
            .export_transactions("Acme", &transactions, date(2024, 2, 1))
            .unwrap();
        let rows: Vec<&str> = artifact.content.split("\r\n").collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "2024-01-01,  ,,5.00,debit,,,,");

        let chart = engine.reconcile("general", &[]).unwrap();
        let client = ClientInfo {
            name: "Acme".to_string(),
            industry: Industry::General,
            contact_email: None,
        };
        let report = engine
            .report(&client, &[], &transactions, &chart, 0, date(2024, 2, 1))
            .unwrap();
        assert_eq!(report.transaction_summary.transaction_count, 2);
    }

    #[test]
    fn test_engine_export_refuses_invalid_transactions() {
        let engine = OnboardingEngine::with_defaults();
        let transactions = vec![Transaction::new(date(2024, 1, 2), "Refund", dec!(-5), TransactionType::Credit)];
        assert!(engine
            .export_transactions("Acme", &transactions, date(2024, 2, 1))
            .is_err());
        assert!(matches!(
            engine.export_transactions("Acme", &[], date(2024, 2, 1)),
            Err(OnboardingError::NoTransactions)
        ));
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = EngineConfig {
            report: ReportPolicy {
                ready_threshold: 30,
                ..ReportPolicy::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(
            OnboardingEngine::new(TemplateStore::builtin(), config),
            Err(OnboardingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_engine_reconcile_and_export() {
        let engine = OnboardingEngine::with_defaults();
        let suggestion = AccountSuggestion::new(
            Account::new("6400", "Linen Service", AccountType::Expense, "", "Weekly linen"),
            "Recurring vendor",
            0.8,
        );
        let chart = engine.reconcile("restaurant", &[suggestion]).unwrap();
        assert_eq!(chart.custom_count(), 1);

        let artifact = engine
            .export_chart("Bella's Bistro", ExportFormat::Xero, &chart, date(2024, 5, 1))
            .unwrap();
        assert_eq!(artifact.filename, "BellasBistro_Xero_CoA_2024-05-01.csv");
        assert!(artifact.content.ends_with("6400,Linen Service,EXPENSE,Weekly linen"));
    }
}
