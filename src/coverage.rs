use crate::config::ScoringPolicy;
use crate::schema::{ClassifiedDocument, DocumentCategory, Priority, Transaction};
use crate::utils::{months_in_span, YearMonth};
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub category: DocumentCategory,
    pub count: usize,
    /// Distinct years tagged on documents of this category, ascending.
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingFinding {
    pub category: DocumentCategory,
    pub reason: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_months: Option<Vec<String>>,
}

impl MissingFinding {
    fn new(category: DocumentCategory, priority: Priority, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
            priority,
            missing_months: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeCoverage {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    /// Calendar months between `earliest` and `latest` without a transaction, as `"Mon YYYY"`.
    pub gaps: Vec<String>,
    pub months_covered: usize,
    pub months_expected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub documents_received: Vec<CategoryInfo>,
    /// Sorted high, medium, low; emission order within a priority.
    pub documents_missing: Vec<MissingFinding>,
    pub date_range_coverage: DateRangeCoverage,
    pub completeness_score: u32,
}

impl CoverageReport {
    pub fn has_high_priority_findings(&self) -> bool {
        self.documents_missing
            .iter()
            .any(|f| f.priority == Priority::High)
    }
}

/// Priority of a finding for a category with no documents at all.
pub fn missing_category_priority(category: DocumentCategory) -> Priority {
    match category {
        DocumentCategory::BankStatement => Priority::High,
        DocumentCategory::Receipt | DocumentCategory::Invoice | DocumentCategory::TaxDocument => {
            Priority::Medium
        }
        DocumentCategory::Payroll | DocumentCategory::Contract | DocumentCategory::Other => {
            Priority::Low
        }
    }
}

fn missing_category_reason(category: DocumentCategory) -> String {
    let why = match category {
        DocumentCategory::BankStatement => {
            "Bank statements are required to extract and reconcile transactions."
        }
        DocumentCategory::Receipt => "Receipts substantiate business expenses.",
        DocumentCategory::Invoice => "Invoices document billed revenue and receivables.",
        DocumentCategory::TaxDocument => "Prior tax returns establish opening balances.",
        DocumentCategory::Payroll => "Payroll records are needed if the business has employees.",
        DocumentCategory::Contract => "Contracts help classify recurring revenue and obligations.",
        DocumentCategory::Other => "Loan agreements and similar records complete the picture.",
    };
    format!("{} were not found. {}", category.label(), why)
}

#[derive(Debug, Clone, Default)]
pub struct CoverageAnalyzer {
    policy: ScoringPolicy,
}

impl CoverageAnalyzer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Computes the coverage report. The result depends only on the arguments;
    /// `reference_date` stands in for "today".
    pub fn analyze(
        &self,
        documents: &[ClassifiedDocument],
        transactions: &[Transaction],
        reference_date: NaiveDate,
    ) -> CoverageReport {
        let documents_received = categories_received(documents);

        let mut findings = category_findings(documents, &documents_received, reference_date);
        findings.extend(year_gap_findings(documents, reference_date));
        findings.sort_by_key(|f| f.priority);

        let date_range_coverage = date_range_coverage(transactions);
        let completeness_score = completeness_score(&findings, &date_range_coverage, &self.policy);

        info!(
            "Coverage analysis: {} documents, {} transactions, {} findings, score {}",
            documents.len(),
            transactions.len(),
            findings.len(),
            completeness_score
        );

        CoverageReport {
            documents_received,
            documents_missing: findings,
            date_range_coverage,
            completeness_score,
        }
    }
}

/// Runs [`CoverageAnalyzer::analyze`] with the default scoring policy.
pub fn analyze(
    documents: &[ClassifiedDocument],
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> CoverageReport {
    CoverageAnalyzer::default().analyze(documents, transactions, reference_date)
}

fn categories_received(documents: &[ClassifiedDocument]) -> Vec<CategoryInfo> {
    DocumentCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let matching: Vec<&ClassifiedDocument> =
                documents.iter().filter(|d| d.category == category).collect();
            if matching.is_empty() {
                return None;
            }

            let years: BTreeSet<i32> = matching.iter().filter_map(|d| d.year).collect();
            Some(CategoryInfo {
                category,
                count: matching.len(),
                years: years.into_iter().collect(),
            })
        })
        .collect()
}

fn category_findings(
    documents: &[ClassifiedDocument],
    received: &[CategoryInfo],
    reference_date: NaiveDate,
) -> Vec<MissingFinding> {
    let mut findings = Vec::new();

    for category in DocumentCategory::ALL {
        if !received.iter().any(|info| info.category == category) {
            findings.push(MissingFinding::new(
                category,
                missing_category_priority(category),
                missing_category_reason(category),
            ));
        }
    }

    // Only checked when tax documents exist; a missing category is reported once above.
    let last_year = reference_date.year() - 1;
    let tax_documents: Vec<&ClassifiedDocument> = documents
        .iter()
        .filter(|d| d.category == DocumentCategory::TaxDocument)
        .collect();

    if !tax_documents.is_empty() && !tax_documents.iter().any(|d| d.year == Some(last_year)) {
        findings.push(MissingFinding::new(
            DocumentCategory::TaxDocument,
            Priority::Medium,
            format!(
                "No tax documents found for {}. Upload the most recent tax return.",
                last_year
            ),
        ));
    }

    findings
}

/// Earliest document year taken into account by the gap scan.
pub const EARLIEST_DOCUMENT_YEAR: i32 = 1900;

/// Whether a document year can be real: from [`EARLIEST_DOCUMENT_YEAR`] up to
/// the year after the reference date.
pub fn is_plausible_document_year(year: i32, reference_date: NaiveDate) -> bool {
    (EARLIEST_DOCUMENT_YEAR..=reference_date.year().saturating_add(1)).contains(&year)
}

/// One finding per year missing from the closed range spanned by the
/// document years. Needs at least two distinct years to say anything.
/// Implausible years are skipped so a mistagged document cannot widen the
/// range.
fn year_gap_findings(documents: &[ClassifiedDocument], reference_date: NaiveDate) -> Vec<MissingFinding> {
    let years: BTreeSet<i32> = documents
        .iter()
        .filter_map(|d| d.year)
        .filter(|&year| {
            let plausible = is_plausible_document_year(year, reference_date);
            if !plausible {
                warn!("Ignoring implausible document year {} in gap detection", year);
            }
            plausible
        })
        .collect();

    let (min_year, max_year) = match (years.first(), years.last()) {
        (Some(&min), Some(&max)) if years.len() >= 2 => (min, max),
        _ => {
            debug!(
                "Skipping year gap detection: {} distinct document years",
                years.len()
            );
            return Vec::new();
        }
    };

    (min_year..=max_year)
        .filter(|year| !years.contains(year))
        .map(|year| {
            MissingFinding::new(
                DocumentCategory::BankStatement,
                Priority::High,
                format!(
                    "No documents found for {}. There may be a gap in records.",
                    year
                ),
            )
        })
        .collect()
}

pub fn date_range_coverage(transactions: &[Transaction]) -> DateRangeCoverage {
    let earliest = transactions.iter().map(|t| t.date).min();
    let latest = transactions.iter().map(|t| t.date).max();

    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return DateRangeCoverage::default();
    };

    let covered: BTreeSet<YearMonth> = transactions.iter().map(|t| YearMonth::of(t.date)).collect();
    let span = months_in_span(earliest, latest);
    let gaps: Vec<String> = span
        .iter()
        .filter(|month| !covered.contains(*month))
        .map(|month| month.label())
        .collect();

    DateRangeCoverage {
        earliest: Some(earliest),
        latest: Some(latest),
        gaps,
        months_covered: covered.len(),
        months_expected: span.len(),
    }
}

/// 100, minus a penalty per finding weighted by priority, minus the share of
/// gap months scaled by `gap_weight` (rounded), floored at 0.
pub fn completeness_score(
    findings: &[MissingFinding],
    coverage: &DateRangeCoverage,
    policy: &ScoringPolicy,
) -> u32 {
    let finding_penalty: i64 = findings
        .iter()
        .map(|f| i64::from(policy.penalty(f.priority)))
        .sum();

    let gap_penalty = if coverage.months_expected > 0 {
        let ratio = coverage.gaps.len() as f64 / coverage.months_expected as f64;
        (ratio * policy.gap_weight).round() as i64
    } else {
        0
    };

    (100 - finding_penalty - gap_penalty).max(0) as u32
}
