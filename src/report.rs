use crate::chart_of_accounts::ChartSummary;
use crate::config::ReportPolicy;
use crate::coverage::CoverageReport;
use crate::schema::{Account, Priority, Transaction, TransactionType};
use crate::templates::Industry;
use crate::utils::round_money;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    pub industry: Industry,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorTotal {
    pub vendor: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub transaction_count: usize,
    /// Sum of credit amounts.
    pub total_income: Decimal,
    /// Sum of debit amounts.
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub average_transaction_size: Decimal,
    pub top_vendors: Vec<VendorTotal>,
    pub largest_transactions: Vec<Transaction>,
    /// Transactions with neither a reviewed nor a suggested account.
    pub unassigned_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Ready,
    NeedsReview,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingReport {
    pub client: ClientInfo,
    pub coverage: CoverageReport,
    pub transaction_summary: TransactionSummary,
    pub chart_summary: ChartSummary,
    pub suggestion_count: usize,
    pub overall_completeness_score: u32,
    pub status: ReportStatus,
    pub recommendations: Vec<Recommendation>,
}

/// Summarizes transactions. Income and expense are decided by the
/// transaction type alone, never by the account it is booked to.
pub fn summarize_transactions(
    transactions: &[Transaction],
    top_vendor_count: usize,
    largest_count: usize,
) -> TransactionSummary {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut total_magnitude = Decimal::ZERO;
    let mut vendors: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();

    for tx in transactions {
        let amount = tx.amount.abs();
        total_magnitude += amount;

        match tx.transaction_type {
            TransactionType::Credit => total_income += amount,
            TransactionType::Debit => total_expenses += amount,
        }

        if let Some(vendor) = tx.vendor_name() {
            let entry = vendors.entry(vendor).or_insert((Decimal::ZERO, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
    }

    let average_transaction_size = if transactions.is_empty() {
        Decimal::ZERO
    } else {
        round_money(total_magnitude / Decimal::from(transactions.len()))
    };

    let mut top_vendors: Vec<VendorTotal> = vendors
        .into_iter()
        .map(|(vendor, (total_amount, transaction_count))| VendorTotal {
            vendor: vendor.to_string(),
            total_amount,
            transaction_count,
        })
        .collect();
    top_vendors.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| b.transaction_count.cmp(&a.transaction_count))
            .then_with(|| a.vendor.cmp(&b.vendor))
    });
    top_vendors.truncate(top_vendor_count);

    let mut largest_transactions = transactions.to_vec();
    largest_transactions.sort_by(|a, b| b.amount.abs().cmp(&a.amount.abs()));
    largest_transactions.truncate(largest_count);

    TransactionSummary {
        transaction_count: transactions.len(),
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        average_transaction_size,
        top_vendors,
        largest_transactions,
        unassigned_count: transactions
            .iter()
            .filter(|t| t.account_number().is_none())
            .count(),
    }
}

/// `completeness_score - penalty` (floored at 0) when suggestions were offered
/// but the chart carries no custom account; otherwise the score unchanged.
pub fn overall_completeness_score(
    completeness_score: u32,
    custom_account_count: usize,
    suggestion_count: usize,
    penalty: u32,
) -> u32 {
    if custom_account_count == 0 && suggestion_count > 0 {
        completeness_score.saturating_sub(penalty)
    } else {
        completeness_score
    }
}

pub fn report_status(score: u32, has_high_priority_findings: bool, policy: &ReportPolicy) -> ReportStatus {
    if score >= policy.ready_threshold && !has_high_priority_findings {
        ReportStatus::Ready
    } else if score >= policy.review_threshold {
        ReportStatus::NeedsReview
    } else {
        ReportStatus::Incomplete
    }
}

fn recommendations(
    coverage: &CoverageReport,
    summary: &TransactionSummary,
    chart: &ChartSummary,
    suggestion_count: usize,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = coverage
        .documents_missing
        .iter()
        .map(|finding| Recommendation {
            priority: finding.priority,
            title: format!("Request {}", finding.category.label().to_lowercase()),
            detail: finding.reason.clone(),
        })
        .collect();

    let gaps = &coverage.date_range_coverage.gaps;
    if !gaps.is_empty() {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            title: "Fill transaction gaps".to_string(),
            detail: format!("No transactions were found for {}.", gaps.join(", ")),
        });
    }

    if chart.custom_accounts == 0 && suggestion_count > 0 {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            title: "Review suggested accounts".to_string(),
            detail: format!(
                "{} suggested accounts are awaiting review.",
                suggestion_count
            ),
        });
    }

    if summary.unassigned_count > 0 {
        recommendations.push(Recommendation {
            priority: Priority::Low,
            title: "Categorize transactions".to_string(),
            detail: format!(
                "{} transactions have no account assigned.",
                summary.unassigned_count
            ),
        });
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    policy: ReportPolicy,
}

impl ReportAggregator {
    pub fn new(policy: ReportPolicy) -> Self {
        Self { policy }
    }

    pub fn aggregate(
        &self,
        client: &ClientInfo,
        coverage: &CoverageReport,
        transactions: &[Transaction],
        accounts: &[Account],
        suggestion_count: usize,
    ) -> OnboardingReport {
        let transaction_summary = summarize_transactions(
            transactions,
            self.policy.top_vendor_count,
            self.policy.largest_transaction_count,
        );
        let chart_summary = ChartSummary::from_accounts(accounts);

        let overall_completeness_score = overall_completeness_score(
            coverage.completeness_score,
            chart_summary.custom_accounts,
            suggestion_count,
            self.policy.unreviewed_suggestion_penalty,
        );
        let status = report_status(
            overall_completeness_score,
            coverage.has_high_priority_findings(),
            &self.policy,
        );
        debug!(
            "Completeness {} adjusted to {} ({} custom accounts, {} suggestions)",
            coverage.completeness_score,
            overall_completeness_score,
            chart_summary.custom_accounts,
            suggestion_count
        );

        let recommendations =
            recommendations(coverage, &transaction_summary, &chart_summary, suggestion_count);

        info!(
            "Onboarding report for {}: score {}, status {:?}",
            client.name, overall_completeness_score, status
        );

        OnboardingReport {
            client: client.clone(),
            coverage: coverage.clone(),
            transaction_summary,
            chart_summary,
            suggestion_count,
            overall_completeness_score,
            status,
            recommendations,
        }
    }
}

/// Runs [`ReportAggregator::aggregate`] with the default report policy.
pub fn aggregate(
    client: &ClientInfo,
    coverage: &CoverageReport,
    transactions: &[Transaction],
    accounts: &[Account],
    suggestion_count: usize,
) -> OnboardingReport {
    ReportAggregator::default().aggregate(client, coverage, transactions, accounts, suggestion_count)
}
