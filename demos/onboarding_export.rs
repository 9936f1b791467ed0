use chrono::NaiveDate;
use coa_onboarding::*;
use rust_decimal::Decimal;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let engine = OnboardingEngine::with_defaults();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid date")?;

    let suggestions = parse_suggestions(
        r#"{"suggestions": [
            {"number": "6400", "name": "Linen Service", "type": "Expense",
             "description": "Weekly linen and aprons", "reason": "Recurring vendor", "confidence": 0.82}
        ]}"#,
    )?;

    println!("Suggested accounts, most confident first:");
    for suggestion in rank_suggestions(&suggestions) {
        println!(
            "  {} {} ({:.0}%): {}",
            suggestion.account.number,
            suggestion.account.name,
            suggestion.confidence * 100.0,
            suggestion.reason
        );
    }

    let chart = engine.reconcile("restaurant", &suggestions)?;
    println!(
        "\nChart: {} accounts ({} custom, {} rejected)",
        chart.accounts.len(),
        chart.custom_count(),
        chart.rejected_count
    );

    let documents = vec![
        ClassifiedDocument::new(DocumentCategory::BankStatement, Some(2022)),
        ClassifiedDocument::new(DocumentCategory::BankStatement, Some(2024)),
        ClassifiedDocument::new(DocumentCategory::Receipt, Some(2024)),
        ClassifiedDocument::new(DocumentCategory::TaxDocument, Some(2023)),
    ];

    let mut deposit = Transaction::new(
        NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("invalid date")?,
        "Square deposit",
        Decimal::new(920000, 2),
        TransactionType::Credit,
    )
    .with_vendor("Square");
    deposit.suggested_account_number = Some("4010".to_string());
    deposit.suggested_account_name = Some("Food Sales".to_string());

    let supplies = Transaction::new(
        NaiveDate::from_ymd_opt(2024, 3, 4).ok_or("invalid date")?,
        "Sysco order",
        Decimal::new(184025, 2),
        TransactionType::Debit,
    )
    .with_vendor("Sysco");

    let transactions = vec![deposit, supplies];

    let client = ClientInfo {
        name: "Bella's Bistro".to_string(),
        industry: Industry::Restaurant,
        contact_email: None,
    };
    let report = engine.report(
        &client,
        &documents,
        &transactions,
        &chart,
        suggestions.len(),
        today,
    )?;

    println!(
        "\nCompleteness: {} ({:?})",
        report.overall_completeness_score, report.status
    );
    for recommendation in &report.recommendations {
        println!(
            "  [{:?}] {}: {}",
            recommendation.priority, recommendation.title, recommendation.detail
        );
    }

    for format in [ExportFormat::Qbo, ExportFormat::Qbd, ExportFormat::Xero] {
        let artifact = engine.export_chart(&client.name, format, &chart, today)?;
        println!(
            "\n{} ({}, {} bytes)",
            artifact.filename,
            artifact.mime_type,
            artifact.content.len()
        );
    }

    let export = engine.export_transactions(&client.name, &transactions, today)?;
    println!("\n{}:\n{}", export.filename, export.content);

    println!("\n{}", serde_json::to_string_pretty(&report.transaction_summary)?);

    Ok(())
}
