use chrono::NaiveDate;
use coa_onboarding::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn documents() -> Vec<ClassifiedDocument> {
    serde_json::from_str(
        r#"[
            {"category": "bank_statement", "year": 2021, "metadata": {"bank": "First National"}},
            {"category": "bank_statement", "year": 2024, "metadata": {}},
            {"category": "receipt", "year": 2024, "metadata": {}},
            {"category": "invoice", "year": 2024, "metadata": {}},
            {"category": "tax_document", "year": 2023, "metadata": {"form": "1120-S"}},
            {"category": "payroll", "year": null, "metadata": {}}
        ]"#,
    )
    .unwrap()
}

fn transactions() -> Vec<Transaction> {
    serde_json::from_str(
        r#"[
            {"date": "2024-01-03", "description": "Sysco order", "amount": 1840.25, "type": "debit",
             "vendor": "Sysco", "suggestedAccountNumber": "5010", "suggestedAccountName": "Food Costs",
             "documentName": "jan.pdf", "category": "Food"},
            {"date": "2024-01-31", "description": "Square deposit", "amount": 9200, "type": "credit",
             "vendor": "Square", "suggestedAccountNumber": "4000", "reviewedAccountNumber": "4010",
             "reviewedAccountName": "Food Sales", "documentName": "jan.pdf"},
            {"date": "2024-03-01", "description": "Rent, March", "amount": 3500, "type": "debit",
             "vendor": "Harbor Realty"},
            {"date": "2024-03-15", "description": "Sysco order", "amount": 1210.5, "type": "debit",
             "vendor": "Sysco", "suggestedAccountNumber": "5010", "suggestedAccountName": "Food Costs"}
        ]"#,
    )
    .unwrap()
}

const AI_RESPONSE: &str = r#"{
    "suggestions": [
        {"number": "6400", "name": "Linen Service", "type": "Expense",
         "detailType": "Office/General Administrative Expenses", "description": "Weekly linen, aprons",
         "reason": "Recurring vendor on bank statements", "confidence": 0.82},
        {"number": "6499", "name": "food sales", "type": "Income", "reason": "duplicate", "confidence": 0.9},
        {"number": "6410", "name": "Music Licensing", "type": "Expense", "confidence": 2.5},
        {"name": "No number", "type": "Expense", "confidence": 0.5}
    ]
}"#;

fn client() -> ClientInfo {
    ClientInfo {
        name: "Bella's Bistro, LLC".to_string(),
        industry: Industry::Restaurant,
        contact_email: Some("owner@bellas.example".to_string()),
    }
}

#[test]
fn test_end_to_end_onboarding() {
    let engine = OnboardingEngine::with_defaults();
    let suggestions = parse_suggestions(AI_RESPONSE).unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[2].confidence, 1.0);

    let chart = engine.reconcile("restaurant", &suggestions).unwrap();
    let base_len = engine
        .templates()
        .accounts(Industry::Restaurant)
        .unwrap()
        .len();
    assert_eq!(chart.accounts.len(), base_len + 2);
    assert_eq!(chart.rejected_count, 1);

    let today = date(2024, 6, 1);
    let report = engine
        .report(&client(), &documents(), &transactions(), &chart, suggestions.len(), today)
        .unwrap();

    // Missing: contract (low), other (low), plus the 2022 year gap (high).
    let missing = &report.coverage.documents_missing;
    assert_eq!(missing.len(), 3);
    assert_eq!(missing[0].priority, Priority::High);
    assert!(missing[0].reason.contains("2022"));

    let range = &report.coverage.date_range_coverage;
    assert_eq!(range.earliest, Some(date(2024, 1, 3)));
    assert_eq!(range.latest, Some(date(2024, 3, 15)));
    assert_eq!(range.gaps, vec!["Feb 2024".to_string()]);
    assert_eq!(range.months_expected, 3);
    assert_eq!(range.months_covered, 2);

    // 100 - 20 - 5 - 5 - round(1/3 * 30)
    assert_eq!(report.coverage.completeness_score, 60);
    assert_eq!(report.overall_completeness_score, 60);
    assert_eq!(report.status, ReportStatus::NeedsReview);

    let summary = &report.transaction_summary;
    assert_eq!(summary.total_income, dec!(9200));
    assert_eq!(summary.total_expenses, dec!(6550.75));
    assert_eq!(summary.net_income, dec!(2649.25));
    assert_eq!(summary.top_vendors[0].vendor, "Square");
    assert_eq!(summary.unassigned_count, 1);
    assert_eq!(report.chart_summary.custom_accounts, 2);

    assert_eq!(report.recommendations[0].priority, Priority::High);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.title == "Fill transaction gaps" && r.detail.contains("Feb 2024")));
}

#[test]
fn test_exports_are_deterministic_and_well_formed() {
    let engine = OnboardingEngine::with_defaults();
    let suggestions = parse_suggestions(AI_RESPONSE).unwrap();
    let chart = engine.reconcile("restaurant", &suggestions).unwrap();
    let today = date(2024, 6, 1);

    for format in [ExportFormat::Qbo, ExportFormat::Qbd, ExportFormat::Xero] {
        let first = engine.export_chart(&client().name, format, &chart, today).unwrap();
        let second = engine.export_chart(&client().name, format, &chart, today).unwrap();
        assert_eq!(first, second);
        assert!(first.filename.starts_with("BellasBistroLLC_"));
        assert!(first.filename.ends_with(&format!("_2024-06-01.{}", format.extension())));
        assert_eq!(first.content.lines().count(), chart.accounts.len() + 1);
    }

    let qbo = engine.export_chart("x", ExportFormat::Qbo, &chart, today).unwrap();
    let mut reader = csv::Reader::from_reader(qbo.content.as_bytes());
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), chart.accounts.len());
    let linen = records.iter().find(|r| &r[4] == "6400").unwrap();
    assert_eq!(&linen[3], "Weekly linen, aprons");

    let iif = engine.export_chart("x", ExportFormat::Qbd, &chart, today).unwrap();
    assert_eq!(iif.mime_type, "text/plain");
    assert!(iif.content.starts_with("!ACCNT\tNAME\tACCNTTYPE\tDESC\tACCNUM\n"));
    assert!(iif.content.contains("ACCNT\tFood Sales\tINC\tDine-in and takeout food sales\t4010"));

    let xero = engine.export_chart("x", ExportFormat::Xero, &chart, today).unwrap();
    assert!(xero.content.contains("\n1000,Business Checking,CURRENT,Primary operating bank account\n"));
}

#[test]
fn test_transaction_export_end_to_end() {
    let engine = OnboardingEngine::with_defaults();
    let artifact = engine
        .export_transactions(&client().name, &transactions(), date(2024, 6, 1))
        .unwrap();

    assert_eq!(artifact.filename, "BellasBistroLLC_Transactions_2024-06-01.csv");
    let rows: Vec<&str> = artifact.content.split("\r\n").collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows[2],
        "2024-01-31,Square deposit,Square,9200.00,credit,4010,Food Sales,jan.pdf,"
    );
    assert_eq!(
        rows[3],
        "2024-03-01,\"Rent, March\",Harbor Realty,3500.00,debit,,,,"
    );

    let mut reader = csv::Reader::from_reader(artifact.content.as_bytes());
    let amounts: Vec<Decimal> = reader
        .records()
        .map(|r| r.unwrap()[3].parse::<Decimal>().unwrap())
        .collect();
    assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec!(15750.75));
}

#[test]
fn test_analysis_is_stable_across_calls() {
    let engine = OnboardingEngine::with_defaults();
    let today = date(2024, 6, 1);

    let first = serde_json::to_string(&engine.analyze(&documents(), &transactions(), today)).unwrap();
    let second = serde_json::to_string(&engine.analyze(&documents(), &transactions(), today)).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("\"completenessScore\":60"));
}

#[test]
fn test_unreviewed_suggestions_lower_the_overall_score() {
    let engine = OnboardingEngine::with_defaults();
    let chart = engine.reconcile("restaurant", &[]).unwrap();
    let report = engine
        .report(&client(), &documents(), &transactions(), &chart, 4, date(2024, 6, 1))
        .unwrap();

    assert_eq!(report.coverage.completeness_score, 60);
    assert_eq!(report.overall_completeness_score, 50);
    assert_eq!(report.status, ReportStatus::NeedsReview);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.title == "Review suggested accounts"));
}

#[test]
fn test_unknown_industry_surfaces_single_error() {
    let engine = OnboardingEngine::with_defaults();
    let err = engine.reconcile("bakery", &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown industry 'bakery': expected one of general, restaurant, contractor, professional-services, retail"
    );
}

#[test]
fn test_custom_policy_from_json() {
    let config = EngineConfig::from_json(
        r#"{"scoring": {"gapWeight": 0}, "report": {"readyThreshold": 60, "reviewThreshold": 40}}"#,
    )
    .unwrap();
    let engine = OnboardingEngine::new(TemplateStore::builtin(), config).unwrap();

    let chart = engine.reconcile("restaurant", &[]).unwrap();
    let report = engine
        .report(&client(), &documents(), &transactions(), &chart, 0, date(2024, 6, 1))
        .unwrap();

    // No gap penalty: 100 - 20 - 5 - 5; the high year-gap finding blocks "ready".
    assert_eq!(report.overall_completeness_score, 70);
    assert_eq!(report.status, ReportStatus::NeedsReview);
}
