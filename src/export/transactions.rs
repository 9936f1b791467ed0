//! Raw transaction export (CSV, CRLF rows).

use super::csv_row;
use crate::error::{OnboardingError, Result};
use crate::schema::Transaction;
use crate::utils::format_amount;

pub const TRANSACTION_HEADER: [&str; 9] = [
    "Date",
    "Description",
    "Vendor",
    "Amount",
    "Type",
    "Account Number",
    "Account Name",
    "Source Document",
    "Category",
];

/// Encodes transactions, one CRLF-separated row each. Amounts are written as
/// unsigned magnitudes with two decimals; the direction is in the `Type`
/// column. Account number and name use the reviewed value, then the
/// suggested one, then an empty field.
///
/// An empty slice is an error: callers must not produce header-only files.
pub fn encode(transactions: &[Transaction]) -> Result<String> {
    if transactions.is_empty() {
        return Err(OnboardingError::NoTransactions);
    }

    let mut rows = Vec::with_capacity(transactions.len() + 1);
    rows.push(csv_row(TRANSACTION_HEADER));

    for tx in transactions {
        let date = tx.date.format("%Y-%m-%d").to_string();
        let amount = format_amount(tx.amount.abs());

        rows.push(csv_row([
            date.as_str(),
            tx.description.as_str(),
            tx.vendor.as_deref().unwrap_or(""),
            amount.as_str(),
            tx.transaction_type.as_str(),
            tx.account_number().unwrap_or(""),
            tx.account_name().unwrap_or(""),
            tx.document_name.as_deref().unwrap_or(""),
            tx.category.as_deref().unwrap_or(""),
        ]));
    }

    Ok(rows.join("\r\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_transactions_are_refused() {
        assert!(matches!(encode(&[]), Err(OnboardingError::NoTransactions)));
    }

    #[test]
    fn test_transaction_golden_output() {
        let mut rent = Transaction::new(date(2024, 1, 1), "January rent", dec!(1500), TransactionType::Debit)
            .with_vendor("Main St Properties, LLC");
        rent.suggested_account_number = Some("6060".into());
        rent.suggested_account_name = Some("Rent".into());
        rent.document_name = Some("jan_statement.pdf".into());
        rent.category = Some("Rent".into());

        let mut deposit =
            Transaction::new(date(2024, 1, 15), "Client \"A\" payment", dec!(2400.005), TransactionType::Credit);
        deposit.suggested_account_number = Some("4000".into());
        deposit.reviewed_account_number = Some("4100".into());
        deposit.reviewed_account_name = Some("Service Revenue".into());

        let expected = "Date,Description,Vendor,Amount,Type,Account Number,Account Name,Source Document,Category\r\n\
                        2024-01-01,January rent,\"Main St Properties, LLC\",1500.00,debit,6060,Rent,jan_statement.pdf,Rent\r\n\
                        2024-01-15,\"Client \"\"A\"\" payment\",,2400.01,credit,4100,Service Revenue,,";

        assert_eq!(encode(&[rent, deposit]).unwrap(), expected);
    }

    #[test]
    fn test_amount_is_written_as_magnitude() {
        let refund = Transaction::new(date(2024, 2, 1), "Refund", dec!(-12.345), TransactionType::Credit);
        let output = encode(&[refund]).unwrap();
        let row = output.split("\r\n").nth(1).unwrap();
        assert_eq!(row, "2024-02-01,Refund,,12.35,credit,,,,");
    }

    #[test]
    fn test_rows_are_crlf_separated_and_parse() {
        let transactions = vec![
            Transaction::new(date(2024, 3, 1), "Line\nbreak", dec!(1), TransactionType::Debit),
            Transaction::new(date(2024, 3, 2), "Second", dec!(2), TransactionType::Debit),
        ];
        let output = encode(&transactions).unwrap();
        assert_eq!(output.matches("\r\n").count(), 2);
        assert!(!output.ends_with("\r\n"));

        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Line\nbreak");
        assert_eq!(&rows[1][3], "2.00");
    }

    #[test]
    fn test_categorized_transaction_exports_its_account() {
        let tx: Transaction = serde_json::from_str(
            r#"{"date":"2024-01-15","description":"Rent","amount":1200,"type":"debit",
                "accountNumber":"6060","accountName":"Rent","documentName":"jan.pdf","category":"Rent"}"#,
        )
        .unwrap();
        let output = encode(&[tx]).unwrap();
        let row = output.split("\r\n").nth(1).unwrap();
        assert_eq!(row, "2024-01-15,Rent,,1200.00,debit,6060,Rent,jan.pdf,Rent");
    }
}
