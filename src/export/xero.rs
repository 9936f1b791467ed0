//! Xero chart of accounts import (CSV).

use super::{csv_row, AccountEncoder};
use crate::schema::{Account, AccountType};

pub const XERO_HEADER: [&str; 4] = ["*Code", "*Name", "*Type", "Description"];

/// Xero account type used for anything outside the five canonical types.
pub const XERO_FALLBACK_TYPE: &str = "EXPENSE";

pub fn xero_type(account_type: &AccountType) -> &'static str {
    match account_type {
        AccountType::Asset => "CURRENT",
        AccountType::Liability => "CURRLIAB",
        AccountType::Equity => "EQUITY",
        AccountType::Income => "REVENUE",
        AccountType::Expense => "EXPENSE",
        AccountType::Other(_) => XERO_FALLBACK_TYPE,
    }
}

pub fn xero_type_for(raw: &str) -> &'static str {
    xero_type(&AccountType::from(raw))
}

pub struct XeroEncoder;

impl AccountEncoder for XeroEncoder {
    fn encode(accounts: &[Account]) -> String {
        let mut rows = Vec::with_capacity(accounts.len() + 1);
        rows.push(csv_row(XERO_HEADER));

        for account in accounts {
            rows.push(csv_row([
                account.number.as_str(),
                account.name.as_str(),
                xero_type(&account.account_type),
                account.description.as_str(),
            ]));
        }

        rows.join("\n")
    }
}
