//! QuickBooks Desktop IIF account list.
//!
//! IIF has no escaping mechanism. A name or description containing a tab or
//! a line break produces a structurally invalid file; the encoder logs a
//! warning and writes the field unchanged.

use super::AccountEncoder;
use crate::schema::{Account, AccountType};
use log::warn;

pub const QBD_HEADER: &str = "!ACCNT\tNAME\tACCNTTYPE\tDESC\tACCNUM";

/// IIF account type used for anything outside the five canonical types.
pub const QBD_FALLBACK_TYPE: &str = "EXP";

pub fn qbd_type(account_type: &AccountType) -> &'static str {
    match account_type {
        AccountType::Asset => "BANK",
        AccountType::Liability => "OCLIAB",
        AccountType::Equity => "EQUITY",
        AccountType::Income => "INC",
        AccountType::Expense => "EXP",
        AccountType::Other(_) => QBD_FALLBACK_TYPE,
    }
}

pub fn qbd_type_for(raw: &str) -> &'static str {
    qbd_type(&AccountType::from(raw))
}

pub struct QbdEncoder;

impl AccountEncoder for QbdEncoder {
    fn encode(accounts: &[Account]) -> String {
        let mut lines = Vec::with_capacity(accounts.len() + 1);
        lines.push(QBD_HEADER.to_string());

        for account in accounts {
            let fields = [
                account.name.as_str(),
                account.description.as_str(),
                account.number.as_str(),
            ];
            if fields.iter().any(|f| f.contains(['\t', '\n', '\r'])) {
                warn!(
                    "Account {} contains a tab or line break; the IIF line will be malformed",
                    account.number
                );
            }

            lines.push(format!(
                "ACCNT\t{}\t{}\t{}\t{}",
                account.name,
                qbd_type(&account.account_type),
                account.description,
                account.number
            ));
        }

        lines.join("\n")
    }
}
