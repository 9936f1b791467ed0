//! QuickBooks Online chart of accounts import (CSV).

use super::{csv_row, AccountEncoder};
use crate::schema::Account;

pub const QBO_HEADER: [&str; 5] = ["Account Type", "Detail Type", "Name", "Description", "Number"];

pub struct QboEncoder;

impl AccountEncoder for QboEncoder {
    fn encode(accounts: &[Account]) -> String {
        let mut rows = Vec::with_capacity(accounts.len() + 1);
        rows.push(csv_row(QBO_HEADER));

        for account in accounts {
            rows.push(csv_row([
                account.account_type.as_str(),
                account.detail_type.as_str(),
                account.name.as_str(),
                account.description.as_str(),
                account.number.as_str(),
            ]));
        }

        rows.join("\n")
    }
}
