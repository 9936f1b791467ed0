//! Industry-keyed base Chart of Accounts templates.
//!
//! A [`TemplateStore`] is built once (from the built-in tables or from JSON)
//! and handed by reference to the reconciler. Every template is validated on
//! construction, so lookups never return a malformed chart.

use crate::error::{OnboardingError, Result};
use crate::schema::{Account, AccountType};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    General,
    Restaurant,
    Contractor,
    ProfessionalServices,
    Retail,
}

impl Industry {
    pub const ALL: [Industry; 5] = [
        Industry::General,
        Industry::Restaurant,
        Industry::Contractor,
        Industry::ProfessionalServices,
        Industry::Retail,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Industry::General => "general",
            Industry::Restaurant => "restaurant",
            Industry::Contractor => "contractor",
            Industry::ProfessionalServices => "professional-services",
            Industry::Retail => "retail",
        }
    }
}

impl FromStr for Industry {
    type Err = OnboardingError;

    fn from_str(s: &str) -> Result<Self> {
        Industry::ALL
            .into_iter()
            .find(|industry| industry.key() == s.trim())
            .ok_or_else(|| OnboardingError::UnknownIndustry(s.to_string()))
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateStore {
    templates: BTreeMap<Industry, Vec<Account>>,
}

impl TemplateStore {
    /// The built-in templates: the general chart plus industry-specific
    /// additions, ordered by account number.
    pub fn builtin() -> Self {
        let templates = Industry::ALL
            .into_iter()
            .map(|industry| {
                let mut accounts = general_accounts();
                accounts.extend(industry_accounts(industry));
                accounts.sort_by(|a, b| a.number.cmp(&b.number));
                (industry, accounts)
            })
            .collect();

        Self { templates }
    }

    /// Loads templates from a JSON object keyed by industry, e.g.
    /// `{"retail": [{"number": "1000", ...}]}`. Every template is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let templates: BTreeMap<Industry, Vec<Account>> = serde_json::from_str(json)?;
        let store = Self { templates };
        store.validate()?;
        Ok(store)
    }

    pub fn validate(&self) -> Result<()> {
        for (industry, accounts) in &self.templates {
            validate_template(accounts)?;
            debug!(
                "Template '{}' validated with {} accounts",
                industry,
                accounts.len()
            );
        }
        Ok(())
    }

    pub fn accounts(&self, industry: Industry) -> Result<&[Account]> {
        self.templates
            .get(&industry)
            .map(Vec::as_slice)
            .ok_or_else(|| OnboardingError::MissingTemplate(industry.key().to_string()))
    }

    /// Looks up a template by its raw industry key.
    pub fn accounts_for_key(&self, industry: &str) -> Result<&[Account]> {
        self.accounts(industry.parse()?)
    }

    pub fn industries(&self) -> impl Iterator<Item = Industry> + '_ {
        self.templates.keys().copied()
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Checks the structural invariants of a base template: every account has a
/// number, a name and a recognized type, and numbers are unique.
pub fn validate_template(accounts: &[Account]) -> Result<()> {
    let mut seen_numbers = HashSet::new();

    for account in accounts {
        let label = if account.name.trim().is_empty() {
            account.number.clone()
        } else {
            account.name.clone()
        };

        if account.number.trim().is_empty() {
            return Err(OnboardingError::InvalidTemplate {
                account: label,
                details: "account number is empty".to_string(),
            });
        }

        if account.name.trim().is_empty() {
            return Err(OnboardingError::InvalidTemplate {
                account: label,
                details: "account name is empty".to_string(),
            });
        }

        if !account.account_type.is_recognized() {
            return Err(OnboardingError::InvalidTemplate {
                account: label,
                details: format!("unrecognized account type '{}'", account.account_type),
            });
        }

        if !seen_numbers.insert(account.number.trim().to_string()) {
            return Err(OnboardingError::InvalidTemplate {
                account: label,
                details: format!("duplicate account number {}", account.number),
            });
        }
    }

    Ok(())
}

fn acct(
    number: &str,
    name: &str,
    account_type: AccountType,
    detail_type: &str,
    description: &str,
) -> Account {
    Account::new(number, name, account_type, detail_type, description)
}

fn general_accounts() -> Vec<Account> {
    use AccountType::*;

    vec![
        acct("1000", "Business Checking", Asset, "Checking", "Primary operating bank account"),
        acct("1010", "Business Savings", Asset, "Savings", "Reserve and savings bank account"),
        acct("1200", "Accounts Receivable", Asset, "Accounts Receivable (A/R)", "Amounts owed by customers"),
        acct("1500", "Furniture and Equipment", Asset, "Furniture & Fixtures", "Office furniture, computers and equipment"),
        acct("1510", "Accumulated Depreciation", Asset, "Accumulated Depreciation", "Contra asset for depreciation of fixed assets"),
        acct("2000", "Accounts Payable", Liability, "Accounts Payable (A/P)", "Amounts owed to vendors"),
        acct("2100", "Business Credit Card", Liability, "Credit Card", "Company credit card balances"),
        acct("2200", "Sales Tax Payable", Liability, "Sales Tax Payable", "Sales tax collected and not yet remitted"),
        acct("2300", "Payroll Liabilities", Liability, "Payroll Tax Payable", "Withheld and employer payroll taxes owed"),
        acct("2700", "Loan Payable", Liability, "Notes Payable", "Long-term business loans"),
        acct("3000", "Owner's Equity", Equity, "Owner's Equity", "Owner contributions to the business"),
        acct("3100", "Owner's Draw", Equity, "Partner Distributions", "Owner withdrawals from the business"),
        acct("3900", "Retained Earnings", Equity, "Retained Earnings", "Accumulated earnings from prior years"),
        acct("4000", "Sales", Income, "Sales of Product Income", "Revenue from the sale of goods"),
        acct("4100", "Service Revenue", Income, "Service/Fee Income", "Revenue from services rendered"),
        acct("4900", "Other Income", Income, "Other Primary Income", "Miscellaneous business income"),
        acct("5000", "Cost of Goods Sold", Expense, "Supplies & Materials - COGS", "Direct cost of goods sold"),
        acct("6000", "Advertising and Marketing", Expense, "Advertising/Promotional", "Ads, promotions and marketing services"),
        acct("6010", "Bank Fees", Expense, "Bank Charges", "Bank service charges and fees"),
        acct("6020", "Insurance", Expense, "Insurance", "General business insurance premiums"),
        acct("6030", "Meals", Expense, "Entertainment Meals", "Business meals with clients and staff"),
        acct("6040", "Legal and Professional Fees", Expense, "Legal & Professional Fees", "Accounting, legal and consulting fees"),
        acct("6050", "Office Supplies", Expense, "Office/General Administrative Expenses", "Consumable office supplies"),
        acct("6060", "Rent", Expense, "Rent or Lease of Buildings", "Office or facility rent"),
        acct("6070", "Utilities", Expense, "Utilities", "Electricity, water, internet and phone"),
        acct("6080", "Software and Subscriptions", Expense, "Office/General Administrative Expenses", "Software licenses and online subscriptions"),
        acct("6090", "Travel", Expense, "Travel", "Airfare, lodging and transportation"),
        acct("6100", "Payroll Expenses", Expense, "Payroll Expenses", "Wages, salaries and employer taxes"),
        acct("6200", "Vehicle Expenses", Expense, "Auto", "Fuel, maintenance and vehicle costs"),
        acct("7000", "Depreciation Expense", Expense, "Depreciation", "Periodic depreciation of fixed assets"),
    ]
}

fn industry_accounts(industry: Industry) -> Vec<Account> {
    use AccountType::*;

    match industry {
        Industry::General => Vec::new(),

        Industry::Restaurant => vec![
            acct("1300", "Food Inventory", Asset, "Inventory", "Food on hand at period end"),
            acct("1310", "Beverage Inventory", Asset, "Inventory", "Beverages and alcohol on hand"),
            acct("2250", "Tips Payable", Liability, "Other Current Liabilities", "Tips collected and owed to staff"),
            acct("4010", "Food Sales", Income, "Sales of Product Income", "Dine-in and takeout food sales"),
            acct("4020", "Beverage Sales", Income, "Sales of Product Income", "Beverage and bar sales"),
            acct("4030", "Catering Revenue", Income, "Service/Fee Income", "Catering and private events"),
            acct("5010", "Food Costs", Expense, "Supplies & Materials - COGS", "Food purchased for resale"),
            acct("5020", "Beverage Costs", Expense, "Supplies & Materials - COGS", "Beverages purchased for resale"),
            acct("5030", "Paper and Packaging", Expense, "Supplies & Materials - COGS", "To-go containers and disposables"),
            acct("6300", "Kitchen Supplies", Expense, "Supplies & Materials", "Smallwares and kitchen consumables"),
            acct("6310", "Delivery Service Fees", Expense, "Commissions & Fees", "Third-party delivery platform fees"),
            acct("6320", "Repairs and Maintenance", Expense, "Repair & Maintenance", "Equipment and facility repairs"),
            acct("6330", "Licenses and Permits", Expense, "Taxes Paid", "Health permits and liquor licenses"),
        ],

        Industry::Contractor => vec![
            acct("1300", "Materials Inventory", Asset, "Inventory", "Construction materials on hand"),
            acct("1400", "Retainage Receivable", Asset, "Other Current Assets", "Retainage withheld by customers"),
            acct("1520", "Tools and Equipment", Asset, "Machinery & Equipment", "Heavy equipment and power tools"),
            acct("1530", "Vehicles", Asset, "Vehicles", "Work trucks and trailers"),
            acct("2400", "Customer Deposits", Liability, "Other Current Liabilities", "Deposits received before work begins"),
            acct("4200", "Contract Revenue", Income, "Service/Fee Income", "Revenue from construction contracts"),
            acct("4210", "Change Order Revenue", Income, "Service/Fee Income", "Revenue from approved change orders"),
            acct("5100", "Job Materials", Expense, "Supplies & Materials - COGS", "Materials consumed on jobs"),
            acct("5110", "Subcontractors", Expense, "Cost of Labor - COS", "Payments to subcontractors"),
            acct("5120", "Equipment Rental", Expense, "Equipment Rental - COS", "Rented equipment for jobs"),
            acct("5130", "Job Permits", Expense, "Other Costs of Services - COS", "Building permits and inspections"),
            acct("6340", "Small Tools", Expense, "Supplies & Materials", "Hand tools under the capitalization limit"),
            acct("6350", "Fuel", Expense, "Auto", "Fuel for vehicles and equipment"),
        ],

        Industry::ProfessionalServices => vec![
            acct("1250", "Unbilled Receivables", Asset, "Other Current Assets", "Work performed but not yet invoiced"),
            acct("2400", "Client Retainers", Liability, "Other Current Liabilities", "Retainers received in advance"),
            acct("4200", "Consulting Revenue", Income, "Service/Fee Income", "Fees from consulting engagements"),
            acct("4210", "Reimbursed Expenses", Income, "Other Primary Income", "Client reimbursements of project costs"),
            acct("5100", "Contract Labor", Expense, "Cost of Labor - COS", "Independent contractors on client work"),
            acct("6400", "Continuing Education", Expense, "Office/General Administrative Expenses", "Training and certification costs"),
            acct("6410", "Professional Memberships", Expense, "Dues & Subscriptions", "Professional association dues"),
            acct("6420", "Professional Liability Insurance", Expense, "Insurance", "Errors and omissions coverage"),
        ],

        Industry::Retail => vec![
            acct("1300", "Merchandise Inventory", Asset, "Inventory", "Goods held for resale"),
            acct("2400", "Gift Cards Outstanding", Liability, "Other Current Liabilities", "Unredeemed gift card balances"),
            acct("4010", "Online Sales", Income, "Sales of Product Income", "E-commerce sales"),
            acct("4020", "In-Store Sales", Income, "Sales of Product Income", "Point-of-sale revenue"),
            acct("4050", "Sales Returns and Allowances", Income, "Discounts/Refunds Given", "Customer returns and discounts"),
            acct("5010", "Merchandise Purchases", Expense, "Supplies & Materials - COGS", "Inventory purchased for resale"),
            acct("5040", "Freight In", Expense, "Shipping, Freight & Delivery - COS", "Inbound shipping on inventory"),
            acct("5050", "Inventory Shrinkage", Expense, "Other Costs of Services - COS", "Lost, stolen or damaged inventory"),
            acct("6300", "Merchant Processing Fees", Expense, "Bank Charges", "Card processing fees"),
            acct("6310", "Store Supplies", Expense, "Supplies & Materials", "Bags, tags and store consumables"),
            acct("6320", "Shipping and Packaging", Expense, "Shipping, Freight & Delivery", "Outbound shipping to customers"),
        ],
    }
}
