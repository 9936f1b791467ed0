use thiserror::Error;

#[derive(Error, Debug)]
pub enum OnboardingError {
    #[error("Unknown industry '{0}': expected one of general, restaurant, contractor, professional-services, retail")]
    UnknownIndustry(String),

    #[error("No account template registered for industry '{0}'")]
    MissingTemplate(String),

    #[error("Invalid template account '{account}': {details}")]
    InvalidTemplate { account: String, details: String },

    #[error("Invalid transaction #{index}: {details}")]
    InvalidTransaction { index: usize, details: String },

    #[error("No transactions to export")]
    NoTransactions,

    #[error("Chart of accounts is empty; nothing to export")]
    EmptyChart,

    #[error("Export format {0} does not encode a chart of accounts")]
    UnsupportedExport(String),

    #[error("Invalid suggestion payload: {0}")]
    InvalidSuggestionPayload(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OnboardingError>;
