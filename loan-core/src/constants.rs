//! Central Constants
//!
//! Single source of truth for dataset column names and serving defaults.
//! Training and serving both read from here, so a rename only happens once.

/// Identifier column in the training dataset (never a feature)
pub const ID_COLUMN: &str = "Applicant_ID";

/// Target column in the training dataset
pub const TARGET_COLUMN: &str = "Loan_Status";

/// Target value that marks an approved loan
pub const POSITIVE_TARGET: &str = "Y";

/// Target value that marks a rejected loan
pub const NEGATIVE_TARGET: &str = "N";

// ============================================
// Raw record field names
// ============================================

pub const GENDER: &str = "Gender";
pub const MARRIED: &str = "Married";
pub const DEPENDENTS: &str = "Dependents";
pub const EDUCATION: &str = "Education";
pub const SELF_EMPLOYED: &str = "Self_Employed";
pub const APPLICANT_INCOME: &str = "ApplicantIncome";
pub const COAPPLICANT_INCOME: &str = "CoapplicantIncome";
pub const LOAN_AMOUNT: &str = "LoanAmount";
pub const LOAN_AMOUNT_TERM: &str = "Loan_Amount_Term";
pub const CREDIT_HISTORY: &str = "Credit_History";
pub const PROPERTY_AREA: &str = "Property_Area";

/// The eleven applicant fields, in dataset order
pub const RECORD_FIELDS: &[&str] = &[
    GENDER,
    MARRIED,
    DEPENDENTS,
    EDUCATION,
    SELF_EMPLOYED,
    APPLICANT_INCOME,
    COAPPLICANT_INCOME,
    LOAN_AMOUNT,
    LOAN_AMOUNT_TERM,
    CREDIT_HISTORY,
    PROPERTY_AREA,
];

// ============================================
// Serving defaults
// ============================================

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "model/loan_approval_model.json";

/// Default probability cut-off for "Approved"
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Label reported for class 1
pub const APPROVED_LABEL: &str = "Approved";

/// Label reported for class 0
pub const REJECTED_LABEL: &str = "Rejected";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
