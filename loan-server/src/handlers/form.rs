//! Web form handlers
//!
//! `GET /` serves the application form, `POST /prediction` classifies the
//! submission and renders the outcome. Validation and readiness failures
//! render the error page with the same status code the JSON API uses.

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use loan_core::constants::*;
use loan_core::model::LoanDecision;
use loan_core::RawRecord;

use crate::templates::{self, ChoiceField, ErrorPage, FormPage, NumberField, ResultPage};
use crate::{AppError, AppState};

/// Optional applicant name; not a model input
pub const NAME_FIELD: &str = "name";

const CHOICES: &[ChoiceField] = &[
    ChoiceField { field: GENDER, label: "Gender", options: &["Male", "Female"] },
    ChoiceField { field: MARRIED, label: "Married", options: &["Yes", "No"] },
    ChoiceField { field: DEPENDENTS, label: "Dependents", options: &["0", "1", "2", "3+"] },
    ChoiceField { field: EDUCATION, label: "Education", options: &["Graduate", "Not Graduate"] },
    ChoiceField { field: SELF_EMPLOYED, label: "Self employed", options: &["Yes", "No"] },
    ChoiceField { field: CREDIT_HISTORY, label: "Credit history", options: &["1.0", "0.0"] },
    ChoiceField { field: PROPERTY_AREA, label: "Property area", options: &["Urban", "Semiurban", "Rural"] },
];

const NUMBERS: &[NumberField] = &[
    NumberField { field: APPLICANT_INCOME, label: "Applicant income" },
    NumberField { field: COAPPLICANT_INCOME, label: "Coapplicant income" },
    NumberField { field: LOAN_AMOUNT, label: "Loan amount" },
    NumberField { field: LOAN_AMOUNT_TERM, label: "Loan amount term (months)" },
];

pub async fn index(State(state): State<AppState>) -> Response {
    let page = FormPage {
        model_loaded: state.classifier.is_ready(),
        choices: CHOICES,
        numbers: NUMBERS,
    };

    match state.templates.render(templates::FORM, &page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    match classify(&state, form) {
        Ok(page) => render(&state, StatusCode::OK, templates::RESULT, &page),
        Err(err) => {
            tracing::warn!("Form prediction refused: {}", err);
            let page = ErrorPage {
                message: err.public_message(),
                field: err.field().map(str::to_string),
            };
            render(&state, err.status_code(), templates::ERROR, &page)
        }
    }
}

fn classify(
    state: &AppState,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<ResultPage, AppError> {
    let Form(mut fields) = form?;
    let name = fields
        .remove(NAME_FIELD)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let record = RawRecord::from_text_fields(fields);
    let prediction = state.classifier.predict(&record)?;

    Ok(ResultPage {
        decision: prediction.decision.to_string(),
        message: outcome_message(prediction.decision, name.as_deref()),
        approval_probability: format!("{:.2}", prediction.probability * 100.0),
    })
}

fn outcome_message(decision: LoanDecision, name: Option<&str>) -> String {
    match (decision, name) {
        (LoanDecision::Approved, Some(name)) => format!("Dear {}, your loan is approved!", name),
        (LoanDecision::Rejected, Some(name)) => format!("Sorry {}, your loan is rejected.", name),
        (LoanDecision::Approved, None) => "Your loan is approved!".to_string(),
        (LoanDecision::Rejected, None) => "Your loan is rejected.".to_string(),
    }
}

fn render<T: serde::Serialize>(state: &AppState, status: StatusCode, name: &str, page: &T) -> Response {
    match state.templates.render(name, page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
