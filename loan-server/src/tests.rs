//! Router tests over a classifier trained in-process

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use loan_core::dataset::TrainingData;
use loan_core::model::{GbdtConfig, GbdtTrainer};
use loan_core::{LoanClassifier, ModelArtifact};

use crate::{config::Config, create_router, templates, AppState};

/// Approval follows credit history
const TRAINING_CSV: &str = "\
Applicant_ID,Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area,Loan_Status
LP001,Male,Yes,0,Graduate,No,5000,0,100,360,1.0,Urban,Y
LP002,Female,No,1,Not Graduate,Yes,3000,1500,120,360,0.0,Rural,N
LP003,Male,Yes,2,Graduate,No,4200,1800,140,360,1.0,Semiurban,Y
LP004,Male,No,3+,Not Graduate,No,2500,0,90,180,0.0,Urban,N
LP005,Female,Yes,0,Graduate,Yes,6100,0,150,360,1.0,Rural,Y
LP006,Male,Yes,1,Graduate,No,3900,2100,110,360,0.0,Semiurban,N
LP008,Female,No,0,Graduate,No,2800,1000,80,360,1.0,Semiurban,Y
LP009,Male,Yes,2,Not Graduate,Yes,3300,0,130,240,0.0,Rural,N
LP010,Male,No,0,Graduate,No,7000,0,200,360,1.0,Urban,Y
LP011,Female,Yes,3+,Graduate,No,4500,1200,160,360,0.0,Urban,N
";

const APPLICANT_FORM: &str = "Gender=Male&Married=Yes&Dependents=0&Education=Graduate\
&Self_Employed=No&ApplicantIncome=5000&CoapplicantIncome=0&LoanAmount=100\
&Loan_Amount_Term=360&Credit_History=1.0&Property_Area=Urban";

fn state(classifier: LoanClassifier) -> AppState {
    AppState {
        classifier: Arc::new(classifier),
        templates: Arc::new(templates::registry().unwrap()),
        config: Config::default(),
    }
}

fn ready_app() -> Router {
    let data = TrainingData::from_reader(TRAINING_CSV.as_bytes()).unwrap();
    let trainer = GbdtTrainer::new(GbdtConfig {
        n_trees: 20,
        ..Default::default()
    });
    let model = trainer.fit(&data.features, &data.labels).unwrap();

    let classifier = LoanClassifier::default();
    classifier
        .install(ModelArtifact::new(data.schema, model).unwrap())
        .unwrap();
    create_router(state(classifier))
}

fn not_ready_app() -> Router {
    create_router(state(LoanClassifier::default()))
}

fn applicant() -> Value {
    json!({
        "Gender": "Male",
        "Married": "Yes",
        "Dependents": "0",
        "Education": "Graduate",
        "Self_Employed": "No",
        "ApplicantIncome": 5000,
        "CoapplicantIncome": 0,
        "LoanAmount": 100,
        "Loan_Amount_Term": 360,
        "Credit_History": 1.0,
        "Property_Area": "Urban"
    })
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

// ============================================================================
// HEALTH / MODEL
// ============================================================================

#[tokio::test]
async fn test_health_ready() {
    let (status, body) = send_json(ready_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["version"], loan_core::constants::VERSION);
}

#[tokio::test]
async fn test_health_not_ready() {
    let (status, body) = send_json(not_ready_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = send_json(ready_app(), get("/api/v1/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["layout"]["feature_count"], 14);
    assert_eq!(body["layout"]["feature_names"][0], "ApplicantIncome");
    assert_eq!(body["metadata"]["tree_count"], 20);
}

#[tokio::test]
async fn test_model_info_not_ready() {
    let (status, body) = send_json(not_ready_app(), get("/api/v1/model")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "not_ready");
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_predict_approved() {
    let (status, body) = send_json(ready_app(), post_json("/predict", applicant().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Approved");

    let p = body["probability"].as_f64().unwrap();
    assert!(p > 0.5 && p <= 1.0);
}

#[tokio::test]
async fn test_predict_rejected_on_poor_credit() {
    let mut record = applicant();
    record["Credit_History"] = json!(0.0);

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Rejected");
}

#[tokio::test]
async fn test_predict_missing_field() {
    let mut record = applicant();
    record.as_object_mut().unwrap().remove("ApplicantIncome");

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_field");
    assert_eq!(body["field"], "ApplicantIncome");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_null_counts_as_missing() {
    let mut record = applicant();
    record["LoanAmount"] = Value::Null;

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_field");
    assert_eq!(body["field"], "LoanAmount");
}

#[tokio::test]
async fn test_predict_invalid_value() {
    let mut record = applicant();
    record["Credit_History"] = json!(0.5);

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_value");
    assert_eq!(body["field"], "Credit_History");
}

#[tokio::test]
async fn test_predict_ignores_extra_keys_of_any_type() {
    let mut record = applicant();
    record["meta"] = json!({"source": "react"});
    record["accepted_terms"] = json!(true);
    record["tags"] = json!(["web", 2]);

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Approved");
}

#[tokio::test]
async fn test_predict_wrong_json_type_names_field() {
    let mut record = applicant();
    record["Credit_History"] = json!(true);

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_value");
    assert_eq!(body["field"], "Credit_History");

    let mut record = applicant();
    record["Property_Area"] = json!({"name": "Urban"});

    let (status, body) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_value");
    assert_eq!(body["field"], "Property_Area");
}

#[tokio::test]
async fn test_predict_unseen_level_accepted() {
    let mut record = applicant();
    record["Dependents"] = json!("5");

    let (status, _) = send_json(ready_app(), post_json("/predict", record.to_string())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let (status, body) = send_json(ready_app(), post_json("/predict", "{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_predict_not_ready() {
    let (status, body) = send_json(not_ready_app(), post_json("/predict", applicant().to_string())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "not_ready");
    assert_eq!(body["status"], 503);
}

// ============================================================================
// WEB FORM
// ============================================================================

#[tokio::test]
async fn test_form_page_renders() {
    let (status, html) = send(ready_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<form action="/prediction" method="post">"#));
    assert!(html.contains(r#"name="Property_Area""#));
    assert!(html.contains(r#"<option value="3+">"#));
    assert!(!html.contains("not loaded"));
}

#[tokio::test]
async fn test_form_page_warns_when_not_ready() {
    let (status, html) = send(not_ready_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("not loaded"));
}

#[tokio::test]
async fn test_form_submission_personalized() {
    let body = format!("name=Ada+Lovelace&{}", APPLICANT_FORM);
    let (status, html) = send(ready_app(), post_form("/prediction", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Approved</h1>"));
    assert!(html.contains("Dear Ada Lovelace, your loan is approved!"));
    assert!(html.contains("Approval probability: "));
    assert!(html.contains('%'));
}

#[tokio::test]
async fn test_form_rejection_reports_approval_probability() {
    let body = format!(
        "name=Bob&{}",
        APPLICANT_FORM.replace("Credit_History=1.0", "Credit_History=0.0")
    );
    let (status, html) = send(ready_app(), post_form("/prediction", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Sorry Bob, your loan is rejected."));

    // Below the cut-off, so the approval probability shown is under 50%
    let shown: f64 = html
        .split("Approval probability: ")
        .nth(1)
        .and_then(|rest| rest.split('%').next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(shown < 50.0, "shown {}", shown);
}

#[tokio::test]
async fn test_form_name_is_escaped() {
    let body = format!("name=%3Cb%3EBob%3C%2Fb%3E&{}", APPLICANT_FORM);
    let (status, html) = send(ready_app(), post_form("/prediction", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("&lt;b&gt;Bob"));
    assert!(!html.contains("<b>Bob"));
}

#[tokio::test]
async fn test_form_blank_field_is_missing() {
    let body = APPLICANT_FORM.replace("LoanAmount=100", "LoanAmount=");
    let (status, html) = send(ready_app(), post_form("/prediction", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Prediction failed"));
    assert!(html.contains("Field: LoanAmount"));
}

#[tokio::test]
async fn test_form_text_in_numeric_field() {
    let body = APPLICANT_FORM.replace("ApplicantIncome=5000", "ApplicantIncome=lots");
    let (status, html) = send(ready_app(), post_form("/prediction", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Field: ApplicantIncome"));
}

#[tokio::test]
async fn test_form_not_ready() {
    let (status, html) = send(not_ready_app(), post_form("/prediction", APPLICANT_FORM)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("not ready"));
}
