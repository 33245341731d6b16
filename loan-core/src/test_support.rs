//! Shared fixtures for unit tests

use crate::constants::*;
use crate::features::{RawRecord, ReferenceSchema, SchemaField};

/// Schema the standard loan dataset derives to
pub fn loan_schema() -> ReferenceSchema {
    ReferenceSchema::from_fields(vec![
        SchemaField::categorical(GENDER, ["Male", "Female"]),
        SchemaField::categorical(MARRIED, ["Yes", "No"]),
        SchemaField::categorical(DEPENDENTS, ["0", "1", "2", "3+"]),
        SchemaField::categorical(EDUCATION, ["Graduate", "Not Graduate"]),
        SchemaField::categorical(SELF_EMPLOYED, ["Yes", "No"]),
        SchemaField::numeric(APPLICANT_INCOME),
        SchemaField::numeric(COAPPLICANT_INCOME),
        SchemaField::numeric(LOAN_AMOUNT),
        SchemaField::numeric(LOAN_AMOUNT_TERM),
        SchemaField::numeric(CREDIT_HISTORY),
        SchemaField::categorical(PROPERTY_AREA, ["Urban", "Semiurban", "Rural"]),
    ])
}

/// Male / married / no dependents / graduate applicant in an urban area
pub fn sample_record() -> RawRecord {
    RawRecord::new()
        .with(GENDER, "Male")
        .with(MARRIED, "Yes")
        .with(DEPENDENTS, "0")
        .with(EDUCATION, "Graduate")
        .with(SELF_EMPLOYED, "No")
        .with(APPLICANT_INCOME, 5000.0)
        .with(COAPPLICANT_INCOME, 0.0)
        .with(LOAN_AMOUNT, 100.0)
        .with(LOAN_AMOUNT_TERM, 360.0)
        .with(CREDIT_HISTORY, 1.0)
        .with(PROPERTY_AREA, "Urban")
}

/// Small dataset in the training CSV format. Approval follows credit history.
pub const SAMPLE_CSV: &str = "\
Applicant_ID,Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area,Loan_Status
LP001,Male,Yes,0,Graduate,No,5000,0,100,360,1.0,Urban,Y
LP002,Female,No,1,Not Graduate,Yes,3000,1500,120,360,0.0,Rural,N
LP003,Male,Yes,2,Graduate,No,4200,1800,140,360,1.0,Semiurban,Y
LP004,Male,No,3+,Not Graduate,No,2500,0,90,180,0.0,Urban,N
LP005,Female,Yes,0,Graduate,Yes,6100,0,150,360,1.0,Rural,Y
LP006,Male,Yes,1,Graduate,No,3900,2100,110,360,0.0,Semiurban,N
LP007,,Yes,0,Graduate,No,4000,0,100,360,1.0,Urban,Y
LP008,Female,No,0,Graduate,No,2800,1000,80,360,1.0,Semiurban,Y
LP009,Male,Yes,2,Not Graduate,Yes,3300,0,130,240,0.0,Rural,N
LP010,Male,No,0,Graduate,No,7000,0,200,360,1.0,Urban,Y
LP011,Female,Yes,3+,Graduate,No,4500,1200,160,360,0.0,Urban,N
";
