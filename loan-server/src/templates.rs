//! HTML templates for the web form
//!
//! Rendered with handlebars' default HTML escaping, so applicant-supplied
//! text (the name) never reaches the page unescaped.

use handlebars::Handlebars;
use serde::Serialize;

pub const FORM: &str = "form";
pub const RESULT: &str = "result";
pub const ERROR: &str = "error";

const LAYOUT_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Loan Approval</title>
</head>
<body>
"#;

const LAYOUT_TAIL: &str = "</body>\n</html>\n";

const FORM_BODY: &str = r#"<h1>Loan Approval</h1>
{{#unless model_loaded}}<p class="warning">The model is not loaded; predictions are unavailable.</p>{{/unless}}
<form action="/prediction" method="post">
  <label>Name <input type="text" name="name"></label>
{{#each choices}}
  <label>{{label}}
    <select name="{{field}}">
{{#each options}}
      <option value="{{this}}">{{this}}</option>
{{/each}}
    </select>
  </label>
{{/each}}
{{#each numbers}}
  <label>{{label}} <input type="number" step="any" min="0" name="{{field}}" required></label>
{{/each}}
  <button type="submit">Predict</button>
</form>
"#;

const RESULT_BODY: &str = r#"<h1>{{decision}}</h1>
<p>{{message}}</p>
<p>Approval probability: {{approval_probability}}%</p>
<a href="/">New application</a>
"#;

const ERROR_BODY: &str = r#"<h1>Prediction failed</h1>
<p>{{message}}</p>
{{#if field}}<p>Field: {{field}}</p>{{/if}}
<a href="/">Back to the form</a>
"#;

/// Select input on the form
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceField {
    pub field: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

/// Numeric input on the form
#[derive(Debug, Clone, Serialize)]
pub struct NumberField {
    pub field: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub model_loaded: bool,
    pub choices: &'static [ChoiceField],
    pub numbers: &'static [NumberField],
}

#[derive(Debug, Serialize)]
pub struct ResultPage {
    pub decision: String,
    pub message: String,
    /// Class-1 probability as a percentage, whatever the decision
    pub approval_probability: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub message: String,
    pub field: Option<String>,
}

/// Build the registry with every page registered
pub fn registry() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();

    for (name, body) in [(FORM, FORM_BODY), (RESULT, RESULT_BODY), (ERROR, ERROR_BODY)] {
        handlebars.register_template_string(name, format!("{}{}{}", LAYOUT_HEAD, body, LAYOUT_TAIL))?;
    }

    Ok(handlebars)
}
