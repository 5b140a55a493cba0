//! Input validation for authoring, accounts and answer submission.
//!
//! A failed validation becomes [`Error::InvalidForm`] carrying the form as it
//! should be shown again: the submitted values plus inline errors.

use crate::core::models::{option::Opt, question::Question};
use crate::error::Error;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

pub const TITLE_MAX_LENGTH: usize = 64;
pub const PROMPT_MAX_LENGTH: usize = 128;
pub const OPTION_TEXT_MAX_LENGTH: usize = 128;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const REQUIRED: &str = "This field is required.";

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result<F: Serialize>(self, form: &F) -> Result<(), Error> {
        if self.is_empty() {
            return Ok(());
        }
        Err(Error::InvalidForm(serde_json::json!({ "form": form, "errors": self })))
    }
}

fn clean_text(errors: &mut FieldErrors, field: &'static str, value: &str, max_length: usize) -> String {
    let value = value.trim();
    let length = value.chars().count();
    if length == 0 {
        errors.add(field, REQUIRED);
    } else if length > max_length {
        errors.add(field, format!("Ensure this value has at most {} characters (it has {}).", max_length, length));
    }
    value.to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyForm {
    #[serde(default)]
    pub title: String,
}

impl SurveyForm {
    pub fn clean(&self) -> Result<String, Error> {
        let mut errors = FieldErrors::default();
        let title = clean_text(&mut errors, "title", &self.title, TITLE_MAX_LENGTH);
        errors.into_result(self)?;
        Ok(title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub prompt: String,
}

impl QuestionForm {
    pub fn clean(&self) -> Result<String, Error> {
        let mut errors = FieldErrors::default();
        let prompt = clean_text(&mut errors, "prompt", &self.prompt, PROMPT_MAX_LENGTH);
        errors.into_result(self)?;
        Ok(prompt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionForm {
    #[serde(default)]
    pub text: String,
}

impl OptionForm {
    pub fn clean(&self) -> Result<String, Error> {
        let mut errors = FieldErrors::default();
        let text = clean_text(&mut errors, "text", &self.text, OPTION_TEXT_MAX_LENGTH);
        errors.into_result(self)?;
        Ok(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl SignupForm {
    /// Checks everything that needs no storage lookup.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        let username = clean_text(&mut errors, "username", &self.username, USERNAME_MAX_LENGTH);
        if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
            errors.add("username", "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.");
        }
        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else {
            if self.password1.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add(
                    "password1",
                    format!("This password is too short. It must contain at least {} characters.", PASSWORD_MIN_LENGTH),
                );
            }
            if self.password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password1", "This password is entirely numeric.");
            }
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: i32,
    pub text: String,
}

/// One exclusive-choice field bound to the option set of a single question.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerForm {
    pub index: usize,
    pub question_id: i32,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub required: bool,
    /// The submitted value, echoed back as sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AnswerForm {
    pub fn new(index: usize, question: &Question, options: &[Opt], required: bool) -> Self {
        Self {
            index,
            question_id: question.id,
            prompt: question.prompt.clone(),
            choices: options.iter().map(|o| Choice { id: o.id, text: o.text.clone() }).collect(),
            required,
            selected: None,
            errors: Vec::new(),
        }
    }

    fn clean(&mut self, value: Option<&Value>) -> Option<i32> {
        self.selected = value.filter(|v| !v.is_null()).cloned();
        let raw = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
            Some(v) => Some(v.to_string()),
        };
        let raw = match raw {
            Some(raw) => raw,
            None => {
                if self.required {
                    self.errors.push(REQUIRED.into());
                }
                return None;
            }
        };
        match raw.parse::<i32>() {
            Ok(id) if self.choices.iter().any(|c| c.id == id) => Some(id),
            _ => {
                self.errors.push(format!("Select a valid choice. {} is not one of the available choices.", raw));
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerInput {
    /// Option id, as a number or a numeric string.
    #[serde(default)]
    pub option: Option<Value>,
}

impl AnswerInput {
    pub fn chosen(option_id: i32) -> Self {
        Self {
            option: Some(option_id.into()),
        }
    }
}

/// Submitted entries, index-aligned with [`AnswerFormSet::forms`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSetInput {
    #[serde(default)]
    pub forms: Vec<AnswerInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedAnswer {
    pub question_id: i32,
    pub option_id: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerFormSet {
    pub total_forms: usize,
    pub forms: Vec<AnswerForm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub non_form_errors: Vec<String>,
}

impl AnswerFormSet {
    /// `options[i]` is the option set of `questions[i]`.
    pub fn new(questions: &[Question], options: &[Vec<Opt>], required: bool) -> Self {
        let forms: Vec<AnswerForm> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| AnswerForm::new(i, q, options.get(i).map(|o| o.as_slice()).unwrap_or(&[]), required))
            .collect();
        Self {
            total_forms: forms.len(),
            forms,
            non_form_errors: Vec::new(),
        }
    }

    /// Builds the per-index option sets from a flat list of the survey's options.
    pub fn for_survey(questions: &[Question], options: Vec<Opt>, required: bool) -> Self {
        let mut by_question: HashMap<i32, Vec<Opt>> = options.into_iter().into_group_map_by(|o| o.question_id);
        let per_index: Vec<Vec<Opt>> = questions.iter().map(|q| by_question.remove(&q.id).unwrap_or_default()).collect();
        Self::new(questions, &per_index, required)
    }

    /// Validates every form against its own choices. On failure the formset
    /// comes back with the submitted selections and errors filled in.
    pub fn bind(mut self, input: &FormSetInput) -> Result<Vec<CleanedAnswer>, Self> {
        if input.forms.len() != self.total_forms {
            self.non_form_errors
                .push(format!("Please submit {} answers, {} were submitted.", self.total_forms, input.forms.len()));
        }
        let mut cleaned = Vec::with_capacity(self.forms.len());
        for form in self.forms.iter_mut() {
            let value = input.forms.get(form.index).and_then(|a| a.option.as_ref());
            if let Some(option_id) = form.clean(value) {
                cleaned.push(CleanedAnswer {
                    question_id: form.question_id,
                    option_id,
                });
            }
        }
        if !self.is_valid() {
            return Err(self);
        }
        Ok(cleaned)
    }

    pub fn is_valid(&self) -> bool {
        self.non_form_errors.is_empty() && self.forms.iter().all(|f| f.errors.is_empty())
    }

    pub fn into_error(self) -> Error {
        match serde_json::to_value(&self) {
            Ok(value) => Error::InvalidForm(value),
            Err(e) => Error::ServerError(e.into()),
        }
    }
}
