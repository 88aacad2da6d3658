// Form schemas (login and contact) and the login response model

use serde::Serialize;

use super::fields::{Format, Text};
use super::reader::TextFields;
use super::{FieldError, Secret};

const USERNAME_OUT: Text = Text::new().max(20);
const CONTACT_NAME: Text = Text::new().min(1).max(20);
const CONTACT_EMAIL: Text = Text::new().format(Format::Email);
const CONTACT_MESSAGE: Text = Text::new().min(20);

pub const LOGIN_MESSAGE: &str = "Login Succesfully!";

/// Credentials posted as form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: Secret,
}

impl LoginForm {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, Vec<FieldError>> {
        let mut fields = TextFields::new(pairs, "body");
        let username = fields.required_text("username", &Text::ANY);
        let password = fields.required_text("password", &Text::ANY);

        let errors = fields.finish();
        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok(Self {
                username,
                password: Secret::new(password),
            }),
            _ => Err(errors),
        }
    }
}

/// Response model for a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOut {
    pub username: String,
    pub message: String,
}

impl LoginOut {
    /// Build the response model, checking its own constraints
    pub fn new(username: String) -> Result<Self, Vec<FieldError>> {
        match USERNAME_OUT.check(&username) {
            Ok(()) => Ok(Self {
                username,
                message: LOGIN_MESSAGE.to_string(),
            }),
            Err(issue) => Err(vec![FieldError::new(
                vec!["response".to_string(), "username".to_string()],
                issue,
            )]),
        }
    }
}

/// Contact form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, Vec<FieldError>> {
        let mut fields = TextFields::new(pairs, "body");
        let first_name = fields.required_text("first_name", &CONTACT_NAME);
        let last_name = fields.required_text("last_name", &CONTACT_NAME);
        let email = fields.required_text("email", &CONTACT_EMAIL);
        let message = fields.required_text("message", &CONTACT_MESSAGE);

        let errors = fields.finish();
        match (first_name, last_name, email, message) {
            (Some(first_name), Some(last_name), Some(email), Some(message))
                if errors.is_empty() =>
            {
                Ok(Self {
                    first_name,
                    last_name,
                    email,
                    message,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_login_form() {
        let form =
            LoginForm::from_pairs(&pairs(&[("username", "miguel2021"), ("password", "")])).unwrap();
        assert_eq!(form.username, "miguel2021");
        assert_eq!(form.password, Secret::new(String::new()));

        let errors = LoginForm::from_pairs(&pairs(&[("username", "miguel2021")])).unwrap_err();
        assert_eq!(errors[0].loc, vec!["body", "password"]);
        assert_eq!(errors[0].kind, "value_error.missing");
    }

    #[test]
    fn test_login_out() {
        let out = LoginOut::new("miguel2021".to_string()).unwrap();
        assert_eq!(out.message, "Login Succesfully!");

        let errors = LoginOut::new("u".repeat(21)).unwrap_err();
        assert_eq!(errors[0].loc, vec!["response", "username"]);
    }

    #[test]
    fn test_contact_form() {
        let form = ContactForm::from_pairs(&pairs(&[
            ("first_name", "Miguel"),
            ("last_name", "Torres"),
            ("email", "miguel@example.com"),
            ("message", "I would like to know more about the course"),
        ]))
        .unwrap();
        assert_eq!(form.first_name, "Miguel");

        let errors = ContactForm::from_pairs(&pairs(&[
            ("first_name", "A name that is far too long"),
            ("email", "nope"),
            ("message", "too short"),
        ]))
        .unwrap_err();
        let locs: Vec<String> = errors.iter().map(FieldError::location).collect();
        assert_eq!(
            locs,
            vec!["body.first_name", "body.last_name", "body.email", "body.message"]
        );
    }
}
