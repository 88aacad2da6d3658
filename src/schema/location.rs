// Location schema

use serde::Serialize;
use serde_json::Value;

use super::fields::{Format, Text};
use super::reader::JsonFields;
use super::FieldError;

const PLACE: Text = Text::new().min(1).max(50).format(Format::Alpha);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    pub fn from_json(value: &Value, loc: &[&str]) -> Result<Self, Vec<FieldError>> {
        let mut fields = JsonFields::new(value, loc)?;
        let city = fields.required_text("city", &PLACE);
        let state = fields.required_text("state", &PLACE);
        let country = fields.required_text("country", &PLACE);

        let errors = fields.finish();
        match (city, state, country) {
            (Some(city), Some(state), Some(country)) if errors.is_empty() => Ok(Self {
                city,
                state,
                country,
            }),
            _ => Err(errors),
        }
    }
}
