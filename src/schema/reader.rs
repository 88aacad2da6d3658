//! Field readers
//!
//! A reader walks one input source (a JSON object, or textual key/value
//! pairs from the query string, path or a form) and collects every field
//! error instead of stopping at the first one. Getters return `None` when
//! the field is absent or invalid; callers build their schema only once
//! `finish()` reports no errors.

use serde_json::{Map, Value};

use super::fields::{Choice, Float, Int, Issue, Text};
use super::FieldError;

/// Reader over a JSON object
pub struct JsonFields<'a> {
    object: &'a Map<String, Value>,
    loc: Vec<String>,
    errors: Vec<FieldError>,
}

impl<'a> JsonFields<'a> {
    /// Start reading `value` found at `loc`; fails if it is not an object
    pub fn new(value: &'a Value, loc: &[&str]) -> Result<Self, Vec<FieldError>> {
        let loc: Vec<String> = loc.iter().map(ToString::to_string).collect();
        match value {
            Value::Object(object) => Ok(Self {
                object,
                loc,
                errors: Vec::new(),
            }),
            Value::Null => Err(vec![FieldError::new(loc, Issue::missing())]),
            _ => Err(vec![FieldError::new(
                loc,
                Issue::new("value is not a valid dict", "type_error.dict"),
            )]),
        }
    }

    fn fail(&mut self, name: &str, issue: Issue) {
        let mut loc = self.loc.clone();
        loc.push(name.to_string());
        self.errors.push(FieldError::new(loc, issue));
    }

    /// Field value, treating an explicit `null` like an absent key
    fn present(&self, name: &str) -> Option<&'a Value> {
        self.object.get(name).filter(|v| !v.is_null())
    }

    fn require(&mut self, name: &str) -> Option<&'a Value> {
        match self.object.get(name) {
            None => {
                self.fail(name, Issue::missing());
                None
            }
            Some(Value::Null) => {
                self.fail(name, Issue::none_not_allowed());
                None
            }
            Some(value) => Some(value),
        }
    }

    fn text_value(&mut self, name: &str, value: &Value, rules: &Text) -> Option<String> {
        let Value::String(s) = value else {
            self.fail(name, Issue::new("str type expected", "type_error.str"));
            return None;
        };
        match rules.check(s) {
            Ok(()) => Some(s.clone()),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn required_text(&mut self, name: &str, rules: &Text) -> Option<String> {
        let value = self.require(name)?;
        self.text_value(name, value, rules)
    }

    pub fn optional_text(&mut self, name: &str, rules: &Text) -> Option<String> {
        let value = self.present(name)?;
        self.text_value(name, value, rules)
    }

    pub fn required_int(&mut self, name: &str, rules: &Int) -> Option<i64> {
        let value = self.require(name)?;
        let Some(n) = value.as_i64() else {
            self.fail(name, Issue::new("value is not a valid integer", "type_error.integer"));
            return None;
        };
        match rules.check(n) {
            Ok(()) => Some(n),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn optional_float(&mut self, name: &str, rules: &Float) -> Option<f64> {
        let value = self.present(name)?;
        let Some(n) = value.as_f64() else {
            self.fail(name, Issue::new("value is not a valid float", "type_error.float"));
            return None;
        };
        match rules.check(n) {
            Ok(()) => Some(n),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn optional_bool(&mut self, name: &str) -> Option<bool> {
        let value = self.present(name)?;
        if let Value::Bool(b) = value {
            Some(*b)
        } else {
            self.fail(
                name,
                Issue::new("value could not be parsed to a boolean", "type_error.bool"),
            );
            None
        }
    }

    pub fn optional_choice<T: Choice>(&mut self, name: &str) -> Option<T> {
        let value = self.present(name)?;
        let parsed = value
            .as_str()
            .ok_or_else(|| Issue::new("str type expected", "type_error.str"))
            .and_then(T::parse_choice);
        match parsed {
            Ok(choice) => Some(choice),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Reader over textual key/value pairs (query string, path, form)
pub struct TextFields<'a> {
    pairs: &'a [(String, String)],
    source: &'static str,
    errors: Vec<FieldError>,
}

impl<'a> TextFields<'a> {
    pub fn new(pairs: &'a [(String, String)], source: &'static str) -> Self {
        Self {
            pairs,
            source,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, name: &str, issue: Issue) {
        self.errors.push(FieldError::new(
            vec![self.source.to_string(), name.to_string()],
            issue,
        ));
    }

    /// Value for `name`; when a key repeats the last occurrence wins
    fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn checked(&mut self, name: &str, value: &str, rules: &Text) -> Option<String> {
        match rules.check(value) {
            Ok(()) => Some(value.to_string()),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn required_text(&mut self, name: &str, rules: &Text) -> Option<String> {
        let Some(value) = self.get(name) else {
            self.fail(name, Issue::missing());
            return None;
        };
        self.checked(name, value, rules)
    }

    pub fn optional_text(&mut self, name: &str, rules: &Text) -> Option<String> {
        let value = self.get(name)?;
        self.checked(name, value, rules)
    }

    pub fn required_int(&mut self, name: &str, rules: &Int) -> Option<i128> {
        let Some(value) = self.get(name) else {
            self.fail(name, Issue::missing());
            return None;
        };
        match rules.parse(value) {
            Ok(n) => Some(n),
            Err(issue) => {
                self.fail(name, issue);
                None
            }
        }
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_collects_every_error() {
        let value = json!({ "name": 7, "age": "30" });
        let mut reader = JsonFields::new(&value, &["body"]).unwrap();
        assert_eq!(reader.required_text("name", &Text::ANY), None);
        assert_eq!(reader.required_int("age", &Int::new()), None);
        assert_eq!(reader.required_text("city", &Text::ANY), None);

        let errors = reader.finish();
        let kinds: Vec<&str> = errors.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["type_error.str", "type_error.integer", "value_error.missing"]
        );
        assert_eq!(errors[2].loc, vec!["body", "city"]);
    }

    #[test]
    fn test_json_null_handling() {
        let value = json!({ "is_married": null, "age": null });
        let mut reader = JsonFields::new(&value, &["body"]).unwrap();
        assert_eq!(reader.optional_bool("is_married"), None);
        assert_eq!(reader.required_int("age", &Int::new()), None);

        let errors = reader.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "type_error.none.not_allowed");
    }

    #[test]
    fn test_json_rejects_non_object() {
        let errors = JsonFields::new(&json!([1, 2]), &["body", "person"])
            .err()
            .unwrap();
        assert_eq!(errors[0].loc, vec!["body", "person"]);
        assert_eq!(errors[0].kind, "type_error.dict");

        let errors = JsonFields::new(&Value::Null, &["body"]).err().unwrap();
        assert_eq!(errors[0].kind, "value_error.missing");
    }

    #[test]
    fn test_json_does_not_coerce() {
        let value = json!({ "flag": "true", "weight": "70", "age": 30.5 });
        let mut reader = JsonFields::new(&value, &["body"]).unwrap();
        assert_eq!(reader.optional_bool("flag"), None);
        assert_eq!(reader.optional_float("weight", &Float::new()), None);
        assert_eq!(reader.required_int("age", &Int::new()), None);
        assert_eq!(reader.finish().len(), 3);
    }

    #[test]
    fn test_json_float_accepts_integers() {
        let value = json!({ "weight": 70 });
        let mut reader = JsonFields::new(&value, &["body"]).unwrap();
        assert_eq!(reader.optional_float("weight", &Float::new().gt(0.0)), Some(70.0));
        assert!(reader.finish().is_empty());
    }

    #[test]
    fn test_text_fields() {
        let pairs = vec![
            ("age".to_string(), "25".to_string()),
            ("age".to_string(), "99".to_string()),
            ("name".to_string(), String::new()),
        ];
        let mut reader = TextFields::new(&pairs, "query");
        assert_eq!(reader.required_text("age", &Text::ANY), Some("99".to_string()));
        assert_eq!(reader.optional_text("name", &Text::new().min(1)), None);
        assert_eq!(reader.optional_text("nickname", &Text::ANY), None);
        assert_eq!(reader.required_int("id", &Int::new()), None);

        let errors = reader.finish();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].loc, vec!["query", "name"]);
        assert_eq!(errors[1].loc, vec!["query", "id"]);
        assert_eq!(errors[1].kind, "value_error.missing");
    }
}
