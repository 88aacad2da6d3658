// Person schemas
//
// `Person` is the request model; `PersonOut` is its public view. The view is
// embedded by value and the password lives only on the outer struct, so
// `into_public_view` is the single place where the secret is dropped.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::fields::{Choice, Float, Format, Int, Text};
use super::reader::JsonFields;
use super::FieldError;

const NAME: Text = Text::new().min(1).max(50).format(Format::Alpha);
const AGE: Int = Int::new().gt(0).le(115);
const EMAIL: Text = Text::new().format(Format::Email);
const CREDIT_CARD: Text = Text::new().format(Format::PaymentCard);
const WEBSITE: Text = Text::new().format(Format::HttpUrl);
const WEIGHT: Float = Float::new().gt(0.0);
const PASSWORD: Text = Text::new().min(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HairColor {
    White,
    Brown,
    Black,
    Blonde,
    Red,
}

impl Choice for HairColor {
    const VARIANTS: &'static [&'static str] = &["white", "brown", "black", "blonde", "red"];

    fn from_variant(value: &str) -> Option<Self> {
        match value {
            "white" => Some(Self::White),
            "brown" => Some(Self::Brown),
            "black" => Some(Self::Black),
            "blonde" => Some(Self::Blonde),
            "red" => Some(Self::Red),
            _ => None,
        }
    }
}

/// String whose value never appears in `Debug` output or serialized data
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    const MASK: &'static str = "**********";

    pub const fn new(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(\"{}\")", Self::MASK)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::MASK)
    }
}

/// Public-safe view of a person
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonOut {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub hair_color: Option<HairColor>,
    pub is_married: Option<bool>,
    pub email: String,
    pub credit_card: String,
    pub website: String,
    pub weight: Option<f64>,
}

impl PersonOut {
    fn read(fields: &mut JsonFields<'_>) -> Option<Self> {
        let first_name = fields.required_text("first_name", &NAME);
        let last_name = fields.required_text("last_name", &NAME);
        let age = fields.required_int("age", &AGE);
        let hair_color = fields.optional_choice::<HairColor>("hair_color");
        let is_married = fields.optional_bool("is_married");
        let email = fields.required_text("email", &EMAIL);
        let credit_card = fields.required_text("credit_card", &CREDIT_CARD);
        let website = fields.required_text("website", &WEBSITE);
        let weight = fields.optional_float("weight", &WEIGHT);

        let (Some(first_name), Some(last_name), Some(age), Some(email), Some(credit_card), Some(website)) =
            (first_name, last_name, age, email, credit_card, website)
        else {
            return None;
        };
        Some(Self {
            first_name,
            last_name,
            age,
            hair_color,
            is_married,
            email,
            credit_card,
            website,
            weight,
        })
    }
}

/// A person as submitted by a client, password included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    #[serde(flatten)]
    pub profile: PersonOut,
    pub password: Secret,
}

impl Person {
    /// Validate `value` found at `loc` as a person
    pub fn from_json(value: &Value, loc: &[&str]) -> Result<Self, Vec<FieldError>> {
        let mut fields = JsonFields::new(value, loc)?;
        let profile = PersonOut::read(&mut fields);
        let password = fields.required_text("password", &PASSWORD);

        let errors = fields.finish();
        match (profile, password) {
            (Some(profile), Some(password)) if errors.is_empty() => Ok(Self {
                profile,
                password: Secret::new(password),
            }),
            _ => Err(errors),
        }
    }

    pub fn into_public_view(self) -> PersonOut {
        self.profile
    }
}

#[cfg(test)]
pub fn example_json() -> Value {
    serde_json::json!({
        "first_name": "Miguel",
        "last_name": "Torres",
        "age": 25,
        "hair_color": "black",
        "is_married": false,
        "email": "miguel@example.com",
        "credit_card": "4111111111111111",
        "website": "https://platzi.com",
        "weight": 72.5,
        "password": "supersecret"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_person() {
        let person = Person::from_json(&example_json(), &["body"]).unwrap();
        assert_eq!(person.profile.first_name, "Miguel");
        assert_eq!(person.profile.age, 25);
        assert_eq!(person.profile.hair_color, Some(HairColor::Black));
        assert_eq!(person.password, Secret::new("supersecret".to_string()));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut value = example_json();
        let object = value.as_object_mut().unwrap();
        object.remove("hair_color");
        object.remove("is_married");
        object.remove("weight");

        let person = Person::from_json(&value, &["body"]).unwrap();
        assert_eq!(person.profile.hair_color, None);
        assert_eq!(person.profile.is_married, None);
        assert_eq!(person.profile.weight, None);
    }

    #[test]
    fn test_public_view_has_no_password() {
        let person = Person::from_json(&example_json(), &["body"]).unwrap();
        let view = serde_json::to_value(person.into_public_view()).unwrap();
        let object = view.as_object().unwrap();
        assert!(!object.contains_key("password"));
        for key in [
            "first_name",
            "last_name",
            "age",
            "hair_color",
            "is_married",
            "email",
            "credit_card",
            "website",
            "weight",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_secret_is_masked() {
        let person = Person::from_json(&example_json(), &["body"]).unwrap();
        assert!(!format!("{person:?}").contains("supersecret"));

        let full = serde_json::to_value(&person).unwrap();
        assert_eq!(full["password"], "**********");
        assert_eq!(full["first_name"], "Miguel");
    }

    #[test]
    fn test_short_password_rejected() {
        let mut value = example_json();
        value["password"] = json!("short");
        let errors = Person::from_json(&value, &["body"]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc, vec!["body", "password"]);
        assert_eq!(errors[0].kind, "value_error.any_str.min_length");
    }

    #[test]
    fn test_age_bounds() {
        for age in [0, -1, 116, 500] {
            let mut value = example_json();
            value["age"] = json!(age);
            let errors = Person::from_json(&value, &["body"]).unwrap_err();
            assert_eq!(errors[0].loc, vec!["body", "age"], "age {age}");
        }
        for age in [1, 115] {
            let mut value = example_json();
            value["age"] = json!(age);
            assert!(Person::from_json(&value, &["body"]).is_ok(), "age {age}");
        }
    }

    #[test]
    fn test_every_violation_is_reported() {
        let value = json!({
            "first_name": "",
            "last_name": "Torres",
            "age": 200,
            "hair_color": "green",
            "email": "not-an-email",
            "credit_card": "1234",
            "website": "platzi",
            "weight": -1,
            "password": "123"
        });
        let errors = Person::from_json(&value, &["body", "person"]).unwrap_err();
        let locs: Vec<String> = errors.iter().map(FieldError::location).collect();
        assert_eq!(
            locs,
            vec![
                "body.person.first_name",
                "body.person.age",
                "body.person.hair_color",
                "body.person.email",
                "body.person.credit_card",
                "body.person.website",
                "body.person.weight",
                "body.person.password",
            ]
        );
    }

    #[test]
    fn test_hair_color_choices() {
        assert_eq!(HairColor::from_variant("blonde"), Some(HairColor::Blonde));
        assert_eq!(HairColor::from_variant("Blonde"), None);
        let issue = HairColor::parse_choice("green").unwrap_err();
        assert_eq!(issue.kind, "type_error.enum");
        assert!(issue.msg.contains("'white', 'brown', 'black', 'blonde', 'red'"));
    }
}
