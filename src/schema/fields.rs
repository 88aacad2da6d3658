//! Field constraints
//!
//! Each constraint is a small `const`-buildable value attached to a schema
//! field. `check` returns the first violated rule as an [`Issue`]; the
//! readers in `schema::reader` attach the field location.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};
use validator::{ValidateCreditCard, ValidateEmail};

/// One violated rule, before a location is attached
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub msg: String,
    pub kind: &'static str,
    pub ctx: Option<Value>,
}

impl Issue {
    pub fn new(msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            msg: msg.into(),
            kind,
            ctx: None,
        }
    }

    #[must_use]
    pub fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn missing() -> Self {
        Self::new("field required", "value_error.missing")
    }

    pub fn none_not_allowed() -> Self {
        Self::new("none is not an allowed value", "type_error.none.not_allowed")
    }
}

/// Content format a text field must satisfy after its length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Any,
    /// ASCII letters and spaces only
    Alpha,
    Email,
    PaymentCard,
    HttpUrl,
}

pub const ALPHA_PATTERN: &str = r"^[A-Za-z ]+$";
const MAX_URL_LENGTH: usize = 2083;

fn alpha_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ALPHA_PATTERN).expect("valid regex"))
}

/// String field constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Format,
}

impl Text {
    pub const ANY: Self = Self::new();

    pub const fn new() -> Self {
        Self {
            min_length: None,
            max_length: None,
            format: Format::Any,
        }
    }

    pub const fn min(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub const fn max(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn check(&self, value: &str) -> Result<(), Issue> {
        let length = value.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(Issue::new(
                    format!("ensure this value has at least {min} characters"),
                    "value_error.any_str.min_length",
                )
                .with_ctx(json!({ "limit_value": min })));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(too_long(max));
            }
        }

        match self.format {
            Format::Any => Ok(()),
            Format::Alpha => check_pattern(value, alpha_regex(), ALPHA_PATTERN),
            Format::Email => check_email(value),
            Format::PaymentCard => check_payment_card(value),
            Format::HttpUrl => check_http_url(value),
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

fn too_long(max: usize) -> Issue {
    Issue::new(
        format!("ensure this value has at most {max} characters"),
        "value_error.any_str.max_length",
    )
    .with_ctx(json!({ "limit_value": max }))
}

fn check_pattern(value: &str, re: &Regex, source: &str) -> Result<(), Issue> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(
            Issue::new(format!("string does not match regex \"{source}\""), "value_error.str.regex")
                .with_ctx(json!({ "pattern": source })),
        )
    }
}

fn check_email(value: &str) -> Result<(), Issue> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(Issue::new("value is not a valid email address", "value_error.email"))
    }
}

/// Digit and length checks first, then Luhn and issuer length through `validator`
fn check_payment_card(value: &str) -> Result<(), Issue> {
    let digits = value.trim();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Issue::new(
            "card number is not all digits",
            "value_error.payment_card_number.digits",
        ));
    }
    if digits.len() < 12 {
        return Err(Issue::new(
            "ensure this value has at least 12 characters",
            "value_error.any_str.min_length",
        )
        .with_ctx(json!({ "limit_value": 12 })));
    }
    if digits.len() > 19 {
        return Err(too_long(19));
    }
    if !digits.validate_credit_card() {
        return Err(Issue::new(
            "card number is not valid",
            "value_error.payment_card_number",
        ));
    }
    Ok(())
}

fn check_http_url(value: &str) -> Result<(), Issue> {
    if value.chars().count() > MAX_URL_LENGTH {
        return Err(too_long(MAX_URL_LENGTH));
    }
    if !value.contains("://") {
        return Err(Issue::new("invalid or missing URL scheme", "value_error.url.scheme"));
    }
    let parsed = url::Url::parse(value)
        .map_err(|_| Issue::new("invalid or missing URL scheme", "value_error.url.scheme"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Issue::new("URL scheme not permitted", "value_error.url.scheme")
            .with_ctx(json!({ "allowed_schemes": ["http", "https"] })));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(Issue::new("URL host invalid", "value_error.url.host")),
    }
}

/// Integer field constraint (exclusive lower bound, inclusive upper bound)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int {
    pub gt: Option<i64>,
    pub le: Option<i64>,
}

impl Int {
    pub const fn new() -> Self {
        Self { gt: None, le: None }
    }

    pub const fn gt(mut self, bound: i64) -> Self {
        self.gt = Some(bound);
        self
    }

    pub const fn le(mut self, bound: i64) -> Self {
        self.le = Some(bound);
        self
    }

    pub fn check(&self, value: impl Into<i128>) -> Result<(), Issue> {
        let value = value.into();
        if let Some(gt) = self.gt {
            if value <= i128::from(gt) {
                return Err(Issue::new(
                    format!("ensure this value is greater than {gt}"),
                    "value_error.number.not_gt",
                )
                .with_ctx(json!({ "limit_value": gt })));
            }
        }
        if let Some(le) = self.le {
            if value > i128::from(le) {
                return Err(Issue::new(
                    format!("ensure this value is less than or equal to {le}"),
                    "value_error.number.not_le",
                )
                .with_ctx(json!({ "limit_value": le })));
            }
        }
        Ok(())
    }

    /// Parse a textual value (query, path or form) and check it.
    ///
    /// Parsed as `i128` so integers past the `i64` range still reach the bounds check.
    pub fn parse(&self, raw: &str) -> Result<i128, Issue> {
        let value = raw
            .trim()
            .parse::<i128>()
            .map_err(|_| Issue::new("value is not a valid integer", "type_error.integer"))?;
        self.check(value)?;
        Ok(value)
    }
}

impl Default for Int {
    fn default() -> Self {
        Self::new()
    }
}

/// Float field constraint (exclusive lower bound)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float {
    pub gt: Option<f64>,
}

impl Float {
    pub const fn new() -> Self {
        Self { gt: None }
    }

    pub const fn gt(mut self, bound: f64) -> Self {
        self.gt = Some(bound);
        self
    }

    pub fn check(&self, value: f64) -> Result<(), Issue> {
        if !value.is_finite() {
            return Err(Issue::new("value is not a valid float", "type_error.float"));
        }
        match self.gt {
            Some(gt) if value <= gt => Err(Issue::new(
                format!("ensure this value is greater than {gt}"),
                "value_error.number.not_gt",
            )
            .with_ctx(json!({ "limit_value": gt }))),
            _ => Ok(()),
        }
    }
}

impl Default for Float {
    fn default() -> Self {
        Self::new()
    }
}

/// A closed set of string values usable as a field type
pub trait Choice: Sized {
    const VARIANTS: &'static [&'static str];

    fn from_variant(value: &str) -> Option<Self>;

    fn parse_choice(value: &str) -> Result<Self, Issue> {
        Self::from_variant(value).ok_or_else(|| {
            let permitted = Self::VARIANTS
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(", ");
            Issue::new(
                format!("value is not a valid enumeration member; permitted: {permitted}"),
                "type_error.enum",
            )
            .with_ctx(json!({ "enum_values": Self::VARIANTS }))
        })
    }
}
