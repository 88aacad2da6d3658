// API handlers module
// One function per route; each validates its inputs in full before acting

use hyper::header::USER_AGENT;
use hyper::StatusCode;
use serde_json::{json, Value};

use super::{ApiError, Reply, RouteContext};
use crate::config::AppState;
use crate::http::ApiRequest;
use crate::logger;
use crate::schema::fields::{Int, Text};
use crate::schema::{
    collect, ContactForm, FieldError, Issue, Location, LoginForm, LoginOut, Person, TextFields,
};

const QUERY_NAME: Text = Text::new().min(1).max(50);
const PERSON_ID: Int = Int::new().gt(0);

/// Map key used when the optional `name` query parameter is absent
pub const ABSENT_NAME_KEY: &str = "null";
pub const PERSON_NOT_FOUND: &str = "This person doesn't exist!";
const PERSON_EXISTS: &str = "It exists!";

/// Status for routes whose historical code is not 200
fn success_status(state: &AppState, legacy: StatusCode) -> StatusCode {
    if state.config.compat.legacy_status_codes {
        legacy
    } else {
        StatusCode::OK
    }
}

/// Decode the JSON request body; a missing body is a missing field
fn json_body(request: &ApiRequest) -> Result<Value, Vec<FieldError>> {
    let body_loc = || vec!["body".to_string()];
    if request.body.iter().all(u8::is_ascii_whitespace) {
        return Err(vec![FieldError::new(body_loc(), Issue::missing())]);
    }
    serde_json::from_slice(&request.body).map_err(|e| {
        vec![FieldError::new(
            body_loc(),
            Issue::new(e.to_string(), "value_error.jsondecode"),
        )]
    })
}

/// Validated `person_id` path parameter
fn person_id(ctx: &RouteContext<'_>, errors: &mut Vec<FieldError>) -> Option<i128> {
    let mut path = TextFields::new(ctx.params, "path");
    let person_id = path.required_int("person_id", &PERSON_ID);
    errors.extend(path.finish());
    person_id
}

/// GET /
pub fn home(_ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    Ok(Reply::ok(json!({ "message": "Hello World" })))
}

/// POST /person/new
pub fn create_person(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let body = json_body(ctx.request).map_err(ApiError::Validation)?;
    let person = Person::from_json(&body, &["body"]).map_err(ApiError::Validation)?;
    Reply::model(StatusCode::CREATED, &person.into_public_view())
}

/// GET /person/detail?name=..&age=..
pub fn show_person_by_query(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let pairs = ctx.request.query_pairs();
    let mut query = TextFields::new(&pairs, "query");
    let name = query.optional_text("name", &QUERY_NAME);
    let age = query.required_text("age", &Text::ANY);

    let errors = query.finish();
    match age {
        Some(age) if errors.is_empty() => Ok(Reply::single_entry(
            StatusCode::OK,
            name.unwrap_or_else(|| ABSENT_NAME_KEY.to_string()),
            Value::String(age),
        )),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// GET /person/detail/{person_id}
pub fn show_person_by_id(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let mut errors = Vec::new();
    let Some(person_id) = person_id(ctx, &mut errors) else {
        return Err(ApiError::Validation(errors));
    };

    if !ctx.state.registry.contains(person_id) {
        return Err(ApiError::not_found(PERSON_NOT_FOUND));
    }
    Ok(Reply::single_entry(
        success_status(ctx.state, StatusCode::CREATED),
        person_id.to_string(),
        Value::String(PERSON_EXISTS.to_string()),
    ))
}

/// PUT /person/{person_id} with body `{"person": {..}, "location": {..}}`
pub fn update_person(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let mut errors = Vec::new();
    let person_id = person_id(ctx, &mut errors);

    let (person, location) = match json_body(ctx.request) {
        Ok(body) => (
            collect(
                Person::from_json(body.get("person").unwrap_or(&Value::Null), &["body", "person"]),
                &mut errors,
            ),
            collect(
                Location::from_json(
                    body.get("location").unwrap_or(&Value::Null),
                    &["body", "location"],
                ),
                &mut errors,
            ),
        ),
        Err(mut found) => {
            errors.append(&mut found);
            (None, None)
        }
    };

    let (Some(_), Some(person), Some(location)) = (person_id, person, location) else {
        return Err(ApiError::Validation(errors));
    };

    // Location keys win on collision
    let mut merged = match serde_json::to_value(&person)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(map) = serde_json::to_value(&location)? {
        merged.extend(map);
    }
    Ok(Reply::new(
        success_status(ctx.state, StatusCode::NO_CONTENT),
        Value::Object(merged),
    ))
}

/// POST /login (form fields)
pub fn login(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let form = ctx.request.form()?;
    let credentials = LoginForm::from_pairs(&form.fields).map_err(ApiError::Validation)?;
    let out = LoginOut::new(credentials.username).map_err(ApiError::ResponseValidation)?;
    Reply::model(StatusCode::OK, &out)
}

/// POST /contact (form fields, `User-Agent` header, `ads` cookie)
pub fn contact(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let form = ctx.request.form()?;
    let message = ContactForm::from_pairs(&form.fields).map_err(ApiError::Validation)?;
    let user_agent = ctx.request.header(&USER_AGENT);
    let ads = ctx.request.cookie("ads");

    logger::log_info(&format!(
        "[Contact] Message from {} {} <{}> ({} chars, ads cookie: {})",
        message.first_name,
        message.last_name,
        message.email,
        message.message.chars().count(),
        ads.as_deref().unwrap_or("none"),
    ));

    Ok(Reply::ok(
        user_agent.map_or(Value::Null, |v| Value::String(v.to_string())),
    ))
}

/// POST /post-image (multipart field `image`)
pub fn post_image(ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    let form = ctx.request.form()?;
    let Some(image) = form.file("image") else {
        let issue = if form.has_field("image") {
            Issue::new("expected an uploaded file", "value_error.upload")
        } else {
            Issue::missing()
        };
        return Err(ApiError::Validation(vec![FieldError::new(
            vec!["body".to_string(), "image".to_string()],
            issue,
        )]));
    };

    Ok(Reply::ok(json!({
        "Filename": image.filename,
        "Format": image.content_type,
        "Size(kb)": image.size_kb(),
    })))
}

/// GET /healthz and GET /readyz
pub fn health(_ctx: &RouteContext<'_>) -> Result<Reply, ApiError> {
    Ok(Reply::ok(json!({ "status": "ok" })))
}
