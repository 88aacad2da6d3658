// API module entry
// Person API route table and dispatch

mod error;
mod handlers;
mod response;

use std::sync::OnceLock;

use hyper::Method;

use crate::config::AppState;
use crate::http::ApiRequest;
use crate::logger;
use crate::routing::{PathParams, RouteMatch, RouteTable};
use crate::schema::FieldError;

pub use error::ApiError;
pub use handlers::{ABSENT_NAME_KEY, PERSON_NOT_FOUND};
pub use response::Reply;

/// Everything a handler may read about the current request
pub struct RouteContext<'a> {
    pub request: &'a ApiRequest,
    pub params: &'a PathParams,
    pub state: &'a AppState,
}

pub type HandlerFn = fn(&RouteContext<'_>) -> Result<Reply, ApiError>;

static ROUTES: OnceLock<RouteTable<HandlerFn>> = OnceLock::new();

/// The route table, built on first use
pub fn routes() -> &'static RouteTable<HandlerFn> {
    ROUTES.get_or_init(|| {
        RouteTable::<HandlerFn>::new()
            .route(Method::GET, "/", handlers::home)
            .route(Method::GET, "/healthz", handlers::health)
            .route(Method::GET, "/readyz", handlers::health)
            .route(Method::POST, "/person/new", handlers::create_person)
            .route(Method::GET, "/person/detail", handlers::show_person_by_query)
            .route(Method::GET, "/person/detail/{person_id}", handlers::show_person_by_id)
            .route(Method::PUT, "/person/{person_id}", handlers::update_person)
            .route(Method::POST, "/login", handlers::login)
            .route(Method::POST, "/contact", handlers::contact)
            .route(Method::POST, "/post-image", handlers::post_image)
    })
}

/// Route a buffered request to its handler
pub fn dispatch(request: &ApiRequest, state: &AppState) -> Result<Reply, ApiError> {
    let result = match routes().lookup(&request.method, &request.path) {
        RouteMatch::Found { target, params } => target(&RouteContext {
            request,
            params: &params,
            state,
        }),
        RouteMatch::MethodNotAllowed { allow } => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                request.method, request.path
            ));
            Err(ApiError::MethodNotAllowed { allow })
        }
        RouteMatch::NotFound => Err(ApiError::RouteNotFound(request.path.clone())),
    };

    match &result {
        Err(ApiError::Validation(errors)) => {
            let fields: Vec<String> = errors.iter().map(FieldError::location).collect();
            logger::log_validation_failure(request.method.as_str(), &request.path, &fields);
        }
        Err(err) if err.is_server_error() => logger::log_error(&format!(
            "{} {} failed: {err}",
            request.method, request.path
        )),
        _ => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::request::TestRequest;
    use hyper::StatusCode;

    fn state() -> AppState {
        AppState::new(&Config::from_toml_str("").unwrap())
    }

    #[test]
    fn test_route_table_size() {
        assert_eq!(routes().len(), 10);
    }

    #[test]
    fn test_unknown_route() {
        let err = dispatch(&TestRequest::new(Method::GET, "/nowhere").build(), &state()).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body(), serde_json::json!({ "detail": "Not Found" }));
    }

    #[test]
    fn test_wrong_method() {
        let err = dispatch(&TestRequest::new(Method::GET, "/login").build(), &state()).unwrap_err();
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        let ApiError::MethodNotAllowed { allow } = err else {
            panic!("expected 405");
        };
        assert_eq!(allow, vec![Method::POST]);
    }

    #[test]
    fn test_trailing_slash_is_distinct() {
        let err = dispatch(&TestRequest::new(Method::POST, "/person/new/").build(), &state())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_known_ids_come_from_config() {
        let state = AppState::new(&Config::from_toml_str("[people]\nknown_ids = [42]").unwrap());
        assert!(dispatch(&TestRequest::new(Method::GET, "/person/detail/42").build(), &state).is_ok());
        assert!(dispatch(&TestRequest::new(Method::GET, "/person/detail/1").build(), &state).is_err());
    }
}
