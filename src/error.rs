use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

/// Pipeline stage in which a failure occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ParsingInput,
    Resolving,
    Routing,
    Decoding,
    Rendering,
    Recording,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParsingInput => "parsing_input",
            Self::Resolving => "resolving",
            Self::Routing => "routing",
            Self::Decoding => "decoding",
            Self::Rendering => "rendering",
            Self::Recording => "recording",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw upstream exchange that caused a failure. Kept for diagnostics only.
#[derive(Clone, Debug)]
pub struct Upstream {
    pub status: u16,
    pub body: String,
}

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub stage: Option<Stage>,
    pub upstream: Option<Upstream>,
}

impl Error {
    fn new(code: i32, message: String, stage: Option<Stage>) -> Self {
        Self {
            code,
            message,
            stage,
            upstream: None,
        }
    }

    pub fn with_upstream(mut self, status: u16, body: String) -> Self {
        self.upstream = Some(Upstream { status, body });
        self
    }

    pub fn is_internal(&self) -> bool {
        (1..=99).contains(&self.code)
    }

    pub fn is_client(&self) -> bool {
        (100..=199).contains(&self.code)
    }

    /// Attributes a collaborator failure to `stage`, keeping any upstream details.
    pub fn in_stage(self, stage: Stage) -> Self {
        if self.stage == Some(stage) {
            return self;
        }

        let mut err = match stage {
            Stage::ParsingInput => invalid_input_error(self.message),
            Stage::Resolving if self.is_client() => resolution_error(self.message),
            Stage::Resolving => resolution_unavailable_error(self.message),
            Stage::Routing => route_unavailable_error(self.message),
            Stage::Decoding => decode_error(self.message),
            Stage::Rendering => render_error(self.message),
            Stage::Recording => record_error(self.message),
        };
        err.upstream = self.upstream;

        err
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "[{}] {} (code {})", stage, self.message, self.code),
            None => write!(f, "{} (code {})", self.message, self.code),
        }
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            104 => (StatusCode::NOT_FOUND, self.message.as_str()),
            200..=299 => (StatusCode::BAD_GATEWAY, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
            "stage": self.stage,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error<T: Display>(reason: T) -> Error {
    Error::new(
        100,
        format!("invalid input: {}", reason),
        Some(Stage::ParsingInput),
    )
}

pub fn resolution_error<T: Display>(reason: T) -> Error {
    Error::new(
        101,
        format!("could not resolve location: {}", reason),
        Some(Stage::Resolving),
    )
}

pub fn resolution_unavailable_error<T: Display>(reason: T) -> Error {
    Error::new(
        201,
        format!("location lookup unavailable: {}", reason),
        Some(Stage::Resolving),
    )
}

pub fn not_found_error() -> Error {
    Error::new(104, "not found".into(), None)
}

pub fn route_unavailable_error<T: Display>(reason: T) -> Error {
    Error::new(
        200,
        format!("route unavailable: {}", reason),
        Some(Stage::Routing),
    )
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error::new(1, format!("environment variable error: {}", err), None)
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);

    Error::new(2, "database error".into(), None)
}

pub fn unexpected_error<T: Display>(reason: T) -> Error {
    Error::new(5, format!("unexpected error: {}", reason), None)
}

pub fn decode_error<T: Display>(reason: T) -> Error {
    Error::new(
        6,
        format!("malformed encoded path: {}", reason),
        Some(Stage::Decoding),
    )
}

pub fn render_error<T: Display>(reason: T) -> Error {
    Error::new(
        7,
        format!("failed to render map: {}", reason),
        Some(Stage::Rendering),
    )
}

pub fn record_error<T: Display>(reason: T) -> Error {
    Error::new(
        8,
        format!("failed to record history: {}", reason),
        Some(Stage::Recording),
    )
}

pub fn config_error<T: Display>(key: &str, reason: T) -> Error {
    Error::new(9, format!("invalid value for {}: {}", key, reason), None)
}

#[test]
fn internal_errors_hide_their_message() {
    use axum::body::HttpBody;
    use tokio_test::block_on;

    let response = render_error("disk full").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = response.into_body();
    let bytes = block_on(body.data()).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["code"], 7);
    assert_eq!(value["error"], "Internal Server Error");
    assert_eq!(value["stage"], "rendering");
}

#[test]
fn error_classes_map_to_status_codes() {
    assert_eq!(
        invalid_input_error("empty").into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        resolution_error("ZERO_RESULTS").into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        route_unavailable_error("status 503")
            .with_upstream(503, "{}".into())
            .into_response()
            .status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        not_found_error().into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        decode_error("unterminated").into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn in_stage_relabels_foreign_failures() {
    let err = unexpected_error("connection reset")
        .with_upstream(500, "oops".into())
        .in_stage(Stage::Routing);

    assert_eq!(err.code, 200);
    assert_eq!(err.stage, Some(Stage::Routing));
    assert_eq!(err.upstream.unwrap().status, 500);

    let err = resolution_error("ZERO_RESULTS").in_stage(Stage::Resolving);
    assert_eq!(err.message, "could not resolve location: ZERO_RESULTS");
}

#[test]
fn geocoder_outages_are_upstream_failures() {
    let err = resolution_unavailable_error("status 503")
        .with_upstream(503, "{}".into())
        .in_stage(Stage::Resolving);
    assert_eq!(err.code, 201);
    assert_eq!(err.upstream.as_ref().unwrap().status, 503);
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

    let err = unexpected_error("connection reset").in_stage(Stage::Resolving);
    assert_eq!(err.code, 201);
    assert_eq!(err.stage, Some(Stage::Resolving));

    let err = invalid_input_error("blank").in_stage(Stage::Resolving);
    assert_eq!(err.code, 101);
}

#[test]
fn display_includes_stage() {
    let err = resolution_error("ZERO_RESULTS");

    assert_eq!(
        err.to_string(),
        "[resolving] could not resolve location: ZERO_RESULTS (code 101)"
    );
    assert!(!err.is_internal());
    assert!(record_error("timeout").is_internal());
}
