use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::middleware::{Middleware, Next};
use crate::server::{Params, Request, Response};

pub const MISSING_ELEMENT: &str = "Required element is missing or undefined";
pub const INVALID_TYPE: &str = "Invalid type: expected";
pub const UNKNOWN_ELEMENT: &str = "Element does not exist in validator";
pub const PAYLOAD_UNAVAILABLE: &str = "Unable to parse payload, missing or malformed";
/// Error key used when no payload source is available at all.
pub const PAYLOAD_ERROR_KEY: &str = "Validation";
pub const DEFAULT_ERROR_LIST_NAME: &str = "errors";

/// Field name to failure message.
pub type ValidationErrors = BTreeMap<String, String>;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Rule for one payload field: predicate, optionality and failure message.
///
/// Cheap to clone; clones share the predicate.
#[derive(Clone)]
pub struct FieldValidator {
    predicate: Predicate,
    optional: bool,
    message: Option<Arc<str>>,
}

impl FieldValidator {
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Message recorded when the predicate rejects a value.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(INVALID_TYPE)
    }

    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("optional", &self.optional)
            .field("message", &self.message())
            .finish()
    }
}

/// Produces required and optional [`FieldValidator`]s from one predicate.
///
/// ```
/// use consume::validator::ValidatorFactory;
/// use serde_json::json;
///
/// let even = ValidatorFactory::new(|v| v.as_i64().map_or(false, |n| n % 2 == 0))
///     .with_message("expected an even number");
/// assert!(even.required().accepts(&json!(4)));
/// assert!(even.optional().is_optional());
/// ```
#[derive(Clone)]
pub struct ValidatorFactory {
    predicate: Predicate,
    message: Option<Arc<str>>,
}

impl ValidatorFactory {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(Arc::from(message.into()));
        self
    }

    /// Absent fields are reported as missing.
    #[must_use]
    pub fn required(&self) -> FieldValidator {
        self.build(false)
    }

    /// Absent fields are accepted.
    #[must_use]
    pub fn optional(&self) -> FieldValidator {
        self.build(true)
    }

    fn build(&self, optional: bool) -> FieldValidator {
        FieldValidator {
            predicate: Arc::clone(&self.predicate),
            optional,
            message: self.message.clone(),
        }
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("message", &self.message)
            .finish()
    }
}

#[must_use]
pub fn string() -> ValidatorFactory {
    ValidatorFactory::new(Value::is_string).with_message("Invalid type: expected string")
}

#[must_use]
pub fn number() -> ValidatorFactory {
    ValidatorFactory::new(Value::is_number).with_message("Invalid type: expected number")
}

#[must_use]
pub fn boolean() -> ValidatorFactory {
    ValidatorFactory::new(Value::is_boolean).with_message("Invalid type: expected boolean")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Reject payload fields that have no validator.
    pub no_extra_elements: bool,
    /// Key the error map is nested under in the 400 body.
    pub error_list_name: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            no_extra_elements: false,
            error_list_name: DEFAULT_ERROR_LIST_NAME.to_string(),
        }
    }
}

/// Which part of the request was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Body,
    PathParams,
    SearchParams,
}

fn params_to_map(params: &Params) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Pick the payload to validate: the body if it has fields, else the path
/// parameters, else the query parameters. Sources are never merged.
///
/// Parameter values are exposed as JSON strings.
#[must_use]
pub fn select_payload(req: &Request) -> Option<(PayloadSource, Map<String, Value>)> {
    if !req.body().is_empty() {
        Some((PayloadSource::Body, req.body().clone()))
    } else if !req.path_params().is_empty() {
        Some((PayloadSource::PathParams, params_to_map(req.path_params())))
    } else if !req.search_params().is_empty() {
        Some((PayloadSource::SearchParams, params_to_map(req.search_params())))
    } else {
        None
    }
}

/// Middleware that checks the request payload against a set of field rules.
///
/// On failure it replies 400 with `{error_list_name: {field: message}}` and
/// the downstream handler never runs.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    fields: BTreeMap<String, FieldValidator>,
    options: ValidatorOptions,
}

impl PayloadValidator {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValidator)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            options: ValidatorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Classify `payload` against the field rules. Never mutates anything.
    #[must_use]
    pub fn check_payload(&self, payload: Option<&Map<String, Value>>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Some(payload) = payload else {
            errors.insert(PAYLOAD_ERROR_KEY.to_string(), PAYLOAD_UNAVAILABLE.to_string());
            return errors;
        };

        for (name, rule) in &self.fields {
            match payload.get(name) {
                None if !rule.is_optional() => {
                    errors.insert(name.clone(), MISSING_ELEMENT.to_string());
                }
                None => {}
                Some(value) if !rule.accepts(value) => {
                    errors.insert(name.clone(), rule.message().to_string());
                }
                Some(_) => {}
            }
        }

        if self.options.no_extra_elements {
            for name in payload.keys() {
                if !self.fields.contains_key(name) {
                    errors.insert(name.clone(), UNKNOWN_ELEMENT.to_string());
                }
            }
        }
        errors
    }

    /// Select the request payload and classify it.
    #[must_use]
    pub fn check(&self, req: &Request) -> ValidationErrors {
        let selected = select_payload(req);
        self.check_payload(selected.as_ref().map(|(_, payload)| payload))
    }
}

impl Middleware for PayloadValidator {
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>) {
        let errors = self.check(req);
        if errors.is_empty() {
            next.run(req, res);
            return;
        }
        debug!(
            request_id = %req.request_id(),
            error_count = errors.len(),
            fields = ?errors.keys().collect::<Vec<_>>(),
            "Payload validation failed"
        );
        let mut body = Map::new();
        body.insert(self.options.error_list_name.clone(), json!(errors));
        res.reply(400, Value::Object(body));
    }
}

/// Build a [`PayloadValidator`] from field rules and options.
pub fn validate<I, K>(fields: I, options: ValidatorOptions) -> PayloadValidator
where
    I: IntoIterator<Item = (K, FieldValidator)>,
    K: Into<String>,
{
    PayloadValidator::new(fields).with_options(options)
}
