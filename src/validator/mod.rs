//! # Validator Module
//!
//! Per-field payload validation, usable as global middleware or as an
//! endpoint pre-handler.
//!
//! ## Overview
//!
//! A [`FieldValidator`] pairs a predicate over a JSON value with an
//! optionality flag and a failure message. [`ValidatorFactory`] produces the
//! required and optional forms from one predicate; [`string`], [`number`]
//! and [`boolean`] are the stock factories.
//!
//! A [`PayloadValidator`] checks a whole request:
//!
//! 1. The payload is the body if it has fields, else the path parameters,
//!    else the query parameters. With none of them there is a single
//!    `Validation` error and no per-field checks.
//! 2. Every declared field is checked: missing and required, or present and
//!    rejected by its predicate.
//! 3. With `no_extra_elements`, payload fields without a rule are flagged.
//!
//! Any error produces a 400 reply with the error map nested under
//! `error_list_name` (default `errors`) and the handler is skipped.
//!
//! ## Example
//!
//! ```rust
//! use consume::validator::{number, string, validate, ValidatorOptions};
//!
//! let add_user = validate(
//!     [
//!         ("firstname", string().required()),
//!         ("surname", string().required()),
//!         ("age", number().optional()),
//!     ],
//!     ValidatorOptions::default(),
//! );
//! assert!(!add_user.options().no_extra_elements);
//! ```

mod core;

pub use core::{
    boolean, number, select_payload, string, validate, FieldValidator, PayloadSource,
    PayloadValidator, ValidationErrors, ValidatorFactory, ValidatorOptions,
    DEFAULT_ERROR_LIST_NAME, INVALID_TYPE, MISSING_ELEMENT, PAYLOAD_ERROR_KEY,
    PAYLOAD_UNAVAILABLE, UNKNOWN_ELEMENT,
};
