//! OpenAPI document handling for gateway-config-gen
//!
//! This crate owns the input side of the pipeline: loading the canonical
//! OpenAPI 3.x document, validating it before any generation occurs, and
//! extracting the normalized route list that every adapter consumes.
//!
//! ## Usage
//! ```rust,ignore
//! use gateway_config_gen_spec::{extract_routes, load_spec, validate};
//!
//! let spec = load_spec("api.yaml")?;
//! let report = validate(&spec);
//! let routes = extract_routes(&spec, &backends)?;
//! ```

pub mod openapi;
pub mod routes;

pub use openapi::{load_spec, parse_spec, validate, OpenApiSpec, SecurityScheme};
pub use routes::{extract_routes, resolve_backend, BackendResolution};
