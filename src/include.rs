//! Include directive formatting.
//!
//! Rewritten occurrences use the `@@include('./partials/<name>')` directive
//! understood by gulp-style file-include pipelines, so extracted output plugs
//! straight into an existing template build. Parameterized partials take a
//! JSON object as the second argument.

/// Directory under the destination root that holds extracted partials.
pub const PARTIALS_DIR: &str = "partials";

/// The directive text an occurrence is replaced with.
pub fn include_statement(partial_name: &str) -> String {
    format!("@@include('./{PARTIALS_DIR}/{partial_name}')")
}

/// A directive carrying one string parameter for the partial to interpolate.
pub fn include_statement_with(partial_name: &str, key: &str, value: &str) -> String {
    // serde_json handles quoting and escaping of both sides.
    let key = serde_json::Value::String(key.to_string());
    let value = serde_json::Value::String(value.to_string());
    format!("@@include('./{PARTIALS_DIR}/{partial_name}', {{{key}: {value}}})")
}
