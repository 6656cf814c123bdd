//! Test report parsing and rendering.
//!
//! A `test-var-query` response carries two structured fields:
//!
//! - `results`: map of namespace → var → sequence of assertion maps
//!   (`type`, `message`, `context`, `expected`, `actual`, `diffs`, `line`);
//! - `summary`: assertion counts (`test`, `var`, `pass`, `fail`, `error`).
//!
//! [`parse`] keeps the failing assertions and folds the counts into one
//! human-readable summary line; [`render_failure_lines`] produces the
//! buffer block the workflow appends for each failure.

use crate::message::DoneResponse;
use crate::strutil;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One failing or erroring assertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestFailure {
    /// Source line of the assertion, when the server reports one.
    pub line: Option<i64>,
    /// Short description: the assertion message, its context, or the var.
    pub text: String,
    pub expected: String,
    pub actual: String,
    /// Pre-rendered diff text, when the server sent diffs.
    pub diffs: Option<String>,
}

/// Overall outcome of a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub success: bool,
    pub message: String,
}

/// Parsed result of one `test-var-query` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub failures: Vec<TestFailure>,
    pub summary: TestSummary,
}

/// Parse the aggregated response of a `test-var-query` operation.
///
/// Values that do not match the expected shape are skipped, never coerced;
/// a response with no parseable `summary` field counts as a failed run.
pub fn parse(response: &DoneResponse) -> TestReport {
    let mut failures = Vec::new();
    for results in response.get_all("results") {
        let Some(by_ns) = results.as_object() else {
            continue;
        };
        for (ns, vars) in by_ns {
            let Some(by_var) = vars.as_object() else {
                continue;
            };
            for (var, assertions) in by_var {
                let Some(assertions) = assertions.as_array() else {
                    continue;
                };
                for assertion in assertions {
                    if let Some(failure) = parse_assertion(ns, var, assertion) {
                        failures.push(failure);
                    }
                }
            }
        }
    }

    TestReport {
        failures,
        summary: parse_summary(response),
    }
}

fn parse_assertion(ns: &str, var: &str, assertion: &Value) -> Option<TestFailure> {
    let assertion = assertion.as_object()?;
    let kind = assertion.get("type").and_then(Value::as_str)?;
    if kind != "fail" && kind != "error" {
        return None;
    }

    let text = non_empty_str(assertion.get("message"))
        .or_else(|| non_empty_str(assertion.get("context")))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{ns}/{var}"));

    Some(TestFailure {
        line: assertion.get("line").and_then(Value::as_i64),
        text,
        expected: display_value(assertion.get("expected")),
        actual: display_value(assertion.get("actual")),
        diffs: assertion.get("diffs").and_then(render_diffs),
    })
}

fn parse_summary(response: &DoneResponse) -> TestSummary {
    let counts = response.get_first("summary").and_then(Value::as_object);
    let count = |key: &str| {
        counts
            .and_then(|c| c.get(key))
            .and_then(Value::as_i64)
            .unwrap_or(0)
    };

    let (test, var, fail, error) = (count("test"), count("var"), count("fail"), count("error"));
    TestSummary {
        success: counts.is_some() && fail == 0 && error == 0,
        message: format!(
            "Ran {test} assertions, in {var} test functions. {fail} failures, {error} errors."
        ),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Printable form of an expected/actual value: strings verbatim with
/// trailing whitespace dropped, anything else in JSON notation.
fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim_end().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Render a `diffs` field to display text.
///
/// A string is used as-is. The structured form is a sequence of
/// `[form, [only-in-expected, only-in-actual]]` entries, rendered as
/// `- expected` / `+ actual` line pairs. Any other shape is ignored.
fn render_diffs(diffs: &Value) -> Option<String> {
    match diffs {
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => {
            let mut lines = Vec::new();
            for entry in entries {
                if let Some([_, sides]) = entry.as_array().map(Vec::as_slice) {
                    if let Some([left, right]) = sides.as_array().map(Vec::as_slice) {
                        lines.push(format!("- {}", display_value(Some(left))));
                        lines.push(format!("+ {}", display_value(Some(right))));
                    }
                }
            }
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        _ => None,
    }
}

/// Buffer lines for every failure in the report:
///
/// ```text
/// ;; <text> (Line: N)
/// Expected: <expected>
///   Actual: <actual>
///    Diffs: <first diff line>
///           <continuation, indented>
/// ```
pub fn render_failure_lines(report: &TestReport) -> Vec<String> {
    let mut lines = Vec::new();
    for failure in &report.failures {
        let location = failure
            .line
            .map(|n| format!(" (Line: {n})"))
            .unwrap_or_default();
        lines.push(format!(";; {}{location}", failure.text));
        lines.push(format!("Expected: {}", failure.expected));
        lines.push(format!("  Actual: {}", failure.actual));
        if let Some(diffs) = &failure.diffs {
            let block = strutil::add_indent(10, &format!("   Diffs: {diffs}"));
            lines.extend(block.split('\n').map(str::to_string));
        }
    }
    lines
}
