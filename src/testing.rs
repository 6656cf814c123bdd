//! Test discovery and execution workflow.
//!
//! Fixed pipeline on top of the wire operations:
//!
//! 1. Locate the var under the cursor by evaluating the enclosing top-level
//!    form (quietly) and splitting the resulting qualified symbol.
//! 2. Classify it against the namespace's test-annotated vars.
//! 3. Run the single test, or the whole (possibly cycled) test namespace.
//! 4. Parse the structured test report and render failures plus a summary.
//!
//! Failures to locate or classify surface as short error notifications; a
//! server without `test-var-query` support makes the workflow return
//! "not run" instead of erroring.

use crate::error::{Error, Result};
use crate::message::Params;
use crate::messages;
use crate::ops;
use crate::report::{self, TestReport};
use crate::session::Session;
use crate::strutil;
use serde_json::{json, Value};
use std::sync::Arc;

const TEST_NS_SUFFIX: &str = "-test";
const TEST_VAR_QUERY_OP: &str = "test-var-query";

/// Vars in `ns` annotated with test metadata.
///
/// Requires the namespace first so metadata is loaded, then merges every
/// `ns-vars-with-meta` map in the response (later maps win) and keeps the
/// vars whose metadata carries a non-null `test` entry.
pub async fn test_vars_in_ns(session: &Arc<Session>, ns: &str) -> Result<Vec<String>> {
    ops::require_ns(session, ns).await?;
    let resp = ops::ns_vars_with_meta(session, ns).await?;

    let mut merged = serde_json::Map::new();
    for value in resp.get_all("ns-vars-with-meta") {
        if let Some(vars) = value.as_object() {
            for (var, meta) in vars {
                merged.insert(var.clone(), meta.clone());
            }
        }
    }

    Ok(merged
        .into_iter()
        .filter(|(_, meta)| {
            meta.as_object()
                .and_then(|m| m.get("test"))
                .is_some_and(|test| !test.is_null())
        })
        .map(|(var, _)| var)
        .collect())
}

/// Run the test under the cursor, if the enclosing form defines one.
///
/// The enclosing top-level form is evaluated with output echoing
/// suppressed; the result must be a qualified symbol (`ns/var`, optionally
/// with a leading `#'` sigil). A test var runs individually; a non-test var
/// inside a test namespace reports "not found"; a non-test var elsewhere is
/// left alone.
pub async fn run_test_under_cursor(session: &Arc<Session>) -> Result<bool> {
    let (code, _position) = session.editor().current_top_form().await?;
    let resp = ops::eval_code(session, &code, Some(ops::quiet_context())).await?;

    let value = resp.get_first("value").ok_or(Error::NoResult)?;
    let Some(value) = value.as_str() else {
        return Err(Error::MalformedResult(value.to_string()));
    };

    let qualified = value.strip_prefix("#'").unwrap_or(value);
    let (ns, var) = qualified
        .split_once('/')
        .filter(|(ns, var)| !ns.is_empty() && !var.is_empty())
        .ok_or_else(|| Error::MalformedResult(qualified.to_string()))?;

    let test_vars = test_vars_in_ns(session, ns).await?;
    if test_vars.iter().any(|v| v == var) {
        run_test_vars(session, ns, vec![qualified.to_string()]).await?;
    } else if ns.ends_with(TEST_NS_SUFFIX) {
        messages::error(session, "test-not-found", &[]).await?;
    } else {
        // Non-test var outside a test namespace: reserved for future
        // source-to-test navigation.
        tracing::debug!(ns, var, "var under cursor is not a test");
    }

    Ok(true)
}

/// Run every test in the namespace paired with the current buffer.
///
/// Reloads the current file first so the run matches the buffer. Returns
/// `Ok(false)` without user-visible output when the server does not
/// advertise `test-var-query`.
pub async fn run_test_ns(session: &Arc<Session>) -> Result<bool> {
    let ns = session.editor().current_namespace().await?;
    ops::load_current_file(session).await?;

    match ops::ensure_supported(session, TEST_VAR_QUERY_OP).await {
        Err(Error::UnsupportedOperation(op)) => {
            tracing::warn!(op, "server lacks test support, not running");
            return Ok(false);
        }
        other => other?,
    }

    let test_vars = test_vars_in_ns(session, &ns).await?;
    let target = if test_vars.is_empty() && !ns.ends_with(TEST_NS_SUFFIX) {
        strutil::cycle_ns_name(&ns)
    } else {
        ns
    };

    let mut query = Params::new();
    query.insert("ns-query".to_string(), json!({"exactly": [target]}));
    run_query(session, query).await?;

    Ok(true)
}

/// Run specific test vars of one namespace.
pub async fn run_test_vars(
    session: &Arc<Session>,
    ns: &str,
    qualified_vars: Vec<String>,
) -> Result<()> {
    let mut query = Params::new();
    query.insert("ns-query".to_string(), json!({"exactly": [ns]}));
    query.insert("exactly".to_string(), json!(qualified_vars));
    run_query(session, query).await
}

async fn run_query(session: &Arc<Session>, query: Params) -> Result<()> {
    announce(session, &query).await?;
    let resp = ops::test_var_query(session, query).await?;
    let parsed = report::parse(&resp);
    finish(session, &parsed).await
}

/// Announce which vars (or namespaces) are being tested.
async fn announce(session: &Arc<Session>, query: &Params) -> Result<()> {
    let names = match query.get("exactly") {
        Some(Value::Array(vars)) => Some(joined(vars)),
        _ => match query
            .get("ns-query")
            .and_then(Value::as_object)
            .and_then(|q| q.get("exactly"))
        {
            Some(Value::Array(namespaces)) => Some(joined(namespaces)),
            _ => None,
        },
    };

    match names {
        Some(names) => messages::echo(session, "testing-var", &[("varName", &names)]).await,
        None => messages::echo(session, "testing", &[]).await,
    }
}

fn joined(values: &[Value]) -> String {
    values
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render failure blocks into the buffer and post the summary notification.
async fn finish(session: &Arc<Session>, result: &TestReport) -> Result<()> {
    let lines = report::render_failure_lines(result);
    if !lines.is_empty() {
        session.editor().append_lines(lines).await?;
    }

    if result.summary.success {
        messages::info_str(session, &result.summary.message).await
    } else {
        messages::error_str(session, &result.summary.message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{RecordingEditor, ScriptedTransport, SourceFile};
    use crate::message::{DoneResponse, ResponseMessage};

    fn harness() -> (Arc<Session>, Arc<ScriptedTransport>, Arc<RecordingEditor>) {
        let transport = Arc::new(ScriptedTransport::new());
        let editor = Arc::new(RecordingEditor::new());
        let session = Session::new(transport.clone(), editor.clone());
        (session, transport, editor)
    }

    fn done(value: serde_json::Value) -> DoneResponse {
        DoneResponse::from_messages(vec![ResponseMessage::from_value(value)])
    }

    fn script_ns_vars(transport: &ScriptedTransport, vars: serde_json::Value) {
        // require_ns goes out as an eval first
        transport.respond_with("eval", done(json!({"value": "nil", "status": ["done"]})));
        transport.respond_with(
            "ns-vars-with-meta",
            done(json!({"ns-vars-with-meta": vars, "status": ["done"]})),
        );
    }

    fn script_passing_run(transport: &ScriptedTransport) {
        transport.respond_with(
            "test-var-query",
            done(json!({
                "results": {},
                "summary": {"test": 1, "var": 1, "pass": 1, "fail": 0, "error": 0},
                "status": ["done"],
            })),
        );
    }

    fn set_file(editor: &RecordingEditor) {
        editor.set_file(SourceFile {
            path: "/proj/src/my/ns.clj".into(),
            name: "ns.clj".into(),
            content: "(ns my.ns)".into(),
        });
    }

    #[tokio::test]
    async fn test_under_cursor_runs_a_test_var() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(deftest foo ...)", 0);
        transport.respond_with("eval", done(json!({"value": "#'my.ns-test/foo", "status": ["done"]})));
        script_ns_vars(&transport, json!({"foo": {"test": "..."}, "helper": {}}));
        script_passing_run(&transport);

        assert!(run_test_under_cursor(&session).await.unwrap());

        let query = transport.last_sent("test-var-query").unwrap();
        assert_eq!(
            query.params.get("ns-query"),
            Some(&json!({"exactly": ["my.ns-test"]}))
        );
        assert_eq!(
            query.params.get("exactly"),
            Some(&json!(["my.ns-test/foo"]))
        );
        assert_eq!(editor.echoes(), vec!["Testing: my.ns-test/foo"]);
        assert_eq!(
            editor.infos(),
            vec!["Ran 1 assertions, in 1 test functions. 0 failures, 0 errors."]
        );
    }

    #[tokio::test]
    async fn test_under_cursor_quiet_evaluation() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(deftest foo ...)", 0);
        transport.respond_with("eval", done(json!({"value": "#'my.ns-test/foo", "status": ["done"]})));
        script_ns_vars(&transport, json!({"foo": {"test": "..."}}));
        script_passing_run(&transport);

        run_test_under_cursor(&session).await.unwrap();

        let eval = transport.sent().into_iter().find(|o| o.op == "eval").unwrap();
        assert_eq!(eval.params.get("context"), Some(&json!({"verbose": "false"})));
    }

    #[tokio::test]
    async fn test_under_cursor_no_result() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(comment)", 0);
        transport.respond_with("eval", done(json!({"status": ["done"]})));

        let err = run_test_under_cursor(&session).await.unwrap_err();
        assert!(matches!(err, Error::NoResult));
    }

    #[tokio::test]
    async fn test_under_cursor_malformed_symbol() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(def x 1)", 0);
        transport.respond_with("eval", done(json!({"value": "not-qualified", "status": ["done"]})));

        let err = run_test_under_cursor(&session).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResult(s) if s == "not-qualified"));
    }

    #[tokio::test]
    async fn test_under_cursor_non_test_var_in_test_ns_reports_not_found() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(defn helper [] 1)", 0);
        transport.respond_with("eval", done(json!({"value": "#'my.ns-test/helper", "status": ["done"]})));
        script_ns_vars(&transport, json!({"foo": {"test": "..."}, "helper": {}}));

        assert!(run_test_under_cursor(&session).await.unwrap());

        assert_eq!(editor.errors(), vec!["Test not found"]);
        assert!(transport.last_sent("test-var-query").is_none());
    }

    #[tokio::test]
    async fn test_under_cursor_non_test_var_elsewhere_is_a_no_op() {
        let (session, transport, editor) = harness();
        editor.set_top_form("(defn helper [] 1)", 0);
        transport.respond_with("eval", done(json!({"value": "#'my.ns/helper", "status": ["done"]})));
        script_ns_vars(&transport, json!({"helper": {}}));

        assert!(run_test_under_cursor(&session).await.unwrap());

        assert!(editor.errors().is_empty());
        assert!(transport.last_sent("test-var-query").is_none());
    }

    #[tokio::test]
    async fn test_ns_with_suffix_queries_itself_even_without_test_vars() {
        let (session, transport, editor) = harness();
        editor.set_namespace("my.ns-test");
        set_file(&editor);
        transport.respond_with("load-file", done(json!({"status": ["done"]})));
        transport.respond_with(
            "describe",
            done(json!({"ops": {"test-var-query": {}}, "status": ["done"]})),
        );
        script_ns_vars(&transport, json!({}));
        script_passing_run(&transport);

        assert!(run_test_ns(&session).await.unwrap());

        let query = transport.last_sent("test-var-query").unwrap();
        assert_eq!(
            query.params.get("ns-query"),
            Some(&json!({"exactly": ["my.ns-test"]}))
        );
        assert!(query.params.get("exactly").is_none());
    }

    #[tokio::test]
    async fn test_ns_without_test_vars_cycles_to_the_paired_ns() {
        let (session, transport, editor) = harness();
        editor.set_namespace("my.ns");
        set_file(&editor);
        transport.respond_with("load-file", done(json!({"status": ["done"]})));
        transport.respond_with(
            "describe",
            done(json!({"ops": {"test-var-query": {}}, "status": ["done"]})),
        );
        script_ns_vars(&transport, json!({"helper": {}}));
        script_passing_run(&transport);

        assert!(run_test_ns(&session).await.unwrap());

        let query = transport.last_sent("test-var-query").unwrap();
        assert_eq!(
            query.params.get("ns-query"),
            Some(&json!({"exactly": ["my.ns-test"]}))
        );
    }

    #[tokio::test]
    async fn test_ns_unsupported_operation_returns_not_run() {
        let (session, transport, editor) = harness();
        editor.set_namespace("my.ns-test");
        set_file(&editor);
        transport.respond_with("load-file", done(json!({"status": ["done"]})));
        transport.respond_with("describe", done(json!({"ops": {"eval": {}}, "status": ["done"]})));

        assert!(!run_test_ns(&session).await.unwrap());

        assert!(transport.last_sent("test-var-query").is_none());
        assert!(editor.errors().is_empty());
    }

    #[tokio::test]
    async fn test_failures_render_to_buffer_and_error_summary() {
        let (session, transport, editor) = harness();
        editor.set_namespace("my.ns-test");
        set_file(&editor);
        transport.respond_with("load-file", done(json!({"status": ["done"]})));
        transport.respond_with(
            "describe",
            done(json!({"ops": {"test-var-query": {}}, "status": ["done"]})),
        );
        script_ns_vars(&transport, json!({"failing": {"test": "..."}}));
        transport.respond_with(
            "test-var-query",
            done(json!({
                "results": {"my.ns-test": {"failing": [
                    {"type": "fail", "message": "assertion failed",
                     "expected": "1", "actual": "2", "line": 5},
                ]}},
                "summary": {"test": 1, "var": 1, "pass": 0, "fail": 1, "error": 0},
                "status": ["done"],
            })),
        );

        assert!(run_test_ns(&session).await.unwrap());

        assert_eq!(
            editor.appended_flat(),
            vec![";; assertion failed (Line: 5)", "Expected: 1", "  Actual: 2"]
        );
        assert_eq!(
            editor.errors(),
            vec!["Ran 1 assertions, in 1 test functions. 1 failures, 0 errors."]
        );
    }

    #[tokio::test]
    async fn test_test_vars_merge_across_messages() {
        let (session, transport, _) = harness();
        transport.respond_with("eval", done(json!({"value": "nil", "status": ["done"]})));
        transport.respond_with(
            "ns-vars-with-meta",
            DoneResponse::from_messages(vec![
                ResponseMessage::from_value(json!({
                    "ns-vars-with-meta": {"a": {"test": "..."}, "b": {}},
                })),
                ResponseMessage::from_value(json!({
                    "ns-vars-with-meta": {"c": {"test": "..."}, "b": {"test": "..."}},
                    "status": ["done"],
                })),
            ]),
        );

        let mut vars = test_vars_in_ns(&session, "my.ns-test").await.unwrap();
        vars.sort();
        assert_eq!(vars, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_null_test_metadata_is_not_a_test() {
        let (session, transport, _) = harness();
        script_ns_vars(
            &transport,
            json!({"a": {"test": null}, "b": {"test": "..."}, "c": "not-a-map"}),
        );

        let vars = test_vars_in_ns(&session, "my.ns-test").await.unwrap();
        assert_eq!(vars, ["b"]);
    }
}
