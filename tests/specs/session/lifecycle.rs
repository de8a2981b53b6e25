//! Session & Workspace Manager specs (§4.2): create/list/show/delete.

use crate::prelude::*;

#[test]
fn create_session_provisions_a_workspace_directory() {
    let home = TestHome::new();
    let session_id = create_session(&home, "my-design");

    let workspace = session_workspace(&home, &session_id);
    assert!(workspace.is_dir(), "workspace dir should exist: {workspace:?}");
}

#[test]
fn list_sessions_includes_created_session() {
    let home = TestHome::new();
    let session_id = create_session(&home, "listed");

    let output = run(home.cmd().args(["--output", "json", "list-sessions"]));
    assert!(output.status.success());
    let body = json(&output);
    let ids: Vec<&str> = body["sessions"]
        .as_array()
        .expect("sessions array")
        .iter()
        .map(|s| s["session_id"].as_str().expect("session_id"))
        .collect();
    assert!(ids.contains(&session_id.as_str()));
}

#[test]
fn show_session_reports_zero_usage_for_a_fresh_session() {
    let home = TestHome::new();
    let session_id = create_session(&home, "fresh");

    let output = run(home.cmd().args(["--output", "json", "show-session", &session_id]));
    assert!(output.status.success());
    let body = json(&output);
    assert_eq!(body["session_id"], session_id);
    assert_eq!(body["usage"]["total_tokens"], 0);
}

#[test]
fn show_session_fails_for_unknown_id() {
    let home = TestHome::new();
    let output = run(home.cmd().args(["--output", "json", "show-session", "does-not-exist"]));
    assert!(!output.status.success());
    let body = json(&output);
    assert!(body["error"].as_str().expect("error field").contains("unknown session"));
}

#[test]
fn delete_session_removes_it_from_the_list() {
    let home = TestHome::new();
    let session_id = create_session(&home, "throwaway");

    let output = run(home.cmd().args(["--output", "json", "delete-session", &session_id]));
    assert!(output.status.success());

    let list_output = run(home.cmd().args(["--output", "json", "list-sessions"]));
    let body = json(&list_output);
    let ids: Vec<&str> = body["sessions"]
        .as_array()
        .expect("sessions array")
        .iter()
        .map(|s| s["session_id"].as_str().expect("session_id"))
        .collect();
    assert!(!ids.contains(&session_id.as_str()));
}

#[test]
fn resolving_a_workspace_by_session_id_requires_a_known_session() {
    let home = TestHome::new();
    let output = run(home
        .cmd()
        .args(["--output", "json", "--session", "ghost", "show-attempt-log"]));
    assert!(!output.status.success());
    let body = json(&output);
    assert!(body["error"].as_str().expect("error field").contains("unknown session"));
}
