//! Integration tests for the give-ops CLI.
//!
//! The homeserver is a mockito server; the binary is pointed at it with
//! `--homeserver` and at a temporary registration file with `--registration`.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use mockito::{Matcher, ServerGuard};
use predicates::prelude::*;
use serde_json::json;

const POWER_LEVELS: &str = "^/_matrix/client/r0/rooms/%21abc%3Ax/state/m.room.power_levels";

fn give_ops(registration: &assert_fs::fixture::ChildPath, server: &ServerGuard) -> Command {
    let mut cmd = cargo_bin_cmd!("give-ops");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--registration")
        .arg(registration.path())
        .arg("--homeserver")
        .arg(server.url())
        .args(["-i", "@b:x", "-a", "#chan:x"]);
    cmd
}

fn registration(temp: &assert_fs::TempDir, content: &str) -> assert_fs::fixture::ChildPath {
    let file = temp.child("appservice.reg.yaml");
    file.write_str(content).expect("write registration");
    file
}

fn mock_room(server: &mut ServerGuard, users: serde_json::Value) {
    server
        .mock(
            "GET",
            Matcher::Regex("^/_matrix/client/r0/directory/room/%23chan%3Ax".into()),
        )
        .match_query(Matcher::UrlEncoded("access_token".into(), "secret".into()))
        .with_status(200)
        .with_body(r#"{"room_id":"!abc:x"}"#)
        .create();
    server
        .mock("GET", Matcher::Regex(POWER_LEVELS.into()))
        .match_query(Matcher::UrlEncoded("access_token".into(), "secret".into()))
        .with_status(200)
        .with_body(json!({ "users": users, "ban": 50 }).to_string())
        .create();
}

#[test]
fn cli_missing_required_args_exits_1() {
    cargo_bin_cmd!("give-ops")
        .args(["-i", "@b:x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn cli_help_shows_about() {
    cargo_bin_cmd!("give-ops")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Grant full ops to a user in a portal room",
        ))
        .stdout(predicate::str::contains("[default: https://diasp.in]"));
}

#[test]
fn missing_as_token_aborts_before_http() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "id: irc_bridge\nurl: http://localhost:9999\n");
    let mut server = mockito::Server::new();
    let any = server.mock("GET", Matcher::Any).expect(0).create();

    give_ops(&reg, &server)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read as_token"));

    any.assert();
}

#[test]
fn unresolved_alias_aborts() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "as_token: secret\n");
    let mut server = mockito::Server::new();
    server
        .mock(
            "GET",
            Matcher::Regex("^/_matrix/client/r0/directory/room/".into()),
        )
        .with_status(404)
        .with_body(r#"{"errcode":"M_NOT_FOUND","error":"Room alias not found"}"#)
        .create();
    let rooms = server
        .mock("GET", Matcher::Regex("^/_matrix/client/r0/rooms/".into()))
        .expect(0)
        .create();

    give_ops(&reg, &server)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot resolve room alias #chan:x"));

    rooms.assert();
}

#[test]
fn declined_prompt_leaves_room_unchanged() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "as_token: secret\n");
    let mut server = mockito::Server::new();
    mock_room(&mut server, json!({ "@a:x": 50 }));
    let put = server.mock("PUT", Matcher::Any).expect(0).create();

    give_ops(&reg, &server)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Modifying existing power level event:"))
        .stdout(predicate::str::contains("Current user is not an op. Continue? [y/n]: "))
        .stdout(predicate::str::contains("Aborted; power levels unchanged."));

    put.assert();
}

#[test]
fn moderator_is_granted_without_prompt() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "as_token: secret\n");
    let mut server = mockito::Server::new();
    mock_room(&mut server, json!({ "@b:x": 50 }));
    let put = server
        .mock("PUT", Matcher::Regex(POWER_LEVELS.into()))
        .match_query(Matcher::UrlEncoded("access_token".into(), "secret".into()))
        .match_body(Matcher::Json(json!({ "users": { "@b:x": 100 }, "ban": 50 })))
        .with_status(200)
        .with_body(r#"{"event_id":"$ev"}"#)
        .create();

    give_ops(&reg, &server)
        .assert()
        .success()
        .stdout(predicate::str::contains("Continue?").not())
        .stdout(predicate::str::contains("Granted."));

    put.assert();
}

#[test]
fn yes_flag_skips_prompt() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "as_token: secret\n");
    let mut server = mockito::Server::new();
    mock_room(&mut server, json!({}));
    let put = server
        .mock("PUT", Matcher::Regex(POWER_LEVELS.into()))
        .match_body(Matcher::PartialJson(json!({ "users": { "@b:x": 100 } })))
        .with_status(200)
        .with_body("{}")
        .create();

    give_ops(&reg, &server)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Granted."));

    put.assert();
}

#[test]
fn rejected_write_fails() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let reg = registration(&temp, "as_token: secret\n");
    let mut server = mockito::Server::new();
    mock_room(&mut server, json!({ "@b:x": 50 }));
    server
        .mock("PUT", Matcher::Regex(POWER_LEVELS.into()))
        .with_status(403)
        .with_body(r#"{"errcode":"M_FORBIDDEN","error":"nope"}"#)
        .create();

    give_ops(&reg, &server)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to grant ops to @b:x in #chan:x"))
        .stderr(predicate::str::contains("secret").not());
}
