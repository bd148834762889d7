mod common;

use common::{fact, write_config, write_token, FRESH_TOKEN};
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn configured(server: &MockServer) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!("base_url: {}\nstatic_asset_id: '42'\n", server.base_url()),
    );
    write_token(&dir, FRESH_TOKEN);
    dir
}

#[test]
fn test_missing_token_stops_data_commands() {
    let dir = TempDir::new().unwrap();
    fact(dir.path())
        .arg("list")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("fact configure"));
}

#[test]
fn test_missing_default_asset_asks_for_configure() {
    let dir = TempDir::new().unwrap();
    write_token(&dir, FRESH_TOKEN);
    fact(dir.path())
        .args(["get", "rack"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--asset NAME"))
        .stderr(predicate::str::contains("fact configure"));
}

#[test]
fn test_list_prints_tab_separated_rows() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/assets/42/metadata")
            .header("authorization", format!("Bearer {}", FRESH_TOKEN));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"rack": "3", "slots": 42}));
    });
    let dir = configured(&server);

    fact(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("rack\tslots\n3\t42\n");

    fact(dir.path())
        .args(["list", "--keys-only"])
        .assert()
        .success()
        .stdout("rack\nslots\n");

    mock.assert_hits(2);
}

#[test]
fn test_empty_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/assets/42/metadata");
        then.status(200)
            .header("content-type", "application/json")
            .body("{}");
    });
    let dir = configured(&server);

    fact(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No fact entries found!"));
}

#[test]
fn test_get_and_missing_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/assets/42/metadata/rack");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!("3"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/assets/42/metadata/owner");
        then.status(404);
    });
    let dir = configured(&server);

    fact(dir.path())
        .args(["get", "rack"])
        .assert()
        .success()
        .stdout("3\n");

    fact(dir.path())
        .args(["get", "owner"])
        .assert()
        .code(22)
        .stderr(predicate::str::contains("Could not find an entry for: owner"));
}

#[test]
fn test_vanished_asset_is_internal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/assets/42/metadata");
        then.status(404);
    });
    let dir = configured(&server);

    fact(dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not find the specified asset"));
}

#[test]
fn test_set_sends_a_json_string_and_delete() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/v1/assets/42/metadata/rack")
            .header("content-type", "application/json")
            .json_body(json!("Rack 3"));
        then.status(204);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/assets/42/metadata/rack");
        then.status(204);
    });
    let dir = configured(&server);

    fact(dir.path())
        .args(["set", "rack", "Rack 3"])
        .assert()
        .success()
        .stdout("");
    fact(dir.path())
        .args(["delete", "rack"])
        .assert()
        .success();

    put.assert();
    delete.assert();
}

#[test]
fn test_oversized_key_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "base_url: http://127.0.0.1:9\nstatic_asset_id: '42'\nmax_key_length: 4\n",
    );
    write_token(&dir, FRESH_TOKEN);

    fact(dir.path())
        .args(["get", "too-long"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("exceeds the maximum length"));
}

#[test]
fn test_disabled_key_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "base_url: http://127.0.0.1:9\nstatic_asset_id: '42'\ndisabled_special_keys: [owner]\n",
    );
    write_token(&dir, FRESH_TOKEN);

    fact(dir.path())
        .args(["set", "owner", "me"])
        .assert()
        .code(3);
}

#[cfg(unix)]
mod with_inventory_tool {
    use super::common::{fact, write_config, write_inventory_tool, write_token, FRESH_TOKEN};
    use httpmock::prelude::*;
    use predicates::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(server: &MockServer) -> TempDir {
        let dir = TempDir::new().unwrap();
        let tool = write_inventory_tool(&dir);
        write_config(
            &dir,
            &format!(
                "base_url: {}\nstatic_asset_id: '42'\nasset_command: {}\n",
                server.base_url(),
                tool
            ),
        );
        write_token(&dir, FRESH_TOKEN);
        dir
    }

    #[test]
    fn test_explicit_asset_overrides_default() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/assets/abc-123/metadata/rack");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!("9"));
        });
        let dir = setup(&server);

        fact(dir.path())
            .args(["get", "rack", "--asset", "node01"])
            .assert()
            .success()
            .stdout("9\n");
        mock.assert();
    }

    #[test]
    fn test_unknown_asset_exits_21() {
        let server = MockServer::start();
        let dir = setup(&server);

        fact(dir.path())
            .args(["list", "--asset", "ghost"])
            .assert()
            .code(21)
            .stderr(predicate::str::contains("Could not find asset: ghost"));
    }
}
