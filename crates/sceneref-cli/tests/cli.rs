// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ARENA: &str = r#"{
    "types": [
        { "name": "Behaviour" },
        { "name": "Ai", "base": "Behaviour" },
        { "name": "Stats", "transparent": true }
    ],
    "objects": [
        { "id": "player", "name": "Player",
          "components": [{ "id": "player/health", "type": "Health" }] },
        { "id": "enemy", "name": "Enemy",
          "components": [
            { "id": "enemy/renderer", "type": "MeshRenderer" },
            { "id": "enemy/ai", "type": "Ai",
              "fields": [
                { "name": "target", "value": { "component": "player/health" } },
                { "name": "look", "value": { "component": "enemy/renderer" } },
                { "name": "transform", "value": { "object": "player" } },
                { "name": "stats", "value": { "record": { "type": "Stats",
                    "fields": [{ "name": "rival", "value": { "object": "player" } }] } } }
              ],
              "accessors": [{ "name": "me", "value": { "object": "enemy" } }],
              "events": [{ "name": "onDeath", "subscribers": [
                { "receiver": { "component": "player/health" }, "handler": "OnEnemyDied" }
              ] }]
            }
          ] },
        { "id": "crate", "name": "Crate" }
    ]
}"#;

struct Fixture {
    dir: TempDir,
    scene: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let scene = dir.path().join("arena.json");
        std::fs::write(&scene, ARENA).expect("write scene");
        Self { dir, scene }
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sceneref").expect("binary");
        cmd.env_remove("RUST_LOG")
            .arg("--config-dir")
            .arg(self.config_dir());
        cmd
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn scan_prints_grouped_reference_lines() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["scan", arg(&fx.scene)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Enemy:"))
        .stdout(predicate::str::contains("Ai.target -> (Health) Player"))
        .stdout(predicate::str::contains("Ai.rival -> (Object) Player"))
        .stdout(predicate::str::contains("Ai.onDeath(OnEnemyDied) -> (Health) Player"))
        .stdout(predicate::str::contains("transform").not())
        .stdout(predicate::str::contains("look").not())
        .stdout(predicate::str::contains("Ai.me").not());
}

#[test]
fn scan_json_is_machine_readable() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["scan", arg(&fx.scene), "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["owner_component"] == "enemy/ai"));
}

#[test]
fn scan_table_has_headers() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["scan", arg(&fx.scene), "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Member"))
        .stdout(predicate::str::contains("onDeath(OnEnemyDied)"));
}

#[test]
fn refs_filters_to_one_target() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["refs", arg(&fx.scene), "player"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ai.target -> (Health) Player"));
    fx.cmd()
        .args(["refs", arg(&fx.scene), "enemy"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn refs_rejects_unknown_object() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["refs", arg(&fx.scene), "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn isolated_lists_non_communicating_objects() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["isolated", arg(&fx.scene)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Crate (crate)"))
        .stdout(predicate::str::contains("Player").not())
        .stdout(predicate::str::contains("Enemy").not());
}

#[test]
fn policy_file_replaces_preferences() {
    let fx = Fixture::new();
    let policy = fx.write("policy.json", r#"{ "ignored_members": [] }"#);
    fx.cmd()
        .args(["--policy", arg(&policy), "scan", arg(&fx.scene)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ai.transform -> (Object) Player"));
}

#[test]
fn saved_preferences_extend_the_policy() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.config_dir()).expect("config dir");
    std::fs::write(
        fx.config_dir().join("scan-prefs.json"),
        r#"{ "extra_ignored_events": ["onDeath"] }"#,
    )
    .expect("prefs");
    fx.cmd()
        .args(["scan", arg(&fx.scene)])
        .assert()
        .success()
        .stdout(predicate::str::contains("onDeath").not())
        .stdout(predicate::str::contains("Ai.target"));
    fx.cmd()
        .arg("policy")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"onDeath\""));
}

#[test]
fn malformed_scene_fails_with_context() {
    let fx = Fixture::new();
    let bad = fx.write("bad.json", r#"{ "objects": [{ "id": "a", "parent": "nowhere" }] }"#);
    fx.cmd()
        .args(["scan", arg(&bad)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown parent `nowhere`"));
}
