use pointstracker::models::event_type::EventType;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{init_db_with_data, no_config, pt, setup_test_db, temp_out};

#[test]
fn test_help_lists_commands() {
    pt()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve"))
        .stdout(contains("export"))
        .stdout(contains("--test").not());
}

#[test]
fn test_init_creates_schema_and_admin() {
    let db_path = setup_test_db("init_creates");
    let cfg = no_config("init_creates");

    pt()
        .args(["--db", &db_path, "--config", &cfg, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Default admin account 'admin' created"))
        .stdout(contains("initialization completed"));

    assert!(std::path::Path::new(&db_path).exists());

    // Second run keeps the stored credentials.
    pt()
        .args(["--db", &db_path, "--config", &cfg, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Admin credentials already configured"));
}

#[test]
fn test_list_empty_roster() {
    let db_path = setup_test_db("list_empty");
    init_db_with_data(&db_path, &[]);

    pt()
        .args(["--db", &db_path, "--config", &no_config("list_empty"), "list"])
        .assert()
        .success()
        .stdout(contains("No students yet."));
}

#[test]
fn test_list_shows_standings_with_tiers() {
    let db_path = setup_test_db("list_standings");
    let combos = [EventType::Combo; 9];
    init_db_with_data(
        &db_path,
        &[("Nia", &[EventType::Meeting][..]), ("Omar", &combos[..])],
    );

    pt()
        .args(["--db", &db_path, "--config", &no_config("list_standings"), "list"])
        .assert()
        .success()
        .stdout(contains("STANDINGS"))
        .stdout(contains("Omar"))
        .stdout(contains("Gold (+ conference)"))
        .stdout(contains("$1000"))
        .stdout(contains("Nia"));
}

#[test]
fn test_log_prints_recent_entries() {
    let db_path = setup_test_db("log_recent");
    init_db_with_data(
        &db_path,
        &[("Pia", &[EventType::Cfe, EventType::GuestSpeaker][..])],
    );

    pt()
        .args([
            "--db",
            &db_path,
            "--config",
            &no_config("log_recent"),
            "log",
            "--limit",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains("guestSpeaker"))
        .stdout(contains("+3"))
        .stdout(contains("cfe").not());
}

#[test]
fn test_log_default_limit_comes_from_config() {
    let db_path = setup_test_db("log_config_limit");
    init_db_with_data(
        &db_path,
        &[("Sol", &[EventType::Cfe, EventType::GuestSpeaker][..])],
    );

    let cfg = temp_out("log_config_limit", "conf");
    std::fs::write(&cfg, "activity_log_limit: 1\n").unwrap();

    pt()
        .args(["--db", &db_path, "--config", &cfg, "log"])
        .assert()
        .success()
        .stdout(contains("guestSpeaker"))
        .stdout(contains("cfe").not());
}

#[test]
fn test_log_rejects_negative_limit() {
    let db_path = setup_test_db("log_negative");
    init_db_with_data(&db_path, &[]);

    pt()
        .args([
            "--db",
            &db_path,
            "--config",
            &no_config("log_negative"),
            "log",
            "--limit=-5",
        ])
        .assert()
        .failure()
        .stderr(contains("limit must be a non-negative integer"));
}

#[test]
fn test_export_csv_and_overwrite_guard() {
    let db_path = setup_test_db("export_csv");
    let cfg = no_config("export_csv");
    let out = temp_out("export_csv", "csv");
    init_db_with_data(
        &db_path,
        &[("Quinn", &[EventType::Combo, EventType::Combo, EventType::Cfe][..])],
    );

    pt()
        .args(["--db", &db_path, "--config", &cfg, "export", "--file", &out])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("Name,Total Points,Meetings"));
    assert!(content.contains("Quinn,11,0,0,1,2,None,$0"));

    pt()
        .args(["--db", &db_path, "--config", &cfg, "export", "--file", &out])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    pt()
        .args([
            "--db", &db_path, "--config", &cfg, "export", "--file", &out, "--force",
        ])
        .assert()
        .success();
}

#[test]
fn test_export_json() {
    let db_path = setup_test_db("export_json");
    let out = temp_out("export_json", "json");
    init_db_with_data(&db_path, &[("Rae", &[EventType::Meeting][..])]);

    pt()
        .args([
            "--db",
            &db_path,
            "--config",
            &no_config("export_json"),
            "export",
            "--format",
            "json",
            "--file",
            &out,
        ])
        .assert()
        .success();

    let rows: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows[0]["name"], "Rae");
    assert_eq!(rows[0]["points"], 1);
    assert_eq!(rows[0]["tier"], "None");
}
