use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn fuelbook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fuelbook").unwrap();
    cmd.env("HOME", home).env("FUELBOOK_LOG", "off");
    cmd
}

fn setup(home: &Path) {
    let data_dir = home.join("data");
    fuelbook(home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized fuelbook"));
    fuelbook(home)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded!"));
}

#[test]
fn test_import_before_init_fails() {
    let home = tempfile::tempdir().unwrap();
    let csv = home.path().join("x.csv");
    std::fs::write(&csv, "a\n").unwrap();
    fuelbook(home.path())
        .args(["import", "fuelly", csv.to_str().unwrap(), "--user", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fuelbook init"));
}

#[test]
fn test_demo_sample_imports_with_json_response() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    let sample = home.path().join("data").join("fuelly-sample.csv");
    fuelbook(home.path())
        .args(["import", "fuelly", sample.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout("{}\n");
    fuelbook(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fuelly"));
}

#[test]
fn test_gasbuddy_human_summary() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    let sample = home.path().join("data").join("gasbuddy-sample.csv");
    fuelbook(home.path())
        .args(["import", "gasbuddy", sample.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("GasBuddy: 2 rows read"));
}

#[test]
fn test_unmapped_vehicle_lists_errors_and_exits_nonzero() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    let csv = home.path().join("bad.csv");
    std::fs::write(
        &csv,
        "Type,MPG,Date,Time,Vehicle,Odometer,Fill,Price,Quantity,Total,Octane,Brand,Location,Tags,Payment,TirePressure,Notes,ServiceType\n\
         Gas,,2024-01-05,07:45,Unknown,45120,Full,$3.199,10.412,$33.31,,,,,,,,\n",
    )
    .unwrap();
    fuelbook(home.path())
        .args(["import", "fuelly", csv.to_str().unwrap(), "--json"])
        .assert()
        .failure()
        .stdout(concat!(r#"{"errors":["Found an unmapped vehicle entry at row 2"]}"#, "\n"));
    fuelbook(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing imported yet."));
}

#[test]
fn test_unknown_vendor_is_rejected_by_parser() {
    let home = tempfile::tempdir().unwrap();
    fuelbook(home.path())
        .args(["import", "fuelio", "x.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
