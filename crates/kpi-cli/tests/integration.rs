#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn kpi(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kpi").unwrap();
    cmd.current_dir(dir.path())
        .env("KPI_ROOT", dir.path())
        .env_remove("KPI_CATALOG");
    cmd
}

fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = kpi(dir).arg("--json").args(args).assert().success();
    serde_json::from_slice(&output.get_output().stdout).unwrap()
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["id"].as_str().unwrap().to_string())
        .collect()
}

const CUSTOM_CATALOG: &str = r#"
- id: jobs-booked
  name: Jobs Booked
  function: sales
  tier: essential
  industries: [trades]
  stages: [foundation]
  unit: number
  frequency: weekly
- id: broken
  name: Missing most fields
"#;

// ---------------------------------------------------------------------------
// kpi list / show / search
// ---------------------------------------------------------------------------

#[test]
fn list_shows_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ID"))
        .stdout(predicate::str::contains("monthly-revenue"))
        .stdout(predicate::str::contains("owner-hours"));
}

#[test]
fn list_filters_combine() {
    let dir = TempDir::new().unwrap();
    let value = json(&dir, &["list", "--function", "finance", "--tier", "essential"]);
    assert_eq!(ids(&value), ["net-profit-margin"]);
}

#[test]
fn list_industry_keeps_universal_kpis() {
    let dir = TempDir::new().unwrap();
    let value = json(&dir, &["list", "--function", "finance", "--industry", "Trades"]);
    assert_eq!(
        ids(&value),
        ["net-profit-margin", "cash-runway", "debtor-days", "current-ratio"]
    );
}

#[test]
fn list_rejects_unknown_function() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["list", "--function", "astrology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown business function"));
}

#[test]
fn search_matches_tags() {
    let dir = TempDir::new().unwrap();
    let value = json(&dir, &["search", "DSO"]);
    assert_eq!(ids(&value), ["debtor-days"]);
}

#[test]
fn search_without_hits_says_so() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["search", "zzzz-nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No KPIs match."));
}

#[test]
fn show_prints_detail() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["show", "cash-runway"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(cash-runway)"))
        .stdout(predicate::str::contains("Frequency:"));
}

#[test]
fn show_unknown_kpi_fails() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kpi not found: ghost"));
}

#[test]
fn catalog_flag_replaces_builtin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kpis.yaml");
    std::fs::write(&path, CUSTOM_CATALOG).unwrap();

    let value = json(&dir, &["--catalog", path.to_str().unwrap(), "list"]);
    assert_eq!(ids(&value), ["jobs-booked"]);
}

#[test]
fn configured_catalog_resolves_against_root() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("kpis.yaml"), CUSTOM_CATALOG).unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    std::fs::write(dir.path().join(".kpi/config.yaml"), "catalog: kpis.yaml\n").unwrap();

    let value = json(&dir, &["list"]);
    assert_eq!(ids(&value), ["jobs-booked"]);
}

#[test]
fn missing_catalog_file_fails() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["--catalog", "nope.yaml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load catalog"));
}

// ---------------------------------------------------------------------------
// kpi check
// ---------------------------------------------------------------------------

#[test]
fn check_value_rejects_percentage_over_100() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["check", "value", "150", "--unit", "percentage"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("cannot exceed 100%"));
}

#[test]
fn check_value_accepts_formatted_input() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["check", "value", "$1,200", "--unit", "currency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: $1,200"));
}

#[test]
fn check_value_negative_needs_flag() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["check", "value", "-5", "--unit", "number"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("negative values are not allowed"));
    kpi(&dir)
        .args(["check", "value", "-5", "--unit", "number", "--allow-negative"])
        .assert()
        .success();
}

#[test]
fn check_value_unknown_unit_fails() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["check", "value", "5", "--unit", "furlongs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown unit"));
}

#[test]
fn check_targets_warns_but_passes_on_decline() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["check", "targets", "--unit", "currency", "100", "50", "40", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning] year 1 target"));
}

#[test]
fn check_targets_fails_on_invalid_values() {
    let dir = TempDir::new().unwrap();
    let output = kpi(&dir)
        .args(["--json", "check", "targets", "--unit", "percentage", "50", "60", "120", "130"])
        .assert()
        .failure();
    let value: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(value["valid"], false);
    let fields: Vec<&str> = value["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["year2", "year3"]);
}

#[test]
fn check_targets_uses_configured_growth_limits() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    std::fs::write(
        dir.path().join(".kpi/config.yaml"),
        "growth:\n  year1_limit_pct: 10\n",
    )
    .unwrap();
    kpi(&dir)
        .args(["check", "targets", "--unit", "number", "100", "150", "160", "170"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exceeds 10%"));
}

// ---------------------------------------------------------------------------
// kpi format
// ---------------------------------------------------------------------------

#[test]
fn format_compact_currency() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["format", "value", "1500000", "--unit", "currency", "--compact"])
        .assert()
        .success()
        .stdout("$1.5M\n");
}

#[test]
fn format_days_breaks_into_weeks() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["format", "days", "9"])
        .assert()
        .success()
        .stdout("1w 2d\n");
}

#[test]
fn format_unknown_tag_falls_back_to_number() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["format", "value", "1234.5", "--unit", "widgets"])
        .assert()
        .success()
        .stdout("1,234.5\n");
}

#[test]
fn format_uses_configured_locale() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    std::fs::write(
        dir.path().join(".kpi/config.yaml"),
        "locale:\n  currency_symbol: \"€\"\n  group_separator: \".\"\n  decimal_separator: \",\"\n",
    )
    .unwrap();
    kpi(&dir)
        .args(["format", "value", "2500", "--unit", "currency"])
        .assert()
        .success()
        .stdout("€2.500\n");
}

// ---------------------------------------------------------------------------
// kpi plan
// ---------------------------------------------------------------------------

#[test]
fn plan_select_set_show_persists() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["plan", "select", "monthly-revenue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected 'monthly-revenue'"));
    assert!(dir.path().join(".kpi/plan.yaml").exists());

    kpi(&dir)
        .args([
            "plan",
            "set",
            "monthly-revenue",
            "--current",
            "10000",
            "--year1",
            "12000",
            "--year2",
            "14000",
            "--year3",
            "16000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Targets look good."));

    let plan = json(&dir, &["plan", "show"]);
    let kpi0 = &plan["kpis"][0];
    assert_eq!(kpi0["kpi_id"], "monthly-revenue");
    assert_eq!(kpi0["current_value"].as_f64(), Some(10000.0));
    assert_eq!(kpi0["year3_target"].as_f64(), Some(16000.0));
    assert_eq!(plan["revision"], 2);

    kpi(&dir)
        .args(["plan", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$16,000"));
}

#[test]
fn plan_select_twice_is_noop() {
    let dir = TempDir::new().unwrap();
    kpi(&dir).args(["plan", "select", "lead-volume"]).assert().success();
    kpi(&dir)
        .args(["plan", "select", "lead-volume"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in the plan"));
    let plan = json(&dir, &["plan", "show"]);
    assert_eq!(plan["kpis"].as_array().unwrap().len(), 1);
}

#[test]
fn plan_select_unknown_kpi_fails() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["plan", "select", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kpi not found"));
    assert!(!dir.path().join(".kpi/plan.yaml").exists());
}

#[test]
fn plan_set_invalid_value_saves_nothing() {
    let dir = TempDir::new().unwrap();
    kpi(&dir).args(["plan", "select", "net-profit-margin"]).assert().success();
    kpi(&dir)
        .args(["plan", "set", "net-profit-margin", "--year1", "140"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] year1: percentage cannot exceed 100%"));

    let plan = json(&dir, &["plan", "show"]);
    assert!(plan["kpis"][0].get("year1_target").is_none());
    assert_eq!(plan["revision"], 1);
}

#[test]
fn plan_set_requires_selection() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["plan", "set", "monthly-revenue", "--current", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kpi not in plan"));
}

#[test]
fn plan_set_without_fields_fails() {
    let dir = TempDir::new().unwrap();
    kpi(&dir).args(["plan", "select", "monthly-revenue"]).assert().success();
    kpi(&dir)
        .args(["plan", "set", "monthly-revenue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn plan_deselect_removes() {
    let dir = TempDir::new().unwrap();
    kpi(&dir).args(["plan", "select", "owner-hours"]).assert().success();
    kpi(&dir)
        .args(["plan", "deselect", "owner-hours"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'owner-hours'"));
    kpi(&dir)
        .args(["plan", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No KPIs selected."));
}

#[test]
fn plan_split_weights() {
    let dir = TempDir::new().unwrap();
    let value = json(&dir, &["plan", "split", "1000", "--weights", "1,2,3,4"]);
    let quarters: Vec<f64> = value["quarters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q.as_f64().unwrap())
        .collect();
    assert_eq!(quarters, [100.0, 200.0, 300.0, 400.0]);
}

#[test]
fn plan_split_needs_four_weights() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["plan", "split", "1000", "--weights", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 4 weights, got 3"));
}

// ---------------------------------------------------------------------------
// kpi profile
// ---------------------------------------------------------------------------

#[test]
fn profile_steps_build_profile_and_recommend() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["profile", "basics", "--name", "Acme Plumbing", "--industry", "trades"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile incomplete"));
    kpi(&dir)
        .args(["profile", "financials", "--revenue", "300000"])
        .assert()
        .success();
    kpi(&dir).args(["profile", "team", "--size", "4"]).assert().success();

    let shown = json(&dir, &["profile", "show"]);
    assert_eq!(shown["stage"], "growth");
    assert_eq!(shown["complete"], true);
    assert_eq!(shown["profile"]["business_name"], "Acme Plumbing");

    let recommended = ids(&json(&dir, &["profile", "recommend"]));
    assert!(recommended.contains(&"on-time-delivery".to_string()));
    assert!(!recommended.contains(&"debtor-days".to_string()));
    assert!(!recommended.contains(&"website-conversion-rate".to_string()));

    let deeper = ids(&json(&dir, &["profile", "recommend", "--tier", "advanced"]));
    assert!(deeper.contains(&"debtor-days".to_string()));
}

#[test]
fn profile_rejects_negative_revenue() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["profile", "financials", "--revenue=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid profile"));
    assert!(!dir.path().join(".kpi/profile.yaml").exists());
}

// ---------------------------------------------------------------------------
// kpi config
// ---------------------------------------------------------------------------

#[test]
fn config_show_prints_defaults() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debounce_ms: 1500"));
}

#[test]
fn config_validate_clean() {
    let dir = TempDir::new().unwrap();
    kpi(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid."));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    std::fs::write(
        dir.path().join(".kpi/config.yaml"),
        "growth:\n  year1_limit_pct: -1\n",
    )
    .unwrap();
    kpi(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] growth.year1_limit_pct"));
}

#[test]
fn config_validate_flags_missing_catalog_file() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    std::fs::write(dir.path().join(".kpi/config.yaml"), "catalog: gone.yaml\n").unwrap();
    kpi(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not exist"));
}

// ---------------------------------------------------------------------------
// Root discovery
// ---------------------------------------------------------------------------

#[test]
fn root_is_found_from_subdirectory() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".kpi")).unwrap();
    let sub = dir.path().join("reports/q1");
    std::fs::create_dir_all(&sub).unwrap();

    Command::cargo_bin("kpi")
        .unwrap()
        .current_dir(&sub)
        .env_remove("KPI_ROOT")
        .env_remove("KPI_CATALOG")
        .args(["plan", "select", "lead-volume"])
        .assert()
        .success();
    assert!(dir.path().join(".kpi/plan.yaml").exists());
    assert!(!sub.join(".kpi").exists());
}
