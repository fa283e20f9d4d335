use assert_cmd::cargo_bin_cmd;
use assert_cmd::assert::Assert;

/// The demo analysis used by integration tests
#[allow(dead_code)]
pub const ANALYSIS_DIR: &str = "demos/fepbe";

/// Run budget-gap with the given arguments, ignoring the user's settings file
pub fn run_budget_gap(args: &[&str]) -> Assert {
    cargo_bin_cmd!("budget-gap")
        .env("BUDGET_GAP_USE_DEFAULT_SETTINGS", "1")
        .env("BUDGET_GAP_LOG_LEVEL", "off")
        .args(args)
        .assert()
}

/// Check that budget-gap runs successfully with the given arguments
#[allow(dead_code)]
pub fn assert_budget_gap_runs(args: &[&str]) {
    run_budget_gap(args).success();
}

/// Run budget-gap successfully and return what it printed to stdout
#[allow(dead_code)]
pub fn get_budget_gap_stdout(args: &[&str]) -> String {
    let output = run_budget_gap(args).success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}
