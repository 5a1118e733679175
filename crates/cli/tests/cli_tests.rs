// End-to-end tests for the `supsum` binary.
//
// Fixtures are generated into a temp dir per test; an empty settings file is
// passed through SUPSUM_CONFIG so a user's own settings never leak in.
//
// Run with: cargo test -p supsum-cli --test cli_tests

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use rust_xlsxwriter::Workbook;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), "").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn supsum(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_supsum"));
        cmd.current_dir(self.dir.path())
            .env("SUPSUM_CONFIG", self.path("settings.toml"))
            .env_remove("SUPSUM_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }

    /// Title rows, a numbering column, one nameless row and one unparseable amount.
    fn payments_xlsx(&self) -> PathBuf {
        let path = self.path("payments.xlsx");
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "ACME HOLDINGS - SUPPLIER PAYMENTS").unwrap();
        ws.write_string(1, 0, "Fiscal year 2024").unwrap();
        for (col, label) in ["No.", "Name of Suppliers", "TIN", "Total Amount Paid"].iter().enumerate() {
            ws.write_string(3, col as u16, *label).unwrap();
        }
        ws.write_number(4, 0, 1.0).unwrap();
        ws.write_string(4, 1, "Acme Trading").unwrap();
        ws.write_string(4, 2, "123-456-789").unwrap();
        ws.write_number(4, 3, 1234.5).unwrap();
        ws.write_number(5, 0, 2.0).unwrap();
        ws.write_string(5, 1, "Globex Ltd").unwrap();
        ws.write_string(5, 2, "987-654-321").unwrap();
        ws.write_number(5, 3, 100.25).unwrap();
        ws.write_number(6, 0, 3.0).unwrap();
        ws.write_string(6, 1, "Initech").unwrap();
        ws.write_string(6, 3, "n/a").unwrap();
        // Numbered but otherwise empty: dropped.
        ws.write_number(7, 0, 4.0).unwrap();
        ws.write_number(8, 0, 5.0).unwrap();
        ws.write_string(8, 1, "Umbrella Corp").unwrap();
        ws.write_number(8, 2, 555.0).unwrap();
        ws.write_number(8, 3, 50.0).unwrap();
        wb.save(&path).unwrap();
        path
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn code(out: &Output) -> i32 {
    out.status.code().unwrap_or(-1)
}

fn amount(value: &serde_json::Value) -> f64 {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64())
        .unwrap_or_else(|| panic!("not an amount: {value}"))
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn().unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn is_xlsx(path: &Path) -> bool {
    std::fs::read(path).map(|b| b.starts_with(b"PK")).unwrap_or(false)
}

// ===========================================================================
// summary
// ===========================================================================

#[test]
fn summary_table_with_total() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx.supsum().arg("summary").arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Supplier Name"), "{text}");
    assert!(text.contains("Acme Trading"));
    assert!(text.contains("1,234.50"));
    assert!(!text.contains("ACME HOLDINGS"));
    let total = lines.iter().find(|l| l.starts_with("TOTAL")).expect("total row");
    assert!(total.ends_with("1,384.75"), "{total}");
    assert_eq!(*lines.last().unwrap(), "Number of entries (excluding total): 4");
    assert!(!text.contains('\x1b'));
}

#[test]
fn summary_query_matches_tin_without_punctuation() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx.supsum().args(["summary", "--query", "987654"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0);
    let text = stdout(&out);
    assert!(text.contains("Globex Ltd"));
    assert!(!text.contains("Acme Trading"));
    assert!(text.contains("Number of entries (excluding total): 1"));
}

#[test]
fn summary_json_contract() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx.supsum().args(["summary", "--json", "-q", "ACME"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["header_row"], 4);
    assert_eq!(v["columns"]["supplier_name"], "B");
    assert_eq!(v["columns"]["tax_id"], "C");
    assert_eq!(v["columns"]["total_amount"], "D");
    assert_eq!(v["column_source"], "automatic");
    assert_eq!(v["state"], "records");
    assert_eq!(v["entry_count"], 1);
    assert_eq!(v["records"][0]["supplier_name"], "Acme Trading");
    assert_eq!(amount(&v["total"]["total_amount"]), 1234.5);
}

#[test]
fn summary_csv_input() {
    let fx = Fixture::new();
    let file = fx.write(
        "payments.csv",
        "Supplier payments\nNAME OF SUPPLIERS,TIN,TOTAL AMOUNT PAID\nAcme,1,100.005\nGlobex,2,50.004\n",
    );
    let out = fx.supsum().args(["summary", "--json"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(amount(&v["total"]["total_amount"]), 150.01);
}

#[test]
fn no_matches_is_reported_and_optionally_fails() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();

    let out = fx.supsum().args(["summary", "-q", "nobody"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0);
    assert!(stderr(&out).contains("no records match \"nobody\""));

    let out = fx.supsum().args(["summary", "-q", "nobody", "--fail-on-empty"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 6);
}

#[test]
fn empty_file_is_distinct_from_no_matches() {
    let fx = Fixture::new();
    let file = fx.write("empty.csv", "NAME OF SUPPLIERS,TOTAL AMOUNT PAID\n,\n");
    let out = fx.supsum().args(["summary", "--fail-on-empty"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 6);
    assert!(stderr(&out).contains("no valid supplier records"));
}

// ===========================================================================
// errors
// ===========================================================================

#[test]
fn header_not_found_exits_4() {
    let fx = Fixture::new();
    let file = fx.write("other.csv", "Vendor,Amount\nAcme,10\n");
    let out = fx.supsum().arg("summary").arg(&file).output().unwrap();
    assert_eq!(code(&out), 4);
    assert!(stderr(&out).contains("NAME OF SUPPLIERS"));
}

#[test]
fn ambiguous_columns_exit_5_then_manual_flags_resolve() {
    let fx = Fixture::new();
    // Custom amount label from settings.
    std::fs::write(fx.path("settings.toml"), "[labels]\ntotal_amount = \"AMOUNT\"\n").unwrap();
    let file = fx.write(
        "payments.csv",
        "NAME OF SUPPLIERS,TIN,AMOUNT\nAcme,1,10\nGlobex,2,20\n",
    );
    let out = fx.supsum().arg("summary").arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "custom labels resolve: {}", stderr(&out));

    std::fs::write(fx.path("settings.toml"), "require_tax_id = true\n[labels]\ntotal_amount = \"AMOUNT\"\ntax_id = \"TAX ID\"\n").unwrap();
    let out = fx.supsum().arg("summary").arg(&file).output().unwrap();
    assert_eq!(code(&out), 5);
    let err = stderr(&out);
    assert!(err.contains("--tin-col"), "{err}");
    assert!(err.contains("B=TIN"), "{err}");

    let out = fx.supsum().args(["summary", "--tin-col", "B", "--json"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["column_source"], "manual");
    assert_eq!(v["columns"]["tax_id"], "B");
    assert_eq!(amount(&v["total"]["total_amount"]), 30.0);
}

#[test]
fn manual_flags_override_detection() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx
        .supsum()
        .args(["summary", "--json", "--tin-col", "none", "--supplier-col", "2"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["columns"]["tax_id"], serde_json::Value::Null);
    assert_eq!(v["columns"]["supplier_name"], "B");
    assert_eq!(v["records"][0]["tax_id"], "");
}

#[test]
fn unknown_column_flag_is_usage_error() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx.supsum().args(["summary", "--amount-col", "Paid"]).arg(&file).output().unwrap();
    assert_eq!(code(&out), 2);
    assert!(stderr(&out).contains("available columns"));
}

#[test]
fn unsupported_or_broken_input_exits_3() {
    let fx = Fixture::new();
    let pdf = fx.write("report.pdf", "%PDF-1.4");
    let out = fx.supsum().arg("summary").arg(&pdf).output().unwrap();
    assert_eq!(code(&out), 3);

    let broken = fx.write("broken.xlsx", "not a zip");
    let out = fx.supsum().arg("summary").arg(&broken).output().unwrap();
    assert_eq!(code(&out), 3);

    let out = fx.supsum().arg("summary").arg(fx.path("missing.xlsx")).output().unwrap();
    assert_eq!(code(&out), 3);
}

// ===========================================================================
// export / columns / browse
// ===========================================================================

#[test]
fn export_default_name_and_explicit_output() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();

    let out = fx.supsum().arg("export").arg(&file).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(is_xlsx(&fx.path("Supplier_Summary.xlsx")));
    assert!(stderr(&out).contains("(4 entries)"));

    let target = fx.path("acme.xlsx");
    let out = fx.supsum().args(["export", "-q", "acme", "--quiet", "-o"]).arg(&target).arg(&file).output().unwrap();
    assert_eq!(code(&out), 0);
    assert!(is_xlsx(&target));
    assert!(stderr(&out).is_empty());
}

#[test]
fn export_fail_on_empty_writes_nothing() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let target = fx.path("none.xlsx");
    let out = fx
        .supsum()
        .args(["export", "-q", "zzz", "--fail-on-empty", "-o"])
        .arg(&target)
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(code(&out), 6);
    assert!(!target.exists());
}

#[test]
fn columns_lists_labels() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let out = fx.supsum().arg("columns").arg(&file).output().unwrap();
    assert_eq!(code(&out), 0);
    let text = stdout(&out);
    assert!(text.contains("header row: 4"));
    assert!(text.contains("NAME OF SUPPLIERS  -> Supplier Name"));
    assert!(text.contains("detected automatically"));

    let out = fx.supsum().args(["columns", "--json"]).arg(&file).output().unwrap();
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["labels"][0], "NO.");
    assert_eq!(v["resolution"]["status"], "resolved");
}

#[test]
fn browse_reads_queries_from_stdin() {
    let fx = Fixture::new();
    let file = fx.payments_xlsx();
    let mut cmd = fx.supsum();
    cmd.arg("browse").arg(&file);
    let out = run_with_stdin(cmd, "globex\n:export view.xlsx\n\n:quit\n");
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert_eq!(text.matches("Number of entries (excluding total): 4").count(), 2);
    assert!(text.contains("Number of entries (excluding total): 1"));
    assert!(text.contains("wrote view.xlsx (1 entries)"));
    assert!(is_xlsx(&fx.path("view.xlsx")));
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn config_init_show_and_refuse_overwrite() {
    let fx = Fixture::new();
    let path = fx.path("fresh/settings.toml");

    let out = fx.supsum().arg("--config").arg(&path).args(["config", "init"]).output().unwrap();
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(path.exists());

    let out = fx.supsum().arg("--config").arg(&path).args(["config", "show"]).output().unwrap();
    assert_eq!(code(&out), 0);
    assert!(stdout(&out).contains("NAME OF SUPPLIERS"));

    let out = fx.supsum().arg("--config").arg(&path).args(["config", "init"]).output().unwrap();
    assert_eq!(code(&out), 2);
    assert!(stderr(&out).contains("--force"));

    let out = fx.supsum().arg("--config").arg(&path).args(["config", "init", "--force"]).output().unwrap();
    assert_eq!(code(&out), 0);
}

#[test]
fn malformed_settings_exit_1() {
    let fx = Fixture::new();
    std::fs::write(fx.path("settings.toml"), "labels = [broken").unwrap();
    let file = fx.payments_xlsx();
    let out = fx.supsum().arg("summary").arg(&file).output().unwrap();
    assert_eq!(code(&out), 1);
    assert!(stderr(&out).contains("config init --force"));
}
