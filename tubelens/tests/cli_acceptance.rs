use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;
use tubelens_core::Database;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("tubelens/tubelens.db")
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../tubelens-core/tests/fixtures")
        .join(name)
}

fn run_bin(env: &CliTestEnv, bin_name: &str, args: &[&str]) -> Output {
    let bin_path = match bin_name {
        "tubelens-import" => PathBuf::from(assert_cmd::cargo::cargo_bin!("tubelens-import")),
        "tubelens-report" => PathBuf::from(assert_cmd::cargo::cargo_bin!("tubelens-report")),
        "tubelens-abtest" => PathBuf::from(assert_cmd::cargo::cargo_bin!("tubelens-abtest")),
        _ => panic!("unsupported binary in test harness: {bin_name}"),
    };

    let mut command = Command::new(bin_path);

    command
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute {bin_name}: {e}"))
}

fn assert_success(bin_name: &str, args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "{bin_name} {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn import_studio_export_populates_db() {
    let env = CliTestEnv::new();
    let pattern = fixture("*.csv").to_string_lossy().to_string();
    let args = ["--csv", pattern.as_str()];

    let output = run_bin(&env, "tubelens-import", &args);
    assert_success("tubelens-import", &args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Import complete:"));
    assert!(
        stdout.contains("Records imported:  16"),
        "expected import summary in stdout, got:\n{stdout}"
    );

    let db_path = env.db_path();
    assert!(
        db_path.exists(),
        "database file should exist at {}",
        db_path.display()
    );

    let db = Database::open(&db_path).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    assert_eq!(db.count_videos().expect("failed to count videos"), 16);

    let stats = db
        .get_channel_stats("local")
        .expect("failed to load channel stats")
        .expect("channel stats should be recorded");
    assert_eq!(stats.total_videos, 16);

    // Second run sees the same bytes and skips the file
    let again = run_bin(&env, "tubelens-import", &args);
    assert_success("tubelens-import", &args, &again);
    let stdout = String::from_utf8_lossy(&again.stdout);
    assert!(stdout.contains("Files skipped:     1"), "got:\n{stdout}");
}

#[test]
fn import_requires_a_source() {
    let env = CliTestEnv::new();
    let output = run_bin(&env, "tubelens-import", &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nothing to import"), "got:\n{stderr}");
}

#[test]
fn report_and_abtest_work_on_demo_database() {
    let env = CliTestEnv::new();

    let import_args = ["--demo", "45", "--seed", "7"];
    let import = run_bin(&env, "tubelens-import", &import_args);
    assert_success("tubelens-import", &import_args, &import);

    let report = run_bin(&env, "tubelens-report", &[]);
    assert_success("tubelens-report", &[], &report);
    let stdout = String::from_utf8_lossy(&report.stdout);
    assert!(stdout.contains("45 videos"));
    assert!(stdout.contains("Best time to post"));

    let json_args = ["--export", "json", "--days", "14"];
    let json = run_bin(&env, "tubelens-report", &json_args);
    assert_success("tubelens-report", &json_args, &json);
    let value: serde_json::Value =
        serde_json::from_slice(&json.stdout).expect("report should be valid JSON");
    assert_eq!(value["video_count"], 45);
    assert_eq!(value["forecasts"]["views_forecast"]["horizon_days"], 14);
    assert_eq!(
        value["forecasts"]["views_forecast"]["predictions"]
            .as_array()
            .map(Vec::len),
        Some(14)
    );

    let md = run_bin(&env, "tubelens-report", &["--export", "md"]);
    assert_success("tubelens-report", &["--export", "md"], &md);
    assert!(String::from_utf8_lossy(&md.stdout).contains("## Summary"));

    let bad = run_bin(&env, "tubelens-report", &["--export", "pdf"]);
    assert!(!bad.status.success());

    let title_args = [
        "title",
        "My Editing Workflow",
        "Top 10 Editing Tips for Beginners",
    ];
    let title = run_bin(&env, "tubelens-abtest", &title_args);
    assert_success("tubelens-abtest", &title_args, &title);
    let stdout = String::from_utf8_lossy(&title.stdout);
    assert!(stdout.contains("Verdict:"));
    assert!(stdout.contains("Based on 45 videos"));
}

#[test]
fn abtest_thumbnail_rejects_non_images() {
    let env = CliTestEnv::new();
    let a = fixture("studio_export.csv").to_string_lossy().to_string();
    let b = fixture("api_videos.json").to_string_lossy().to_string();

    let output = run_bin(&env, "tubelens-abtest", &["thumbnail", &a, &b]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unable to analyze thumbnails"), "got:\n{stdout}");
}
