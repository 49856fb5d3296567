use assert_cmd::Command;
use pairmatch::leaderboard::{BestTimeStore, ScoreDb};
use tempfile::tempdir;

fn pairmatch(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("pairmatch").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn refuses_to_run_without_a_tty() {
    let home = tempdir().unwrap();
    let output = pairmatch(home.path()).write_stdin("").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stdin must be a tty"));
}

#[test]
fn export_history_writes_csv_header() {
    let home = tempdir().unwrap();
    let out = home.path().join("wins.csv");

    pairmatch(home.path())
        .arg("--export-history")
        .arg(&out)
        .write_stdin("")
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        csv.lines().next(),
        Some("finished_at,elapsed_secs,moves,stars,pairs")
    );
    assert!(home
        .path()
        .join(".local/state/pairmatch/scores.db")
        .exists());
}

#[test]
fn history_without_wins_shows_no_best_time() {
    let home = tempdir().unwrap();
    let output = pairmatch(home.path())
        .arg("--history")
        .write_stdin("")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("best time: -"));
}

// ProjectDirs only honours XDG_CONFIG_HOME on Linux
#[cfg(target_os = "linux")]
#[test]
fn save_config_persists_flags() {
    let home = tempdir().unwrap();

    let output = pairmatch(home.path())
        .args(["--history", "--save-config", "-b", "7", "-d", "450"])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(output.status.success());

    let path = home.path().join(".config/pairmatch/config.json");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("saved settings to {}", path.display())));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved["mismatch_delay_ms"], 450);
    assert_eq!(saved["rating"]["kind"], "fixed");
    assert_eq!(saved["rating"]["breakpoint"], 7);
}

#[test]
fn clear_history_forgets_best_time() {
    let home = tempdir().unwrap();
    let db_path = home.path().join(".local/state/pairmatch/scores.db");
    {
        let mut db = ScoreDb::open(&db_path).unwrap();
        db.set_best_time(33).unwrap();
    }

    let before = pairmatch(home.path())
        .arg("--history")
        .write_stdin("")
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&before.stdout).contains("best time: 33s"));

    let cleared = pairmatch(home.path())
        .arg("--clear-history")
        .write_stdin("")
        .output()
        .unwrap();
    assert!(cleared.status.success());
    assert!(String::from_utf8_lossy(&cleared.stdout).contains("cleared"));

    let db = ScoreDb::open(&db_path).unwrap();
    assert_eq!(db.best_time().unwrap(), None);
}
