use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use rota::occurrence::{Occurrence, OccurrenceSnapshot};
use tempfile::TempDir;

pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Fresh directory with `rota init` already run
    pub fn init() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let this = Self { dir };
        this.cmd().arg("init").assert().success();
        Ok(this)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Command pointed at this directory
    pub fn cmd(&self) -> Command {
        let mut cmd = rota_cmd();
        cmd.env_remove("ROTA_DIR");
        cmd.env_remove("ROTA_TODAY");
        cmd.arg("--dir").arg(self.dir.path());
        cmd
    }

    /// Command with a fixed reference date (DD.MM.YYYY)
    pub fn cmd_on(&self, today: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--today").arg(today);
        cmd
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".rota.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Read the canonical occurrence store straight off disk
    pub fn read_occurrences(&self) -> Result<Vec<Occurrence>, Box<dyn std::error::Error>> {
        let path = self.dir.path().join(".rota").join("occurrences.json");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        let snapshot: OccurrenceSnapshot = serde_json::from_str(&contents)?;
        Ok(snapshot.occurrences)
    }
}

pub fn rota_cmd() -> Command {
    Command::cargo_bin("rota").expect("binary")
}

/// Seed one weekly template and generate with a one-month horizon:
/// "Water plants" (T1), every 7 days from 2024-01-01.
pub fn seed_weekly(dir: &TestDir) -> Result<(), Box<dyn std::error::Error>> {
    dir.write_config("[schedule]\nmonths_ahead = 1\n")?;
    dir.cmd_on("01.01.2024")
        .args([
            "template",
            "add",
            "Water plants",
            "--start",
            "01.01.2024",
            "--every",
            "7",
            "--color",
            "#00F",
            "--id",
            "T1",
        ])
        .assert()
        .success();
    Ok(())
}
