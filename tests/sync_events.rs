mod support;

use predicates::str::contains;

use support::{seed_weekly, TestDir};

#[test]
fn template_region_event_runs_the_full_pipeline() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;

    // drop the store, then let a template-region event rebuild it
    std::fs::remove_file(dir.path().join(".rota").join("occurrences.json"))?;

    dir.cmd_on("01.01.2024")
        .args([
            "sync", "--surface", "templates", "--rows", "2..3", "--cols", "1..7",
        ])
        .assert()
        .success()
        .stdout(contains("full pipeline run"));

    assert_eq!(dir.read_occurrences()?.len(), 5);
    Ok(())
}

#[test]
fn template_header_event_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;
    let before = dir.read_occurrences()?;

    dir.cmd_on("01.02.2024")
        .args([
            "sync", "--surface", "templates", "--rows", "1", "--cols", "1..7",
        ])
        .assert()
        .success()
        .stdout(contains("ignored"));

    // a regenerate at the later date would have grown the store
    assert_eq!(dir.read_occurrences()?, before);
    Ok(())
}

#[test]
fn today_cell_event_applies_the_backward_edit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;

    dir.cmd_on("08.01.2024")
        .args([
            "sync", "--surface", "today", "--rows", "4", "--cols", "4", "--row", "1", "--done",
            "true",
        ])
        .assert()
        .success()
        .stdout(contains("today-view edit applied"));

    let occurrences = dir.read_occurrences()?;
    assert!(occurrences
        .iter()
        .find(|occ| occ.due_date.to_string() == "2024-01-08")
        .expect("01-08 occurrence")
        .done);
    Ok(())
}

#[test]
fn today_multi_cell_event_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;
    let before = dir.read_occurrences()?;

    dir.cmd_on("08.01.2024")
        .args([
            "sync", "--surface", "today", "--rows", "4..6", "--cols", "3..4", "--row", "1",
            "--done", "true",
        ])
        .assert()
        .success()
        .stdout(contains("ignored"));

    assert_eq!(dir.read_occurrences()?, before);
    Ok(())
}

#[test]
fn calendar_selector_event_rebuilds_the_grid_only() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;
    let before = dir.read_occurrences()?;

    dir.cmd_on("01.02.2024")
        .args([
            "sync", "--surface", "calendar", "--rows", "2", "--cols", "2",
        ])
        .assert()
        .success()
        .stdout(contains("calendar rebuilt"));

    // store untouched even though the reference date moved
    assert_eq!(dir.read_occurrences()?, before);
    Ok(())
}

#[test]
fn out_of_scope_calendar_event_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;

    dir.cmd_on("01.01.2024")
        .args([
            "sync", "--surface", "calendar", "--rows", "5..9", "--cols", "1..4",
        ])
        .assert()
        .success()
        .stdout(contains("ignored"));
    Ok(())
}

#[test]
fn bad_range_syntax_is_a_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    seed_weekly(&dir)?;

    dir.cmd_on("01.01.2024")
        .args([
            "sync", "--surface", "templates", "--rows", "9..2", "--cols", "1",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid range"));
    Ok(())
}
