use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn recast_cmd() -> Command {
    let mut cmd = Command::cargo_bin("recast").expect("Failed to find recast binary");
    cmd.env_remove("RECAST_CRF");
    cmd
}

#[test]
fn test_help_mentions_single_instance_rule() -> Result<(), Box<dyn Error>> {
    recast_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--crf"))
        .stdout(contains("--no-faststart"))
        .stdout(contains("same file at the same time"));
    Ok(())
}

#[test]
fn test_missing_file_argument_is_rejected() -> Result<(), Box<dyn Error>> {
    recast_cmd()
        .assert()
        .failure()
        .stderr(contains("<FILE>"));
    Ok(())
}

#[test]
fn test_crf_out_of_range_is_rejected() -> Result<(), Box<dyn Error>> {
    recast_cmd()
        .arg("clip.mp4")
        .arg("--crf")
        .arg("60")
        .assert()
        .failure()
        .stderr(contains("--crf"));
    Ok(())
}

#[test]
fn test_crf_env_var_is_validated() -> Result<(), Box<dyn Error>> {
    recast_cmd()
        .env("RECAST_CRF", "99")
        .arg("clip.mp4")
        .assert()
        .failure();
    Ok(())
}

// Whether or not ffmpeg is installed, these runs stop before anything is
// renamed and report a recoverable failure.

#[test]
fn test_non_existent_file_exits_recoverable() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.mp4");

    recast_cmd()
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(contains("Error:"));

    assert!(!missing.exists());
    assert!(!dir.path().join("missing.mp4.bak").exists());
    Ok(())
}

#[test]
fn test_occupied_backup_leaves_original_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let original = dir.path().join("clip.mp4");
    let backup = dir.path().join("clip.mp4.bak");
    fs::write(&original, b"original")?;
    fs::write(&backup, b"stale backup")?;

    recast_cmd().arg(&original).assert().code(1);

    assert_eq!(fs::read(&original)?, b"original");
    assert_eq!(fs::read(&backup)?, b"stale backup");
    Ok(())
}

#[test]
fn test_invalid_profile_file_exits_recoverable() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let original = dir.path().join("clip.mp4");
    let profile = dir.path().join("profile.json");
    fs::write(&original, b"original")?;
    fs::write(&profile, b"{ not json")?;

    recast_cmd()
        .arg(&original)
        .arg("--profile")
        .arg(&profile)
        .assert()
        .code(1);

    assert_eq!(fs::read(&original)?, b"original");
    Ok(())
}
