
use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::EXIT_USAGE;
use predicates::prelude::*;

#[test]
fn test_help_shows_kinds_and_flags() {
    cargo_bin_cmd!("teleword")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("text"))
        .stdout(predicate::str::contains("photo"))
        .stdout(predicate::str::contains("video"))
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("--markdown"))
        .stdout(predicate::str::contains("--silent"))
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--insecure"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("CHAT_ID"));
}

#[test]
fn test_photo_help_shows_caption() {
    cargo_bin_cmd!("teleword")
        .args(["42", "photo", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--caption"))
        .stdout(predicate::str::contains("FILE_PATH"));
}

#[test]
fn test_video_help_shows_streaming() {
    cargo_bin_cmd!("teleword")
        .args(["42", "video", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--caption"))
        .stdout(predicate::str::contains("--streaming"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("teleword")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_missing_arguments_is_usage_error() {
    cargo_bin_cmd!("teleword")
        .env("TELEGRAM_BOT_TOKEN", "ABC")
        .assert()
        .code(EXIT_USAGE)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unknown_kind_is_usage_error() {
    cargo_bin_cmd!("teleword")
        .env("TELEGRAM_BOT_TOKEN", "ABC")
        .args(["42", "audio", "song.mp3"])
        .assert()
        .code(EXIT_USAGE)
        .stderr(predicate::str::contains("audio"));
}

#[test]
fn test_streaming_is_video_only() {
    cargo_bin_cmd!("teleword")
        .env("TELEGRAM_BOT_TOKEN", "ABC")
        .args(["42", "photo", "cat.jpg", "--streaming"])
        .assert()
        .code(EXIT_USAGE);
}

#[test]
fn test_zero_timeout_is_rejected() {
    cargo_bin_cmd!("teleword")
        .env("TELEGRAM_BOT_TOKEN", "ABC")
        .args(["--timeout", "0", "42", "text", "hi"])
        .assert()
        .code(EXIT_USAGE);
}
