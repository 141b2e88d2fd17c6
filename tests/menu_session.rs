mod common;
use crate::common::{ConfigBuilder, capturing_runner, with_timeout};

use std::error::Error;

use arkforge::menu::run_menu;
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

async fn session(script: &str, cancel: &CancellationToken) -> Result<String, Box<dyn Error>> {
    let ws = tempfile::tempdir()?;
    let cfg = ConfigBuilder::new().workspace(ws.path()).no_theme().build();
    let (runner, _capture) = capturing_runner();

    let mut input = script.as_bytes();
    let mut out = Vec::new();
    with_timeout(run_menu(&cfg, &runner, cancel, &mut input, &mut out)).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn fleet_status_then_exit() -> TestResult {
    let out = session("4\n\n0\n", &CancellationToken::new()).await?;

    assert!(out.contains("ARKFORGE COMMAND DECK"));
    assert!(out.contains("ARK FLEET STATUS"));
    assert!(out.contains("(op515dl1) [Secondary]"));
    assert!(out.contains("Commander koobie777, the ARK stands ready for return."));
    assert!(!out.contains("\x1b[2J"));
    Ok(())
}

#[tokio::test]
async fn unknown_selection_returns_to_deck() -> TestResult {
    let out = session("9\n\n5\n\n0\n", &CancellationToken::new()).await?;

    assert!(out.contains("Unknown selection \"9\""));
    assert!(out.contains("USER GUIDE"));
    assert_eq!(out.matches("ARKFORGE COMMAND DECK").count(), 3);
    Ok(())
}

#[tokio::test]
async fn end_of_input_leaves_quietly() -> TestResult {
    let out = session("", &CancellationToken::new()).await?;

    assert_eq!(out.matches("ARKFORGE COMMAND DECK").count(), 1);
    assert!(!out.contains("stands ready"));
    Ok(())
}

#[tokio::test]
async fn failed_build_keeps_the_menu_running() -> TestResult {
    // No source tree in the workspace: the build fails before any process runs.
    let out = session("1\n\n0\n", &CancellationToken::new()).await?;

    assert!(out.contains("Press Enter to return"));
    assert!(out.contains("stands ready for return"));
    Ok(())
}

#[tokio::test]
async fn cancellation_ends_the_session() -> TestResult {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let ws = tempfile::tempdir()?;
    let cfg = ConfigBuilder::new().workspace(ws.path()).no_theme().build();
    let (runner, _capture) = capturing_runner();

    // A reader that never yields a line.
    let (_writer, reader) = tokio::io::duplex(64);
    let mut input = tokio::io::BufReader::new(reader);
    let mut out = Vec::new();
    with_timeout(run_menu(&cfg, &runner, &cancel, &mut input, &mut out)).await?;

    assert!(String::from_utf8(out)?.contains("Select ARKFORGE operation"));
    Ok(())
}
