use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use assert_cmd::Command; // Run programs
use std::process::Stdio;
use std::path::Path;
use std::fs::File;

#[test]
fn verify_part_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-f").arg(Path::new("tests").join("macrob").join("part.src"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Passing"));
    Ok(())
}

#[test]
fn verify_piped() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-t").arg("src")
        .write_stdin("O100\nG00 X0\n#1 = [#2 + 1] * 2\nM30\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Passing"))
        .stdout(predicate::str::contains("#1 = [#2 + 1] * 2"));
    Ok(())
}

#[test]
fn verify_with_workspace() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = std::process::Command::cargo_bin("mbkit")?;
    if let Ok(fd) = File::open(Path::new("tests").join("macrob").join("part.src")) {
        // stdin has no directory, so the includes need the workspace
        cmd.arg("verify")
            .arg("-t").arg("src")
            .arg("-w").arg(Path::new("tests").join("macrob"))
            .stdin(Stdio::from(fd))
            .assert()
            .success()
            .stderr(predicate::str::contains("Passing"));
    }
    Ok(())
}

#[test]
fn verify_errors() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-f").arg(Path::new("tests").join("macrob").join("errors.src"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("END label does not match DO label"))
        .stderr(predicate::str::contains("[unknown-symbol]"))
        .stderr(predicate::str::contains("errors"));
    Ok(())
}

#[test]
fn ignore_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-t").arg("src")
        .arg("-c").arg(r#"{"flag":{"unknownSymbol":"ignore"}}"#)
        .write_stdin("#1 = FEED\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("warnings").not());
    Ok(())
}

#[test]
fn print_tree() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-t").arg("def")
        .arg("--ast")
        .write_stdin("@FEED 250\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("(SymbolDeclaration"))
        .stderr(predicate::str::contains("(DefFile"));
    Ok(())
}

#[test]
fn invalid_file_type() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-t").arg("srx")
        .write_stdin("G00\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("srx"));
    Ok(())
}

#[test]
fn missing_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("verify")
        .arg("-f").arg(Path::new("tests").join("macrob").join("nothere.src"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn completions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mbkit")?;
    cmd.arg("completions")
        .arg("-s").arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("mbkit"));
    Ok(())
}
