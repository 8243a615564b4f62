use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_min_cost() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("((a,c),b)")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("--min-cost")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "(0,0)\n");

    Ok(())
}

#[test]
fn command_min_cost_duplication() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,(a,b))")
        .arg("-s")
        .arg("(a,b)")
        .arg("--min-cost")
        .arg("--min-rooting")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("(1,0)"));
    assert!(stdout.contains("((a,a),b);"));

    Ok(())
}

#[test]
fn command_ternary_root() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,b,(c,d))")
        .arg("-s")
        .arg("((a,b),(c,d))")
        .arg("--min-cost")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "(0,0)\n");

    Ok(())
}

#[test]
fn command_files() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-G")
        .arg("tests/newick/genes.nwk")
        .arg("-S")
        .arg("tests/newick/species.nwk")
        .arg("--min-cost")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 3);
    assert_eq!(stdout, "(0,0)\n(0,0)\n(1,0)\n");

    Ok(())
}

#[test]
fn command_echoes_and_rootings() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,(b,c))")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("-p")
        .arg("-P")
        .arg("-R")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("((b,c),a);"));
    assert!(stdout.contains("((a,b),c);"));
    // an unrooted tree on 3 leaves has 3 edges
    assert_eq!(stdout.lines().count(), 5);

    Ok(())
}

#[test]
fn command_summaries() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,c)")
        .arg("-g")
        .arg("(a,(b,c))")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("--total")
        .arg("--dl-total")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.starts_with("((a,b),c);\t1\t(0,1)"));

    Ok(())
}

#[test]
fn command_weighted_total() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,(a,b))")
        .arg("-s")
        .arg("(a,b)")
        .arg("--total")
        .arg("--dup-weight")
        .arg("10")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("\t10\t"));

    Ok(())
}

#[test]
fn command_distributions() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,c)")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("--distributions")
        .arg("--tree-distributions")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // the lost b copy shows up on the b branch
    assert!(stdout.contains("(0,1)\tb"));
    assert!(stdout.contains("b dup(0) loss(1)"));

    Ok(())
}

#[test]
fn command_mappings_dump() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,(b,c))")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("-a")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("** leaf a"));
    assert!(stdout.contains("** int"));
    assert!(stdout.contains("(a,b) ==> (a,b)"));

    Ok(())
}

#[test]
fn command_attributes() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    let output = cmd
        .arg("reconcile")
        .arg("-g")
        .arg("(a,(b,c))")
        .arg("-s")
        .arg("((a,b),c)")
        .arg("-X")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("totalc({0,0})"));
    assert!(stdout.contains("markstart(1)"));
    assert!(stdout.contains("markopt(1)"));

    Ok(())
}

#[test]
fn command_mapping_error() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    cmd.arg("reconcile")
        .arg("-g")
        .arg("(a,c)")
        .arg("-s")
        .arg("(a,b)")
        .arg("--min-cost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mapping of c"));

    Ok(())
}

#[test]
fn command_parse_error() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    cmd.arg("reconcile")
        .arg("-g")
        .arg("((a,b")
        .arg("-s")
        .arg("(a,b)")
        .arg("--min-cost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));

    Ok(())
}

#[test]
fn command_missing_inputs() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("urec")?;
    cmd.arg("reconcile")
        .arg("-s")
        .arg("(a,b)")
        .arg("--min-cost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no gene trees"));

    Ok(())
}
