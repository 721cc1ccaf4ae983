use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, run};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let (code, stdout, _) = run({
        let mut cmd = test.command();
        cmd.arg("init");
        cmd
    })?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Created .tolgeerc.json"));

    let content = test.read_file(".tolgeerc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["patterns"], serde_json::json!(["src"]));
    assert_eq!(parsed["strictNamespace"], Value::Bool(true));

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".tolgeerc.json", "{}")?;

    let (code, _, stderr) = run({
        let mut cmd = test.command();
        cmd.arg("init");
        cmd
    })?;
    assert_eq!(code, 1);
    assert!(stderr.contains(".tolgeerc.json already exists"));
    assert_eq!(test.read_file(".tolgeerc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/app.ts", "tolgee.t('a');")?;

    let (code, stdout, stderr) = run(test.check_command())?;
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Checked 1 source file - no issues found"));
    assert!(test.root().join(".tolgeerc.json").exists());

    Ok(())
}
