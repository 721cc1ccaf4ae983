use anyhow::Result;
use serde_json::{Value, json};

use crate::{CliTest, run};

const APP: &str = r#"import { useTranslate, T } from '@tolgee/react';

export function App() {
  const { t } = useTranslate('page');
  return <h1 title={t('title', 'Title')}><T keyName="body" /></h1>;
}
"#;

const DYNAMIC: &str = "const { t } = useTranslate();\n\nt(dynamicVar);\n";

// ============================================================
// extract print
// ============================================================

#[test]
fn test_print_lists_keys_and_totals() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;

    let (code, stdout, stderr) = run(test.print_command())?;
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("src/App.tsx\n"));
    assert!(stdout.contains("5 | title  ns: page  \"Title\""));
    assert!(stdout.contains("5 | body"));
    assert!(stdout.contains("Found 2 unique keys in 1 file, 0 warnings"));

    Ok(())
}

#[test]
fn test_print_json() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;
    test.write_file("src/dynamic.ts", DYNAMIC)?;

    let mut cmd = test.print_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, stderr) = run(cmd)?;
    assert_eq!(code, 0, "stderr: {stderr}");

    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(
        value,
        json!([
            {
                "file": "src/App.tsx",
                "keys": [
                    { "keyName": "title", "namespace": "page", "defaultValue": "Title", "line": 5 },
                    { "keyName": "body", "line": 5 }
                ]
            },
            {
                "file": "src/dynamic.ts",
                "keys": [],
                "warnings": [{ "warning": "W_DYNAMIC_KEY", "line": 3 }]
            }
        ])
    );

    Ok(())
}

#[test]
fn test_print_does_not_fail_on_warnings() -> Result<()> {
    let test = CliTest::with_file("src/dynamic.ts", DYNAMIC)?;

    let (code, stdout, _) = run(test.print_command())?;
    assert_eq!(code, 0);
    assert!(stdout.contains("W_DYNAMIC_KEY"));
    assert!(stdout.contains("--> src/dynamic.ts:3"));

    Ok(())
}

#[test]
fn test_print_every_family() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "src/Page.vue",
        "<template>\n  <span v-t=\"{ key: 'c', ns: 'n' }\"></span>\n</template>\n",
    )?;
    test.write_file(
        "src/Nav.svelte",
        "<h1>{$t('nav')}</h1>\n<script>\n  const { t } = getTranslate('menu');\n</script>\n",
    )?;
    test.write_file("src/app.html", "<h1>{{ 'hero' | translate }}</h1>\n")?;
    test.write_file("src/plain.html", "<h1>{{ 'nothing' }}</h1>\n")?;

    let mut cmd = test.print_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, stderr) = run(cmd)?;
    assert_eq!(code, 0, "stderr: {stderr}");

    let value: Value = serde_json::from_str(&stdout)?;
    let files: Vec<(&str, &str)> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["file"].as_str().unwrap(),
                f["keys"][0]["keyName"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        files,
        vec![
            ("src/Nav.svelte", "nav"),
            ("src/Page.vue", "c"),
            ("src/app.html", "hero"),
        ]
    );

    Ok(())
}

// ============================================================
// extract check
// ============================================================

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;

    let (code, stdout, _) = run(test.check_command())?;
    assert_eq!(code, 0);
    assert_eq!(stdout, "\u{2713} Checked 1 source file - no issues found\n");

    Ok(())
}

#[test]
fn test_check_fails_on_warnings() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;
    test.write_file("src/dynamic.ts", DYNAMIC)?;

    let (code, stdout, _) = run(test.check_command())?;
    assert_eq!(code, 1);
    assert!(stdout.contains("warning: Dynamic key  W_DYNAMIC_KEY"));
    assert!(stdout.contains("--> src/dynamic.ts:3"));
    assert!(stdout.contains("1 problem (0 errors, 1 warning)"));
    assert!(!stdout.contains("title"));

    Ok(())
}

#[test]
fn test_check_json_lists_only_files_with_warnings() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;
    test.write_file("src/dynamic.ts", DYNAMIC)?;

    let mut cmd = test.check_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, _) = run(cmd)?;
    assert_eq!(code, 1);
    assert_eq!(
        serde_json::from_str::<Value>(&stdout)?,
        json!([{ "file": "src/dynamic.ts", "warnings": [{ "warning": "W_DYNAMIC_KEY", "line": 3 }] }])
    );

    Ok(())
}

#[test]
fn test_check_ignore_comment() -> Result<()> {
    let test = CliTest::with_file(
        "src/dynamic.ts",
        "const { t } = useTranslate();\n// @tolgee-ignore\nt(dynamicVar);\n",
    )?;

    let (code, _, _) = run(test.check_command())?;
    assert_eq!(code, 0);

    Ok(())
}

#[test]
fn test_strict_namespace_flags() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        "const { t } = useTranslate();\nt('a', { ...opts });\n",
    )?;

    let (code, stdout, _) = run(test.check_command())?;
    assert_eq!(code, 1);
    assert!(stdout.contains("W_DYNAMIC_OPTIONS"));

    let mut cmd = test.print_command();
    cmd.arg("--no-strict-namespace");
    let (code, stdout, _) = run(cmd)?;
    assert_eq!(code, 0);
    assert!(stdout.contains("2 | a"));
    assert!(!stdout.contains("W_DYNAMIC_OPTIONS"));

    Ok(())
}

// ============================================================
// Configuration and patterns
// ============================================================

#[test]
fn test_config_patterns_ignores_and_default_namespace() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".tolgeerc.json",
        r#"{
          "patterns": ["web"],
          "ignores": ["**/generated/**"],
          "defaultNamespace": "common"
        }"#,
    )?;
    test.write_file("web/app.ts", "tolgee.t('kept');")?;
    test.write_file("web/generated/gen.ts", "tolgee.t('ignored');")?;
    test.write_file("src/other.ts", "tolgee.t('outside');")?;

    let mut cmd = test.print_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, stderr) = run(cmd)?;
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(
        serde_json::from_str::<Value>(&stdout)?,
        json!([{
            "file": "web/app.ts",
            "keys": [{ "keyName": "kept", "namespace": "common", "line": 1 }]
        }])
    );

    Ok(())
}

#[test]
fn test_cli_patterns_override_config() -> Result<()> {
    let test = CliTest::with_file(".tolgeerc.json", r#"{ "patterns": ["src"] }"#)?;
    test.write_file("src/a.ts", "tolgee.t('a');")?;
    test.write_file("lib/b.ts", "tolgee.t('b');")?;

    let mut cmd = test.print_command();
    cmd.args(["lib/**/*.ts", "--default-namespace", "cli"]);
    let (code, stdout, _) = run(cmd)?;
    assert_eq!(code, 0);
    assert!(stdout.contains("lib/b.ts"));
    assert!(stdout.contains("ns: cli"));
    assert!(!stdout.contains("src/a.ts"));

    Ok(())
}

#[test]
fn test_forced_parser() -> Result<()> {
    let test = CliTest::with_file("src/store.ts", "const { t } = getTranslate('x');\n$t('s');\n")?;

    let mut cmd = test.print_command();
    cmd.args(["--parser", "svelte", "--format", "json"]);
    let (_, stdout, _) = run(cmd)?;
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value[0]["keys"][0]["keyName"], "s");
    assert_eq!(value[0]["keys"][0]["namespace"], "x");

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file(".tolgeerc.json", r#"{ "ignores": ["[invalid"] }"#)?;

    let (code, _, stderr) = run(test.check_command())?;
    assert_eq!(code, 2);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("ignores"));

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let (code, stdout, _) = run(test.command())?;
    assert_eq!(code, 0);
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("init"));

    Ok(())
}
