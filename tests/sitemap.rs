use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn touch(path: &Path, contents: &str, age: Duration) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    let file = fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(SystemTime::now() - age)
}

fn date_of(age: Duration) -> String {
    chrono::DateTime::<chrono::Local>::from(SystemTime::now() - age)
        .date_naive()
        .to_string()
}

#[test]
fn sitemap_full_site() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    touch(&root.join("index.html"), "<html></html>", 30 * DAY)?;
    touch(&root.join("assets/documents/CV_kuroki.pdf"), "%PDF", 5 * DAY)?;
    touch(&root.join("assets/data/publications.json"), "[]", 2 * DAY)?;
    touch(&root.join("assets/data/presentations.json"), "[]", 10 * DAY)?;

    let mut cmd = Command::cargo_bin("sitemaint")?;
    cmd.env("NO_COLOR", "1");
    cmd.arg("sitemap")
        .arg("--root")
        .arg(root)
        .arg("--base-url")
        .arg("https://example.org")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Sitemap generated:")
                .and(predicate::str::contains("Total URLs: 2")),
        );

    let xml = fs::read_to_string(root.join("sitemap.xml"))?;
    assert!(
        xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"),
        "missing XML declaration. xml=\n{}",
        xml
    );
    assert!(
        xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"),
        "missing namespaced urlset. xml=\n{}",
        xml
    );
    assert_eq!(xml.matches("<url>").count(), 2, "xml=\n{}", xml);
    assert!(xml.contains("<loc>https://example.org/</loc>"), "xml=\n{}", xml);
    assert!(
        xml.contains("<loc>https://example.org/assets/documents/CV_kuroki.pdf</loc>"),
        "xml=\n{}",
        xml
    );
    // publications.json is two days old and the freshest data file, so the
    // root entry inherits its date; the data files themselves stay unlisted.
    assert!(
        xml.contains(&format!("<lastmod>{}</lastmod>", date_of(2 * DAY))),
        "root lastmod not promoted. xml=\n{}",
        xml
    );
    assert!(!xml.contains("publications.json"), "xml=\n{}", xml);
    assert!(!xml.contains("presentations.json"), "xml=\n{}", xml);

    Ok(())
}

#[test]
fn sitemap_out_override() -> Result<(), Box<dyn std::error::Error>> {
    let site = tempfile::tempdir()?;
    let elsewhere = tempfile::tempdir()?;
    touch(&site.path().join("index.html"), "<html></html>", DAY)?;
    let out = elsewhere.path().join("custom.xml");

    let mut cmd = Command::cargo_bin("sitemaint")?;
    cmd.env("NO_COLOR", "1");

    let output = cmd
        .arg("sitemap")
        .arg("--root")
        .arg(site.path())
        .arg("--out")
        .arg(&out)
        .output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(
        stderr.contains("Total URLs: 1"),
        "stderr summary mismatch. stderr=\n{}",
        stderr
    );
    assert!(
        stderr.contains("- https://kenshikuroki.github.io/ (last modified:"),
        "default base URL not applied. stderr=\n{}",
        stderr
    );

    assert!(out.exists(), "--out destination was not written");
    assert!(
        !site.path().join("sitemap.xml").exists(),
        "default destination should be skipped when --out is given"
    );
    let xml = fs::read_to_string(&out)?;
    assert!(
        xml.contains("<loc>https://kenshikuroki.github.io/</loc>"),
        "xml=\n{}",
        xml
    );

    Ok(())
}

#[test]
fn sitemap_unwritable_destination() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let root = dir.path().join("missing");

    let mut cmd = Command::cargo_bin("sitemaint")?;
    cmd.env("NO_COLOR", "1");

    let output = cmd.arg("sitemap").arg("--root").arg(&root).output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(
        stderr.contains("✗ sitemap generation failed") && stderr.contains("failed to write"),
        "stderr did not explain the write failure. stderr=\n{}",
        stderr
    );

    Ok(())
}
