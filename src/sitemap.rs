//! Static sitemap generation from tracked site files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate};
use owo_colors::OwoColorize;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use url::Url;

pub const BASE_URL: &str = "https://kenshikuroki.github.io";
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const TRACKED_HOME: &str = "index.html";
const TRACKED_CV: &str = "assets/documents/CV_kuroki.pdf";
// Not directly accessible pages; their freshness is credited to the site root.
const TRACKED_DATA: [&str; 2] = [
    "assets/data/publications.json",
    "assets/data/presentations.json",
];

/// One `<url>` entry of the sitemap, built fresh each run.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteUrl {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Builds the URL list for the site rooted at `root`.
///
/// The home page always comes first. The CV is listed only when present. Data
/// files never get their own entry; the newest of them promotes the home
/// page's `lastmod` so crawlers see content updates.
pub fn scan(root: &Path, base_url: &Url) -> Vec<SiteUrl> {
    let mut urls = vec![SiteUrl {
        loc: page_loc(base_url, "/"),
        lastmod: modification_date(&root.join(TRACKED_HOME)),
        changefreq: "monthly",
        priority: "1.0",
    }];

    let cv = root.join(TRACKED_CV);
    if cv.exists() {
        urls.push(SiteUrl {
            loc: page_loc(base_url, &format!("/{TRACKED_CV}")),
            lastmod: modification_date(&cv),
            changefreq: "monthly",
            priority: "0.8",
        });
    }

    for tracked in TRACKED_DATA {
        let file = root.join(tracked);
        if file.exists() {
            let lastmod = modification_date(&file);
            if lastmod > urls[0].lastmod {
                urls[0].lastmod = lastmod;
            }
        }
    }

    urls
}

/// The file's modification date in local time, today when it cannot be read.
fn modification_date(path: &Path) -> NaiveDate {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(|time| DateTime::<Local>::from(time).date_naive())
        .unwrap_or_else(|_| Local::now().date_naive())
}

fn page_loc(base_url: &Url, path: &str) -> String {
    format!("{}{}", base_url.as_str().trim_end_matches('/'), path)
}

/// Serializes the entries as a sitemap-protocol document, one tag per line,
/// two-space indentation.
pub fn render_xml(urls: &[SiteUrl]) -> anyhow::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for url in urls {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &url.loc)?;
        write_text_element(&mut writer, "lastmod", &url.lastmod.to_string())?;
        write_text_element(&mut writer, "changefreq", url.changefreq)?;
        write_text_element(&mut writer, "priority", url.priority)?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    String::from_utf8(writer.into_inner()).context("sitemap is not valid UTF-8")
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn generate(root: &Path, base_url: &Url, out: &Path) -> anyhow::Result<Vec<SiteUrl>> {
    let urls = scan(root, base_url);
    let xml = render_xml(&urls)?;
    fs::write(out, xml).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(urls)
}

/// CLI entry for the generator. Failures are reported on the console rather
/// than raised.
pub fn run(root: &Path, base_url: &Url, out: Option<&Path>) {
    let out_path: PathBuf = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join("sitemap.xml"));
    match generate(root, base_url, &out_path) {
        Ok(urls) => {
            eprintln!("Sitemap generated: {}", out_path.display());
            eprintln!("Total URLs: {}", urls.len());
            for url in &urls {
                eprintln!("  - {} (last modified: {})", url.loc, url.lastmod);
            }
        }
        Err(e) => eprintln!("{} sitemap generation failed: {e:#}", "✗".red()),
    }
}
