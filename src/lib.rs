pub mod config;
pub mod html;
pub mod languages;
pub mod normalize;
pub mod postprocess;
pub mod render;
pub mod walk;

use config::Config;
use regex::Regex;
use render::JiraRenderer;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;

static RE_MARKDOWN_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(md|markdown)$").unwrap());

/// Markdown to Jira wiki markup with the default [`Config`].
pub fn convert(markdown: &str) -> String {
    convert_with(markdown, &Config::default())
}

pub fn convert_with(markdown: &str, config: &Config) -> String {
    let text = normalize::line_endings(markdown);
    let renderer = JiraRenderer::new(config);
    let rendered = walk::walk(&text, &renderer, config.verbose);
    postprocess::run(&rendered)
}

/// Markdown to HTML with highlighted code blocks. No Jira post-processing.
pub fn html(markdown: &str) -> String {
    html_with(markdown, &Config::default())
}

/// Only `verbose` applies; the Jira code-block settings do not.
pub fn html_with(markdown: &str, config: &Config) -> String {
    let text = normalize::line_endings(markdown);
    html::render(&text, config.verbose)
}

pub fn list_files(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = Vec::new();

    for p in inputs {
        if p.is_dir() {
            for entry in std::fs::read_dir(p)? {
                let entry = entry?;
                let sub_path = entry.path();
                if sub_path.is_dir() {
                    out.extend(list_files(&[sub_path])?);
                } else if sub_path.is_file() && is_markdown(&sub_path) {
                    out.push(sub_path);
                }
            }
        } else if p.is_file() {
            // Explicitly named files are taken whatever their extension.
            out.push(p.clone());
        }
    }

    out.sort();
    Ok(out)
}

fn is_markdown(path: &std::path::Path) -> bool {
    path.to_str().is_some_and(|s| RE_MARKDOWN_FILE.is_match(s))
}
