//! HTML rendering of the compatibility matrix.
//!
//! All interpolated text goes through [`escape`]. Anchor identifiers go through [`anchor_id`] instead, which leaves
//! only word characters and `-`.

use std::fmt::Write;

use wpt_core::{QualifiedName, TestOutcome};

use super::tree::CategoryTree;
use crate::store::VersionSnapshot;

const TITLE: &str = "Web-Platform-Tests compatibility";

/// Escape `& < > " ' /` for use in element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c => out.push(c),
        }
    }
    out
}

/// Replace every character outside `[A-Za-z0-9_]` with `-`.
///
/// Distinct labels can share an id (`a›b` and `a.b` both give `a-b`); the page then carries duplicate `id`s and
/// the first one wins as a fragment target.
pub fn anchor_id(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

/// The state of one (version, test) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// The test is not among the version's outcomes.
    NotRun,
    Yes,
    No,
    Error(&'a str),
}

impl<'a> Cell<'a> {
    pub fn resolve(snapshot: &'a VersionSnapshot, name: &QualifiedName) -> Self {
        match snapshot.result.get(name) {
            None => Cell::NotRun,
            Some(TestOutcome::Passed) => Cell::Yes,
            Some(TestOutcome::Failed(_)) => Cell::No,
            Some(TestOutcome::Errored(message)) => Cell::Error(message),
        }
    }

    pub fn to_html(self) -> String {
        let (class, title) = match self {
            Cell::NotRun => return r#"<div class="No">-</div>"#.to_string(),
            Cell::Yes => ("Yes", "Test passed"),
            Cell::No => ("No", "Test failed"),
            Cell::Error(message) => ("Error", message),
        };
        format!(r#"<div class="{class}" title="{}">{class}</div>"#, escape(title))
    }
}

/// `floor(passed / catalog_size * 100)`, or 0 for an empty catalog.
pub fn percent(snapshot: &VersionSnapshot, catalog_size: usize) -> u64 {
    if catalog_size == 0 {
        return 0;
    }
    (snapshot.result.passed() as f64 / catalog_size as f64 * 100.0).floor() as u64
}

/// The `<tr>` of version headers.
pub fn header_row(versions: &[VersionSnapshot], catalog_size: usize) -> String {
    let mut out = String::from("<tr>");
    for snapshot in versions {
        let _ = write!(
            out,
            r#"<th class="version">{}<sub>{}%</sub></th>"#,
            escape(&snapshot.version),
            percent(snapshot, catalog_size)
        );
    }
    out.push_str("</tr>");
    out
}

/// Render the full document. `versions` must already be in column order.
pub fn render(versions: &[VersionSnapshot], tree: &CategoryTree, catalog_size: usize) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta http-equiv="X-UA-Compatible" content="IE=edge" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{TITLE}</title>
<link href="favico.ico" rel="shortcut icon" />
<link rel="stylesheet" href="style.css" />
</head>
<body>
<header>
<h1><a href="#top">{TITLE}</a></h1>
<table class="headings">
{}
</table>
</header>
<article id="top">
"##,
        header_row(versions, catalog_size)
    );

    let colspan = versions.len() + 1;
    for (category, subcategories) in tree.categories() {
        let category_id = anchor_id(category);
        let _ = write!(
            out,
            r##"<table class="results">
<caption><h2 class="category"><div class="hash" id="{category_id}"></div><a href="#{category_id}">{category_id}</a></h2></caption>
"##
        );
        for (subcategory, leaves) in subcategories {
            let sub_id = format!("{category_id}-{}", anchor_id(subcategory));
            let _ = write!(
                out,
                r##"<tr><td class="feature sub" colspan="{colspan}"><h3><div class="hash" id="{sub_id}"></div><a href="#{sub_id}">{}</a></h3></td></tr>
"##,
                escape(subcategory)
            );
            for (leaf, entry) in leaves {
                let leaf_id = format!("{sub_id}-{}", anchor_id(leaf));
                let _ = write!(
                    out,
                    r##"<tr><td class="feature subsub"><div class="hash" id="{leaf_id}"></div><a href="#{leaf_id}">{}</a><div class="info">?<div class="fn"><div class="code">{}</div></div></div></td>"##,
                    escape(leaf),
                    escape(&entry.source)
                );
                for snapshot in versions {
                    let _ = write!(
                        out,
                        r#"<td class="result">{}</td>"#,
                        Cell::resolve(snapshot, &entry.name).to_html()
                    );
                }
                out.push_str("</tr>\n");
            }
        }
        out.push_str("</table>\n");
    }

    out.push_str("</article>\n</body>\n</html>\n");
    out
}
