//! Atom 1.0 rendering of a window snapshot.

use crate::api::FileStat;
use std::fmt::Write as _;

const GATEWAY: &str = "https://ipfs.io/ipfs";

/// Render a window snapshot as an Atom 1.0 document, one entry per publish
/// in insertion order.
pub fn render(items: &[FileStat]) -> String {
    let mut out = String::with_capacity(256 + items.len() * 256);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    out.push_str("  <title>IPFS Publish Feed</title>\n");
    for item in items {
        let hash = escape(&item.hash);
        let _ = write!(
            out,
            "  <entry>\n    <title>{hash}</title>\n    <summary>Type: {} Size: {}</summary>\n    <link href=\"{GATEWAY}/{hash}\" />\n  </entry>\n",
            escape(&item.kind),
            item.cumulative_size,
        );
    }
    out.push_str("</feed>\n");
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
