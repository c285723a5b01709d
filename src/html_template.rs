use anyhow::{Context, Result};
use rust_embed::RustEmbed;

use crate::layers::MapView;

// Page assets, compiled into the binary
#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct Asset;

const VIEW_PLACEHOLDER: &str = "<!-- MAP_VIEW_PLACEHOLDER -->";
const STYLE_LINK: &str = r#"<link rel="stylesheet" href="/style.css" />"#;
const SCRIPT_TAG: &str = r#"<script src="/script.js"></script>"#;

pub fn asset_text(name: &str) -> Result<String> {
    let file = Asset::get(name).with_context(|| format!("Embedded asset {} is missing", name))?;
    String::from_utf8(file.data.into_owned())
        .with_context(|| format!("Embedded asset {} is not UTF-8", name))
}

/// Serializes the view for a `<script>` block. Popups carry HTML, so any
/// `</` is escaped to keep `</script>` from closing the block early.
fn view_script(view: &MapView) -> Result<String> {
    let json = serde_json::to_string(view).context("Failed to serialize map view")?;
    Ok(format!(
        "<script>window.QUAKEMAP_VIEW = {};</script>",
        json.replace("</", "<\\/")
    ))
}

/// Single self-contained HTML file: stylesheet, script and map data inlined.
/// Only Leaflet and its timeline plugin are still pulled from the CDN.
pub fn render_standalone_html(view: &MapView) -> Result<String> {
    let page = asset_text("index.html")?;
    let style = asset_text("style.css")?;
    let script = asset_text("script.js")?;

    let html = page
        .replace(STYLE_LINK, &format!("<style>\n{}</style>", style))
        .replace(VIEW_PLACEHOLDER, &view_script(view)?)
        .replace(SCRIPT_TAG, &format!("<script>\n{}</script>", script));
    Ok(html)
}
