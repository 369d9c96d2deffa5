//! Render the CT1 keymap as a text table or an HTML/SVG page.
//!
//! The board is drawn as its electrical matrix: one SVG row per drive column,
//! one cell per sense row.

use ct1_keyboard::{Action, Coord, FnCode, Keymap, MetaKey, COLS, ROWS};

/// Key cell size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;
/// Room on the left for the column labels.
const AXIS: f64 = 36.0;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Base,
    Fn,
}

impl Layer {
    fn title(self) -> &'static str {
        match self {
            Layer::Base => "Base layer",
            Layer::Fn => "Fn layer",
        }
    }
}

/// Label and CSS class of one matrix position.
fn cell(keymap: &Keymap, layer: Layer, coord: Coord) -> (&'static str, &'static str) {
    match layer {
        Layer::Base => {
            let kc = keymap.base_key(coord);
            let class = match keymap.resolve(coord, false, false) {
                Action::Nothing => "key unused",
                Action::Fn => "key fn",
                Action::Modifier(_) => "key modifier",
                _ if keymap.lock_inverts(kc) => "key fnrow",
                _ => "key",
            };
            (kc.display_name(), class)
        }
        Layer::Fn => {
            let code = keymap.fn_code(coord);
            if keymap.is_fn_key(coord) {
                return ("Fn", "key fn");
            }
            match code.action() {
                Action::Nothing => ("", "key unused"),
                Action::Key(kc) => (kc.display_name(), "key"),
                Action::Consumer(usage) => (usage.display_name(), "key consumer"),
                Action::Meta(meta) => (meta_name(meta), "key meta"),
                Action::Language(_) => (language_name(code), "key language"),
                Action::Fn | Action::Modifier(_) => ("", "key unused"),
            }
        }
    }
}

fn meta_name(meta: MetaKey) -> &'static str {
    match meta {
        MetaKey::FnLock => "FnLk",
        MetaKey::Backlight => "Lite",
    }
}

fn language_name(code: FnCode) -> &'static str {
    match code {
        FnCode::MORSE => "Mors",
        FnCode::HEXA => "Hexa",
        FnCode::BIN => "Bin",
        _ => "Lang",
    }
}

fn coords() -> impl Iterator<Item = Coord> {
    (0..COLS).flat_map(|col| (0..ROWS).filter_map(move |row| Coord::new(col, row)))
}

/// Plain-text table of one layer, columns down, rows across.
pub fn render_text(keymap: &Keymap, layer: Layer) -> String {
    let mut out = format!("{}\n     ", layer.title());
    for row in 0..ROWS {
        out.push_str(&format!("{row:<5}"));
    }
    out.push('\n');

    for col in 0..COLS {
        out.push_str(&format!("c{col:<4}"));
        for row in 0..ROWS {
            let label = Coord::new(col, row)
                .map(|coord| cell(keymap, layer, coord).0)
                .unwrap_or("");
            let label = if label.is_empty() { "." } else { label };
            out.push_str(&format!("{label:<5}"));
        }
        out.push('\n');
    }
    out
}

/// Render a single layer as an SVG group.
fn render_layer(keymap: &Keymap, layer: Layer, y_offset: f64) -> String {
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<g transform="translate({MARGIN}, {y_offset})">"#
    ));
    svg.push_str(&format!(
        r#"<text x="0" y="-10" class="layer-title">{}</text>"#,
        layer.title()
    ));

    for col in 0..COLS {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="axis">c{col}</text>"#,
            AXIS / 2.0,
            col as f64 * S + U / 2.0,
        ));
    }

    for coord in coords() {
        let (label, class) = cell(keymap, layer, coord);
        let x = AXIS + coord.row() as f64 * S;
        let y = coord.col() as f64 * S;

        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="{class}"><title>col {}, row {}</title></rect>"#,
            coord.col(),
            coord.row(),
        ));

        if !label.is_empty() {
            let font_class = if label.chars().count() > 3 { " small" } else { "" };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
                x + U / 2.0,
                y + U / 2.0 + 1.0,
                html_escape(label),
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html(keymap: &Keymap) -> String {
    let layers = [Layer::Base, Layer::Fn];
    let layer_height = COLS as f64 * S + 60.0;
    let total_width = AXIS + ROWS as f64 * S + 2.0 * MARGIN;
    let total_height = layers.len() as f64 * layer_height + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>CT1 Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key:hover {{
    fill: #1a1a5e;
    stroke: #e94560;
  }}
  .key.unused {{
    fill: #0d1117;
    stroke: #21262d;
    stroke-dasharray: 3 3;
  }}
  .key.fn {{
    fill: #2d1b4e;
    stroke: #e94560;
    stroke-width: 2;
  }}
  .key.fnrow {{
    stroke: #e9a345;
  }}
  .key.modifier {{
    fill: #1b2e4e;
    stroke: #53a8b6;
  }}
  .key.consumer {{
    fill: #1b3e2e;
    stroke: #5bd68a;
  }}
  .key.meta {{
    fill: #3e1b2e;
    stroke: #e94560;
  }}
  .key.language {{
    fill: #2e2e1b;
    stroke: #a8a853;
    stroke-dasharray: 2 2;
  }}
  .label, .axis {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .axis {{
    fill: #888;
  }}
  .label.small {{
    font-size: 10px;
  }}
  .layer-title {{
    fill: #e94560;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for (i, layer) in layers.into_iter().enumerate() {
        let y_offset = MARGIN + i as f64 * layer_height + 30.0;
        html.push_str(&render_layer(keymap, layer, y_offset));
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
