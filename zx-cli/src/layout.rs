//! Render the Spectrum layouts as text or as an HTML/SVG picture.
//!
//! The picture places each matrix cell where its key sits on the real
//! Spectrum: four rows of ten, the left five of each row on one half-row of
//! the matrix and the right five on another, wired in reverse.

use zx_keymap::{is_mode_dependent, lookup, Mode, COLS, ROWS};

/// Physical key position and size for SVG rendering.
struct Key {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    row: usize,
    col: usize,
}

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 6.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

/// Matrix rows feeding each physical row: (left half, right half).
/// The right half's columns run from the outside in.
const PHYSICAL_ROWS: [(usize, usize); 4] = [(0, 3), (1, 4), (2, 6), (5, 7)];

/// Horizontal offset of each physical row, in units of S.
const STAGGER: [f64; 4] = [0.0, 0.5, 0.75, 0.0];

/// Build all physical key positions.
fn build_keys() -> Vec<Key> {
    let mut keys = Vec::with_capacity(ROWS * COLS);

    for (prow, &(left, right)) in PHYSICAL_ROWS.iter().enumerate() {
        let y = prow as f64 * S;
        let x0 = STAGGER[prow] * S;

        for col in 0..COLS {
            keys.push(Key { x: x0 + col as f64 * S, y, w: U, h: U, row: left, col });
        }
        for (i, col) in (0..COLS).rev().enumerate() {
            keys.push(Key {
                x: x0 + (COLS + i) as f64 * S,
                y,
                w: U,
                h: U,
                row: right,
                col,
            });
        }
    }

    keys
}

/// Compute the bounding box of all keys: (max_x + w, max_y + h).
fn bbox(keys: &[Key]) -> (f64, f64) {
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for k in keys {
        max_x = max_x.max(k.x + k.w);
        max_y = max_y.max(k.y + k.h);
    }
    (max_x, max_y)
}

/// Render a single mode as an SVG group.
fn render_layer(keys: &[Key], mode: Mode, y_offset: f64) -> String {
    let mut svg = String::new();

    svg.push_str(&format!(r#"<g transform="translate({MARGIN}, {y_offset})">"#));
    svg.push_str(&format!(
        r#"<text x="0" y="-10" class="layer-title">{} keys{}</text>"#,
        mode.name(),
        if mode == Mode::default() { " (default)" } else { "" }
    ));

    for key in keys {
        let kc = lookup(mode, key.row, key.col);
        let key_class = if is_mode_dependent(key.row, key.col) {
            "key changed"
        } else if kc.is_modifier() {
            "key modifier"
        } else {
            "key"
        };

        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{R}" class="{key_class}"><title>row {} col {}</title></rect>"#,
            key.x, key.y, key.w, key.h, key.row, key.col,
        ));

        let label = kc.name();
        let font_class = if label.len() > 3 { " small" } else { "" };
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
            key.x + key.w / 2.0,
            key.y + key.h / 2.0 + 1.0,
            label,
        ));
    }

    svg.push_str("</g>");
    svg
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let keys = build_keys();
    let (content_w, content_h) = bbox(&keys);
    let layer_height = content_h + 60.0;
    let total_width = content_w + 2.0 * MARGIN;
    let total_height = Mode::BOTH.len() as f64 * layer_height + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ZX Spectrum Keyboard Layouts</title>
<style>
  body {{
    background: #111;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #222;
    stroke: #555;
    stroke-width: 1.5;
  }}
  .key.changed {{
    fill: #3a1f1f;
    stroke: #d7263d;
    stroke-width: 2;
  }}
  .key.modifier {{
    fill: #1f2a3a;
    stroke: #3f88c5;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .label.small {{
    font-size: 9px;
  }}
  .layer-title {{
    fill: #f4d35e;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for (i, mode) in Mode::BOTH.into_iter().enumerate() {
        let y_offset = MARGIN + i as f64 * layer_height + 30.0;
        html.push_str(&render_layer(&keys, mode, y_offset));
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}

/// Plain-text grid of one mode in matrix order, mode-dependent cells
/// marked with `*`.
pub fn render_text(mode: Mode) -> String {
    let mut out = format!("{} keys\n     ", mode.name());
    for col in 0..COLS {
        out.push_str(&format!("{:<11}", format!("col {}", col)));
    }
    out.push('\n');

    for row in 0..ROWS {
        out.push_str(&format!("r{}   ", row));
        for col in 0..COLS {
            let mark = if is_mode_dependent(row, col) { "*" } else { "" };
            let cell = format!("{}{}", lookup(mode, row, col).name(), mark);
            out.push_str(&format!("{:<11}", cell));
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cell_drawn_once() {
        let keys = build_keys();
        assert_eq!(keys.len(), ROWS * COLS);
        for row in 0..ROWS {
            for col in 0..COLS {
                let count = keys.iter().filter(|k| k.row == row && k.col == col).count();
                assert_eq!(count, 1, "cell ({row},{col})");
            }
        }
    }

    #[test]
    fn test_top_row_reads_like_a_spectrum() {
        let keys = build_keys();
        let top: Vec<&str> = keys
            .iter()
            .filter(|k| k.y == 0.0)
            .map(|k| lookup(Mode::Spectrum, k.row, k.col).name())
            .collect();
        assert_eq!(top, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]);
    }

    #[test]
    fn test_html_has_both_modes() {
        let html = generate_html();
        assert!(html.contains("Spectrum keys (default)"));
        assert!(html.contains("Function keys"));
        assert!(html.contains(">F1<"));
        assert_eq!(html.matches("key changed").count(), 2 * 9);
    }

    #[test]
    fn test_text_marks_changed_cells() {
        let text = render_text(Mode::Function);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + ROWS);
        assert!(lines[2].starts_with("r0   F1*"));
        assert!(lines[5].contains("9 ") && !lines[5].contains("9*"));
        assert!(!lines[3].contains('*'));
    }
}
