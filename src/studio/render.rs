//! HTML for the studio page: configuration panel on the left, gallery on the right.

use crate::{
    models::{MAX_IMAGE_COUNT, MIN_IMAGE_COUNT},
    studio::state::{GalleryView, StudioState},
};
use std::fmt::Write;

const STYLE: &str = r#"
body{margin:0;min-height:100vh;font-family:system-ui,sans-serif;color:#fff;background:linear-gradient(135deg,#111827,#0f172a,#000)}
header{padding:16px 40px;border-bottom:1px solid #374151}
h1{margin:0;font-size:28px;letter-spacing:.05em;color:#fcd34d}
header p{margin:4px 0 0;color:#9ca3af;font-size:14px}
main{display:flex;gap:32px;padding:40px;flex-wrap:wrap}
aside{flex:0 0 320px}
section{flex:1 1 480px}
.panel{background:rgba(31,41,55,.5);padding:24px;border-radius:16px;border:1px solid #374151}
.panel h2{margin-top:0;color:#fcd34d;border-bottom:1px solid #4b5563;padding-bottom:12px;font-size:20px}
label{display:block;font-size:14px;color:#d1d5db;margin:16px 0 6px}
.drop{border:2px dashed #4b5563;border-radius:8px;padding:20px;text-align:center;color:#6b7280;font-size:13px}
.drop img{max-height:128px;border-radius:6px;display:block;margin:0 auto 8px}
input[type=text]{width:100%;box-sizing:border-box;padding:8px;border-radius:6px;border:1px solid #4b5563;background:rgba(55,65,81,.5);color:#fff}
.count{display:flex;align-items:center;gap:12px}
.count input{flex:1;accent-color:#fbbf24}
.count span{color:#fcd34d;font-weight:600;width:24px;text-align:center}
button{margin-top:20px;width:100%;padding:12px;border:0;border-radius:6px;font-size:16px;font-weight:600;cursor:pointer;background:linear-gradient(90deg,#fcd34d,#facc15);color:#111827}
button.secondary{background:#374151;color:#fcd34d;margin-top:8px;padding:8px;font-size:13px}
button:disabled{opacity:.5;cursor:not-allowed}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:24px}
.skeleton{aspect-ratio:1;background:#1f2937;border-radius:8px;animation:pulse 1.5s infinite}
@keyframes pulse{50%{opacity:.5}}
.card{aspect-ratio:3/4;background:#1f2937;border-radius:8px;overflow:hidden;border:1px solid #374151}
.card img{width:100%;height:100%;object-fit:cover}
.notice{display:flex;flex-direction:column;align-items:center;justify-content:center;padding:32px;border-radius:8px;text-align:center}
.failed{background:rgba(127,29,29,.2);border:1px solid rgba(239,68,68,.5);color:#f87171}
.failed h3{color:#fca5a5}
.awaiting{background:rgba(31,41,55,.3);border:1px dashed #374151;color:#6b7280}
.awaiting h3{color:#9ca3af}
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(state: &StudioState) -> String {
    let refresh = if state.is_loading {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>Mannequin Muse</title>
<style>{style}</style>
</head>
<body>
<header>
<h1>Mannequin Muse</h1>
<p>AI-Powered Fashion Studio</p>
</header>
<main>
<aside>{panel}</aside>
<section>{gallery}</section>
</main>
</body>
</html>"#,
        refresh = refresh,
        style = STYLE,
        panel = render_control_panel(state),
        gallery = render_gallery(state),
    )
}

pub fn render_control_panel(state: &StudioState) -> String {
    let preview = match state.preview_path() {
        Some(path) => format!(r#"<img src="{}" alt="Reference Preview">"#, escape_html(&path)),
        None => String::new(),
    };
    let disabled = if state.is_loading || state.reference.is_none() {
        " disabled"
    } else {
        ""
    };
    let button_label = if state.is_loading {
        "Generating..."
    } else {
        "Generate Photos"
    };

    format!(
        r#"<form class="panel" method="post" action="/generate" enctype="multipart/form-data">
<h2>Configuration</h2>
<label for="image-upload-input">1. Reference Outfit</label>
<div class="drop">
{preview}
<input id="image-upload-input" name="image" type="file" accept="image/*">
<button class="secondary" type="submit" formaction="/reference">Upload</button>
<p>PNG, JPG, GIF up to 10MB</p>
</div>
<label for="brand-name">2. Brand Name</label>
<input type="text" name="brand_name" id="brand-name" placeholder="e.g., Elegance" value="{brand}">
<label for="image-count">3. Number of Images</label>
<div class="count">
<input type="range" name="image_count" id="image-count" min="{min}" max="{max}" step="1" value="{count}" oninput="this.nextElementSibling.textContent=this.value">
<span>{count}</span>
</div>
<button type="submit"{disabled}>{label}</button>
</form>"#,
        preview = preview,
        brand = escape_html(&state.brand_name),
        min = MIN_IMAGE_COUNT,
        max = MAX_IMAGE_COUNT,
        count = state.image_count,
        disabled = disabled,
        label = button_label,
    )
}

pub fn render_gallery(state: &StudioState) -> String {
    let mut html = String::new();

    match state.gallery() {
        GalleryView::Loading { placeholders } => {
            html.push_str("<h2>Generating your editorial photos...</h2><div class=\"grid\">");
            for _ in 0..placeholders {
                html.push_str("<div class=\"skeleton\"></div>");
            }
            html.push_str("</div>");
        }
        GalleryView::Failed { message } => {
            let _ = write!(
                html,
                r#"<div class="notice failed"><h3>Generation Failed</h3><p>{}</p></div>"#,
                escape_html(&message)
            );
        }
        GalleryView::Ready(images) => {
            html.push_str("<h2>Generated Images</h2><div class=\"grid\">");
            for (index, uri) in images.iter().enumerate() {
                let _ = write!(
                    html,
                    r#"<a class="card" href="{uri}" download="mannequin-{n}"><img src="{uri}" alt="Generated mannequin {n}"></a>"#,
                    uri = escape_html(uri),
                    n = index + 1
                );
            }
            html.push_str("</div>");
        }
        GalleryView::Awaiting => {
            html.push_str(
                r#"<div class="notice awaiting"><h3>Your Studio Awaits</h3><p>Configure your settings and click "Generate" to create your photos.</p></div>"#,
            );
        }
    }

    html
}
