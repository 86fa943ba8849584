//! Generated subject pages and the naming rules that tie them to PDFs.

pub const PAGE_EXTENSION: &str = ".html";
pub const PDF_EXTENSION: &str = ".pdf";
/// Served for unmatched paths.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Derive a page filename from a subject title.
///
/// Trim, lowercase, drop everything outside `[a-z0-9 -]`, turn each run of
/// spaces into one hyphen, then append `.html`. Returns `None` when nothing
/// survives.
pub fn page_filename_from_title(title: &str) -> Option<String> {
    let kept: String = title
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | ' '))
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }

    if slug.is_empty() {
        return None;
    }
    slug.push_str(PAGE_EXTENSION);
    Some(slug)
}

/// `ethics.html` → `ethics.pdf`.
pub fn derived_pdf_name(page_filename: &str) -> String {
    let stem = page_filename
        .strip_suffix(PAGE_EXTENSION)
        .unwrap_or(page_filename);
    format!("{stem}{PDF_EXTENSION}")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Static page for one subject: title, a viewer on `pdfs/<pdf_name>`, and the
/// client scripts that add the admin affordances.
pub fn render_subject_page(title: &str, pdf_name: &str) -> String {
    let title = escape_html(title);
    let pdf_name = escape_html(pdf_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background-color: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .controls {{ margin-bottom: 20px; }}
        .download-btn {{ display: inline-block; background-color: #4CAF50; color: white; padding: 10px 20px; border-radius: 4px; cursor: pointer; font-size: 16px; border: none; }}
        .remove-pdf-btn {{ margin-left: 8px; background: #e53935; color: #fff; border: none; padding: 6px 8px; border-radius: 4px; cursor: pointer; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>{title} Question Bank</h2>
        <div class="controls">
            <button id="add-pdf-btn" class="download-btn">Add PDF</button>
            <div id="pdf-links" style="margin-top:10px"></div>
        </div>

        <iframe id="pdf-viewer" src="pdfs/{pdf_name}" type="application/pdf" style="width:100%;height:600px;border:1px solid #ddd;border-radius:4px"></iframe>

        <br><br>
        <a href="index.html" class="back-link">&larr; Back to All Subjects</a>
    </div>
    <script src="add-pdf.js"></script>
    <script src="manage-subjects.js"></script>
</body>
</html>
"#
    )
}
