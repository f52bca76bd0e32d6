use crate::models::SizingResult;

use super::fields::{template_fields, LOGO_BASE64};

const REPORT_TEMPLATE: &str = include_str!("../../templates/report.html");

/// Fill the bundled HTML template with `result`. Text values are escaped; the
/// logo placeholder turns into an inline `<img>` or disappears.
pub fn render_html(result: &SizingResult) -> String {
    render_template(REPORT_TEMPLATE, &template_fields(result))
}

/// Substitute every `{{KEY}}` in `template` from `fields` in a single pass
/// over the template, so text coming from a value is never expanded again.
/// Unknown keys are left untouched.
pub fn render_template(template: &str, fields: &[(&'static str, String)]) -> String {
    let mut html = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        html.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            html.push_str(&rest[start..]);
            return html;
        };
        let key = &tail[..end];
        match fields.iter().find(|(name, _)| *name == key) {
            Some((_, value)) if key == LOGO_BASE64 => html.push_str(&logo_markup(value)),
            Some((_, value)) => html.push_str(&escape_html(value)),
            None => html.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &tail[end + 2..];
    }
    html.push_str(rest);
    html
}

fn logo_markup(encoded: &str) -> String {
    if encoded.is_empty() {
        return String::new();
    }
    format!(
        r#"<img src="data:{};base64,{}" alt="logo">"#,
        logo_mime(encoded),
        escape_html(encoded)
    )
}

/// Sniff the image type from the first base64 characters: JPEG data always
/// starts with `/9j/`, everything else accepted at upload is PNG.
fn logo_mime(encoded: &str) -> &'static str {
    if encoded.starts_with("/9j/") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
