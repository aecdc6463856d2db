use once_cell::sync::Lazy;
use regex::{ Captures, Regex };

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"));
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern")
});

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

const LINK_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

fn has_safe_scheme(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    LINK_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

/// Renders bold spans, links and line breaks of untrusted text into HTML.
///
/// Escaping runs first so that markup present in the source is neutralized
/// and the tags injected by the later passes are left intact. The passes
/// must keep this order.
pub fn render_markdown(text: &str) -> String {
    let escaped = escape_html(text);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let linked = LINK.replace_all(&bolded, |caps: &Captures| {
        if !has_safe_scheme(&caps[2]) {
            return caps[0].to_string();
        }
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            caps[2].replace('"', "&quot;"),
            &caps[1]
        )
    });
    linked.replace('\n', "<br/>")
}
