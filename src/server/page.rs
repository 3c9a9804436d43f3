use crate::models::lattice::MAX_STEPS;
use crate::server::routes::LatticeForm;

const STYLE: &str = r#"
body { font-family: Menlo, monospace; margin: 2rem; color: #111; }
form { display: flex; gap: 1rem; align-items: flex-end; flex-wrap: wrap; }
label { display: block; font-size: 0.85rem; }
input { width: 8rem; }
.error { color: #b31942; margin-top: 1rem; }
img { margin-top: 1.5rem; max-width: 100%; border: 1px solid #002868; }
"#;

fn escape(text: &str) -> String {
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

fn field(name: &str, label: &str, value: String, extra: &str) -> String {
    format!(
        concat!(
            r#"<div><label for="{name}">{label}</label>"#,
            r#"<input type="number" id="{name}" name="{name}" value="{value}" {extra} required>"#,
            "</div>"
        ),
        name = name,
        label = label,
        value = value,
        extra = extra,
    )
}

/// Full HTML page: the parameter form, then either the diagram or an error.
pub fn render(form: &LatticeForm, image: Option<&str>, error: Option<&str>) -> String {
    let cents = r#"step="0.01" min="0""#;
    let step_limits = format!(r#"min="1" max="{MAX_STEPS}""#);
    let fields = [
        field("stock_price", "Initial Stock Price (S)", form.stock_price.to_string(), cents),
        field("time", "Time to Expiration (weeks)", form.time.to_string(), r#"step="0.1" min="0""#),
        field("volatility", "Volatility (σ)", form.volatility.to_string(), cents),
        field("steps", "Number of Steps (n)", form.steps.to_string(), &step_limits),
    ]
    .join("\n");

    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let image = image
        .map(|src| {
            format!(r#"<img id="lattice" alt="Binomial price lattice" src="{}">"#, escape(src))
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Binomial Price Lattice</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Binomial Price Lattice</h1>
<form method="post" action="/">
{fields}
<button type="submit">Calculate</button>
</form>
{error}
{image}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_shows_error_without_image() {
        let html = render(&LatticeForm::default(), None, Some("too many <steps>"));
        assert!(html.contains(r#"<p class="error">too many &lt;steps&gt;</p>"#));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"max="12""#));
    }

    #[test]
    fn test_page_echoes_form_values() {
        let form = LatticeForm { stock_price: 42.5, time: 13.0, volatility: 0.35, steps: 7 };
        let html = render(&form, Some("data:image/svg+xml;base64,AAAA"), None);
        assert!(html.contains(r#"value="42.5""#));
        assert!(html.contains(r#"value="0.35""#));
        assert!(html.contains(r#"src="data:image/svg+xml;base64,AAAA""#));
    }
}
