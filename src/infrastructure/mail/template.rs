use crate::utils::html::escape_text;

/// Mail clients render inline images inconsistently unless they are block level.
const BLOCK_IMAGE_RULE: &str = "img { display: block; max-width: 100%; height: auto; margin: 0 auto; }";

/// Link appended to the footer of every newsletter copy, unique per recipient.
pub fn unsubscribe_link(base_url: &str, email: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}email={}", base_url, separator, urlencoding::encode(email))
}

/// Moves every `<style>` rule onto the elements it matches and drops the
/// `<style>` blocks. The document is sent as-is if it cannot be inlined.
pub fn inline_css(document: &str) -> String {
    match css_inline::inline(document) {
        Ok(inlined) => inlined,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to inline newsletter CSS");
            document.to_string()
        }
    }
}

/// Wraps caller supplied HTML in the branded newsletter layout and inlines
/// its CSS, including any `<style>` rules carried by the content.
pub fn render_newsletter(subject: &str, content: &str, unsubscribe: Option<&str>) -> String {
    let title = escape_text(subject);

    let footer_link = match unsubscribe {
        Some(link) => format!(
            r#"<p style="margin:8px 0 0 0;"><a href="{}" style="color:#6b7280;text-decoration:underline;">Unsubscribe</a> from these updates.</p>"#,
            escape_text(link)
        ),
        None => String::new(),
    };

    let document = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{BLOCK_IMAGE_RULE}</style>
</head>
<body style="margin:0;padding:0;background-color:#f3f4f6;font-family:Arial,Helvetica,sans-serif;color:#1f2937;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f3f4f6;">
<tr><td align="center" style="padding:24px 12px;">
<table role="presentation" width="600" cellpadding="0" cellspacing="0" style="max-width:600px;width:100%;background-color:#ffffff;border-radius:8px;overflow:hidden;">
<tr><td style="background-color:#1e3a8a;padding:24px;text-align:center;">
<h1 style="margin:0;font-size:22px;line-height:28px;color:#ffffff;">{title}</h1>
</td></tr>
<tr><td style="padding:24px;font-size:16px;line-height:24px;">
{content}
</td></tr>
<tr><td style="background-color:#f9fafb;padding:16px 24px;font-size:12px;line-height:18px;color:#6b7280;text-align:center;">
<p style="margin:0;">You are receiving this email because you subscribed to community updates.</p>
{footer_link}
</td></tr>
</table>
</td></tr>
</table>
</body>
</html>"#
    );

    inline_css(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inlined declarations are compared without whitespace.
    fn compact(html: &str) -> String {
        html.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn img_tag(html: &str) -> &str {
        let start = html.find("<img").unwrap();
        let end = start + html[start..].find('>').unwrap();
        &html[start..=end]
    }

    #[test]
    fn images_become_block_level() {
        let html = render_newsletter("Road works", r#"<p>Hi</p><img src="a.png">"#, None);
        let img = compact(img_tag(&html));
        assert!(img.contains("display:block"));
        assert!(img.contains("max-width:100%"));
    }

    #[test]
    fn existing_image_style_is_kept() {
        let html = render_newsletter("Road works", r#"<img src="a.png" style="border:0;">"#, None);
        let img = compact(img_tag(&html));
        assert!(img.contains("border:0"));
        assert!(img.contains("display:block"));
    }

    #[test]
    fn content_style_rules_land_on_elements() {
        let content = r#"<style>.notice { color: #b91c1c; }</style><p class="notice">Main street closed</p>"#;
        let html = render_newsletter("Road works", content, None);

        assert!(!html.contains("<style"));
        let start = html.find("<p class=\"notice\"").unwrap();
        let paragraph = compact(&html[start..start + html[start..].find('>').unwrap()]);
        assert!(paragraph.contains("color:#b91c1c"));
    }

    #[test]
    fn unsubscribe_link_encodes_address() {
        assert_eq!(
            unsubscribe_link("https://city.example/unsubscribe", "a+b@city.example"),
            "https://city.example/unsubscribe?email=a%2Bb%40city.example"
        );
        assert_eq!(
            unsubscribe_link("https://city.example/u?src=mail", "x@y.z"),
            "https://city.example/u?src=mail&email=x%40y.z"
        );
    }

    #[test]
    fn layout_contains_content_and_optional_footer_link() {
        let with_link = render_newsletter("Road works", "<p>Main street closed</p>", Some("https://u.example/?email=x%40y.z"));
        assert!(with_link.contains("Main street closed"));
        assert!(with_link.contains("Unsubscribe"));
        assert!(with_link.contains("x%40y.z"));

        let without = render_newsletter("Road works", "<p>Main street closed</p>", None);
        assert!(!without.contains("Unsubscribe"));
    }
}
