// Streaming Open Graph tag scanner built on lol_html

use super::{OgpError, OgpMetadata};
use lol_html::{element, text, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::rc::Rc;

const IMAGE_PROPERTIES: [&str; 3] = ["og:image", "og:image:url", "og:image:secure_url"];

/// Everything the scanner collected from one document, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScannedTags {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_url: Option<String>,
    pub og_site_name: Option<String>,
    pub images: Vec<String>,
    pub title_element: Option<String>,
    pub meta_description: Option<String>,
}

impl ScannedTags {
    /// Apply the fallback rules. Returns `None` when no title could be found,
    /// whatever else the document carried.
    pub fn into_metadata(self, requested_url: &str) -> Option<OgpMetadata> {
        let title = self.og_title.or(self.title_element)?;

        Some(OgpMetadata {
            title,
            description: self
                .og_description
                .or(self.meta_description)
                .unwrap_or_default(),
            url: self.og_url.unwrap_or_else(|| requested_url.to_string()),
            images: self.images,
            site_name: self.og_site_name,
        })
    }

    fn record_property(&mut self, property: &str, content: String) {
        if IMAGE_PROPERTIES.contains(&property) {
            if !self.images.contains(&content) {
                self.images.push(content);
            }
            return;
        }

        let slot = match property {
            "og:title" => &mut self.og_title,
            "og:description" => &mut self.og_description,
            "og:url" => &mut self.og_url,
            "og:site_name" => &mut self.og_site_name,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(content);
        }
    }
}

#[derive(Default)]
struct ScanState {
    tags: ScannedTags,
    title_elements: u32,
    title_buffer: String,
}

/// Scan an HTML document fed as a sequence of byte chunks.
///
/// Handlers run once per matching element or text chunk in document order;
/// nothing is buffered beyond the fields being collected.
pub fn scan_document<I, C>(chunks: I) -> Result<ScannedTags, OgpError>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let state = Rc::new(RefCell::new(ScanState::default()));

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("meta", {
                    let state = Rc::clone(&state);
                    move |el| {
                        let content = match el.get_attribute("content") {
                            Some(c) => clean_value(&c),
                            None => return Ok(()),
                        };
                        if content.is_empty() {
                            return Ok(());
                        }

                        let mut state = state.borrow_mut();
                        if let Some(property) = el.get_attribute("property") {
                            let property = property.trim().to_ascii_lowercase();
                            if property.starts_with("og:") {
                                state.tags.record_property(&property, content);
                                return Ok(());
                            }
                        }
                        if let Some(name) = el.get_attribute("name") {
                            if name.trim().eq_ignore_ascii_case("description")
                                && state.tags.meta_description.is_none()
                            {
                                state.tags.meta_description = Some(content);
                            }
                        }
                        Ok(())
                    }
                }),
                element!("title", {
                    let state = Rc::clone(&state);
                    move |_el| {
                        state.borrow_mut().title_elements += 1;
                        Ok(())
                    }
                }),
                text!("title", {
                    let state = Rc::clone(&state);
                    move |t| {
                        let mut state = state.borrow_mut();
                        // Only the first <title> counts; SVG titles come later
                        if state.title_elements != 1 || state.tags.title_element.is_some() {
                            return Ok(());
                        }
                        state.title_buffer.push_str(t.as_str());
                        if t.last_in_text_node() {
                            let title = clean_value(&state.title_buffer);
                            state.title_buffer.clear();
                            if !title.is_empty() {
                                state.tags.title_element = Some(title);
                            }
                        }
                        Ok(())
                    }
                }),
            ],
            ..Settings::new()
        },
        |_: &[u8]| {},
    );

    for chunk in chunks {
        rewriter
            .write(chunk.as_ref())
            .map_err(|e| OgpError::Scan(e.to_string()))?;
    }
    rewriter.end().map_err(|e| OgpError::Scan(e.to_string()))?;

    let tags = std::mem::take(&mut state.borrow_mut().tags);
    Ok(tags)
}

/// Trim, collapse internal whitespace and decode the common HTML entities.
fn clean_value(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tail.find(';').filter(|&end| end <= 10) {
            Some(end) => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "hellip" => Some('\u{2026}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201c}'),
        "rdquo" => Some('\u{201d}'),
        "laquo" => Some('\u{ab}'),
        "raquo" => Some('\u{bb}'),
        "middot" => Some('\u{b7}'),
        "bull" => Some('\u{2022}'),
        "copy" => Some('\u{a9}'),
        "reg" => Some('\u{ae}'),
        "trade" => Some('\u{2122}'),
        "deg" => Some('\u{b0}'),
        "times" => Some('\u{d7}'),
        "euro" => Some('\u{20ac}'),
        "pound" => Some('\u{a3}'),
        "yen" => Some('\u{a5}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str) -> ScannedTags {
        scan_document([html.as_bytes()]).unwrap()
    }

    #[test]
    fn test_collects_og_tags() {
        let tags = scan(
            r#"<html><head>
            <meta property="og:title" content="My Article">
            <meta property="og:description" content="About things">
            <meta property="og:url" content="https://example.com/canonical">
            <meta property="og:site_name" content="Example">
            <meta property="og:image" content="https://example.com/a.png">
            </head><body></body></html>"#,
        );
        assert_eq!(tags.og_title.as_deref(), Some("My Article"));
        assert_eq!(tags.og_description.as_deref(), Some("About things"));
        assert_eq!(tags.og_url.as_deref(), Some("https://example.com/canonical"));
        assert_eq!(tags.og_site_name.as_deref(), Some("Example"));
        assert_eq!(tags.images, vec!["https://example.com/a.png"]);
    }

    #[test]
    fn test_images_deduplicated_in_document_order() {
        let tags = scan(
            r#"<head>
            <meta property="og:image" content="https://x.test/2.png">
            <meta property="og:image" content="https://x.test/1.png">
            <meta property="og:image" content="https://x.test/2.png">
            <meta property="og:image:secure_url" content="https://x.test/3.png">
            </head>"#,
        );
        assert_eq!(
            tags.images,
            vec!["https://x.test/2.png", "https://x.test/1.png", "https://x.test/3.png"]
        );
    }

    #[test]
    fn test_title_element_is_fallback_only() {
        let tags = scan(
            r#"<head><title>Page Title</title><meta property="og:title" content="OG Title"></head>"#,
        );
        let meta = tags.into_metadata("https://example.com").unwrap();
        assert_eq!(meta.title, "OG Title");

        let tags = scan("<head><title>  Page\n   Title </title></head>");
        let meta = tags.into_metadata("https://example.com").unwrap();
        assert_eq!(meta.title, "Page Title");
    }

    #[test]
    fn test_meta_description_fallback() {
        let tags = scan(
            r#"<head><title>T</title><meta name="description" content="Plain description"></head>"#,
        );
        let meta = tags.into_metadata("https://example.com").unwrap();
        assert_eq!(meta.description, "Plain description");

        let tags = scan(
            r#"<head><title>T</title>
            <meta name="description" content="Plain">
            <meta property="og:description" content="Open Graph"></head>"#,
        );
        let meta = tags.into_metadata("https://example.com").unwrap();
        assert_eq!(meta.description, "Open Graph");
    }

    #[test]
    fn test_missing_title_fails_even_with_other_fields() {
        let tags = scan(
            r#"<head>
            <meta property="og:description" content="desc">
            <meta property="og:image" content="https://example.com/i.png">
            </head>"#,
        );
        assert!(!tags.images.is_empty());
        assert!(tags.into_metadata("https://example.com").is_none());
    }

    #[test]
    fn test_blank_title_counts_as_missing() {
        let tags = scan("<head><title>   </title></head>");
        assert!(tags.into_metadata("https://example.com").is_none());
    }

    #[test]
    fn test_url_falls_back_to_requested() {
        let tags = scan(r#"<meta property="og:title" content="T">"#);
        let meta = tags.into_metadata("https://example.com/article").unwrap();
        assert_eq!(meta.url, "https://example.com/article");
        assert_eq!(meta.description, "");
        assert_eq!(meta.site_name, None);
    }

    #[test]
    fn test_tags_split_across_chunks() {
        let html = r#"<head><meta property="og:title" content="Split Title"><title>Other</title></head>"#;
        let (a, b) = html.split_at(23);
        let tags = scan_document([a.as_bytes(), b.as_bytes()]).unwrap();
        assert_eq!(tags.og_title.as_deref(), Some("Split Title"));
        assert_eq!(tags.title_element.as_deref(), Some("Other"));
    }

    #[test]
    fn test_only_first_title_element_used() {
        let tags = scan("<head><title>First</title></head><body><svg><title>Icon</title></svg></body>");
        assert_eq!(tags.title_element.as_deref(), Some("First"));
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&quot;hi&quot; &#39;x&#x27;"), "\"hi\" 'x'");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_typographic_entities_in_title() {
        let tags = scan(
            "<html><head><title>Rust &mdash; it&rsquo;s fast&hellip; &copy; 2024</title>\
             <meta name=\"description\" content=\"&ldquo;Quoted&rdquo; &ndash; &laquo;more&raquo;\"></head></html>",
        );
        assert_eq!(
            tags.title_element.as_deref(),
            Some("Rust \u{2014} it\u{2019}s fast\u{2026} \u{a9} 2024")
        );
        assert_eq!(
            tags.meta_description.as_deref(),
            Some("\u{201c}Quoted\u{201d} \u{2013} \u{ab}more\u{bb}")
        );
    }
}
