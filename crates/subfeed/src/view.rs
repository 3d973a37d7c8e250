//! Display helpers: item ordering and HTML rendering.
//!
//! Everything here is pure. Descriptions come from the remote and are not
//! trusted by default; [`Escaping`] makes the caller decide.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::sync::{Channel, Item};

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("valid URL regex"));

/// Whether remote text is HTML-escaped before markup is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    /// Escape `& < > " '` so descriptions cannot inject markup.
    #[default]
    Enabled,
    /// Pass raw HTML in descriptions through unchanged.
    Disabled,
}

impl Escaping {
    pub fn from_flag(escape: bool) -> Self {
        if escape { Self::Enabled } else { Self::Disabled }
    }
}

/// Items sorted newest first. Equal timestamps keep their input order; the
/// input is not modified.
pub fn display_order(items: &[Item]) -> Vec<Item> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    ordered
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
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

/// Split trailing sentence punctuation off a matched URL. A closing paren is
/// kept when the URL opened one.
fn trim_url(url: &str) -> &str {
    let mut end = url.len();
    while let Some(c) = url[..end].chars().last() {
        let strip = match c {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => url[..end].matches('(').count() < url[..end].matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= c.len_utf8();
    }
    &url[..end]
}

fn push_text(out: &mut String, text: &str, escaping: Escaping) {
    let text = match escaping {
        Escaping::Enabled => escape_html(text),
        Escaping::Disabled => text.to_string(),
    };
    out.push_str(&text.replace('\n', "<br />"));
}

/// Render a description for embedding in HTML: newlines become `<br />` and
/// bare `http(s)://` URLs become anchors.
///
/// With [`Escaping::Disabled`], URLs that sit inside an attribute value or
/// directly after a tag are left alone so existing anchors are not nested.
pub fn render_description(text: &str, escaping: Escaping) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for found in URL_REGEX.find_iter(text) {
        let start = found.start();
        if escaping == Escaping::Disabled
            && text[..start]
                .chars()
                .last()
                .is_some_and(|c| matches!(c, '"' | '\'' | '=' | '>'))
        {
            continue;
        }

        let url = trim_url(found.as_str());
        if url.ends_with("://") {
            continue;
        }

        push_text(&mut out, &text[cursor..start], escaping);
        let shown = match escaping {
            Escaping::Enabled => escape_html(url),
            Escaping::Disabled => url.to_string(),
        };
        let _ = write!(out, "<a href=\"{shown}\">{shown}</a>");
        cursor = start + url.len();
    }

    push_text(&mut out, &text[cursor..], escaping);
    out
}

/// Public page for an item.
pub fn item_url(item_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={item_id}")
}

/// Public page for a channel.
pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{channel_id}")
}

/// Render a standalone HTML page listing `items` (already in display order)
/// for `channel`. Watched items get the `watched` class.
pub fn render_channel_page(
    channel: &Channel,
    items: &[Item],
    is_watched: impl Fn(&str) -> bool,
    escaping: Escaping,
) -> String {
    let name = escape_html(&channel.name);
    let channel_link = escape_html(&channel_url(&channel.id));
    let channel_thumb = escape_html(&channel.thumbnail);

    let mut page = String::new();
    let _ = writeln!(page, "<!DOCTYPE html>");
    let _ = writeln!(
        page,
        "<html><head><meta charset=\"utf-8\"><title>{name}</title></head><body>"
    );
    let _ = writeln!(page, "<ul id=\"videos\">");

    for item in items {
        let class = if is_watched(&item.id) {
            "video watched"
        } else {
            "video"
        };
        let link = escape_html(&item_url(&item.id));
        let _ = writeln!(
            page,
            "<li class=\"{class}\">\
             <div class=\"vidUploader\"><a href=\"{channel_link}\" target=\"_blank\">\
             <img src=\"{channel_thumb}\" width=\"20\" class=\"vidUploaderImg\">\
             <span class=\"vidUploaderName\">{name}</span></a></div>\
             <div class=\"vidImg\"><a href=\"{link}\" target=\"_blank\">\
             <img src=\"{thumb}\" width=\"240\"></a></div>\
             <div class=\"vidText\">\
             <div class=\"vidTitle\"><a href=\"{link}\" target=\"_blank\">{title}</a></div>\
             <div class=\"vidTime\">{time}</div>\
             <div class=\"vidDesc\">{desc}</div></div></li>",
            thumb = escape_html(&item.thumbnail),
            title = escape_html(&item.title),
            time = item.uploaded_at.format("%Y-%m-%d %H:%M UTC"),
            desc = render_description(&item.description, escaping),
        );
    }

    let _ = writeln!(page, "</ul>");
    let _ = writeln!(page, "</body></html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ContainerRef;
    use chrono::{Duration, TimeZone, Utc};

    fn item(id: &str, minute: i64) -> Item {
        Item {
            id: id.to_string(),
            title: format!("Title {id}"),
            description: String::new(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            thumbnail: format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg"),
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_display_order_is_descending_and_leaves_input_alone() {
        let input = vec![item("a", 1), item("c", 3), item("b", 2)];
        let ordered = display_order(&input);
        assert_eq!(ids(&ordered), vec!["c", "b", "a"]);
        assert_eq!(ids(&input), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_display_order_is_stable_and_idempotent() {
        let input = vec![item("x", 5), item("y", 5), item("z", 9)];
        let once = display_order(&input);
        assert_eq!(ids(&once), vec!["z", "x", "y"]);
        assert_eq!(display_order(&once), once);
        assert!(
            once.windows(2)
                .all(|w| w[0].uploaded_at >= w[1].uploaded_at)
        );
    }

    #[test]
    fn test_render_description_newlines_and_links() {
        let out = render_description(
            "Watch this\nhttps://example.com/a?b=1.\nBye",
            Escaping::Disabled,
        );
        assert_eq!(
            out,
            "Watch this<br /><a href=\"https://example.com/a?b=1\">https://example.com/a?b=1</a>.<br />Bye"
        );
    }

    #[test]
    fn test_render_description_disabled_passes_html_through() {
        let out = render_description("<b>bold</b> & more", Escaping::Disabled);
        assert_eq!(out, "<b>bold</b> & more");
    }

    #[test]
    fn test_render_description_disabled_leaves_existing_anchors() {
        let text = "<a href=\"https://example.com\">https://example.com</a>";
        assert_eq!(render_description(text, Escaping::Disabled), text);
    }

    #[test]
    fn test_render_description_enabled_escapes_markup() {
        let out = render_description(
            "<script>alert('x')</script>\nsee https://example.com/?q=a&b=c",
            Escaping::Enabled,
        );
        assert_eq!(
            out,
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;<br />see \
             <a href=\"https://example.com/?q=a&amp;b=c\">https://example.com/?q=a&amp;b=c</a>"
        );
    }

    #[test]
    fn test_render_description_enabled_does_not_swallow_quotes() {
        let out = render_description("\"https://example.com\"", Escaping::Enabled);
        assert_eq!(
            out,
            "&quot;<a href=\"https://example.com\">https://example.com</a>&quot;"
        );
    }

    #[test]
    fn test_trim_url_keeps_balanced_parens() {
        assert_eq!(
            trim_url("https://en.wikipedia.org/wiki/Rust_(language)"),
            "https://en.wikipedia.org/wiki/Rust_(language)"
        );
        assert_eq!(trim_url("https://example.com)."), "https://example.com");
        assert_eq!(trim_url("https://example.com/!?"), "https://example.com/");
    }

    #[test]
    fn test_urls() {
        assert_eq!(item_url("abc"), "https://www.youtube.com/watch?v=abc");
        assert_eq!(channel_url("UC1"), "https://www.youtube.com/channel/UC1");
    }

    #[test]
    fn test_render_channel_page_marks_watched_and_escapes_names() {
        let channel = Channel::new("UC1", "Tom & Jerry", "https://yt3.test/UC1.jpg", ContainerRef::new("UU1"));
        let mut first = item("v1", 1);
        first.description = "<i>hi</i>".to_string();
        let items = display_order(&[first, item("v2", 2)]);

        let page = render_channel_page(&channel, &items, |id| id == "v1", Escaping::Enabled);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Tom &amp; Jerry</title>"));
        assert!(page.contains("<li class=\"video watched\">"));
        assert_eq!(page.matches("<li class=\"video\">").count(), 1);
        assert!(page.contains("&lt;i&gt;hi&lt;/i&gt;"));
        assert!(page.contains("https://www.youtube.com/watch?v=v2"));
        let v2 = page.find("watch?v=v2").expect("v2 listed");
        let v1 = page.find("watch?v=v1").expect("v1 listed");
        assert!(v2 < v1, "newest first");
        assert!(page.contains("2024-01-01 00:02 UTC"));
    }
}
