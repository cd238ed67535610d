//! Fitting a message into a service's title and body limits.

use super::base::ServiceBase;
use super::common::{NotifyFormat, OverflowMode};
use super::details::ServiceDetails;
use super::provider::NotificationMessage;

/// Titles longer than this get a ` [i/n]` counter when a body is split
const DISPLAY_COUNT_THRESHOLD: usize = 130;

/// Widest counter we are willing to append to a title
const MAX_DISPLAY_COUNT_WIDTH: usize = 12;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn char_chunks(text: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

fn tidy_chunk(chunk: &str) -> String {
    chunk
        .trim_start_matches(['\r', '\n', '\x0b', '\x0c'])
        .trim_end()
        .to_string()
}

/// Splits or trims `message` according to the service limits and the
/// handler's overflow mode. Always yields at least one message.
pub fn prepare(details: &ServiceDetails, base: &ServiceBase, message: &NotificationMessage) -> Vec<NotificationMessage> {
    let build = |title: String, body: String| NotificationMessage {
        title: (!title.is_empty()).then_some(title),
        body,
        notify_type: message.notify_type,
    };

    let mut title = message.title_or_empty().trim().to_string();
    let mut body = message.body.trim_end().to_string();

    if details.title_maxlen == 0 && !title.is_empty() {
        body = match base.notify_format {
            NotifyFormat::Html => format!("<b>{title}</b><br />\r\n{body}"),
            NotifyFormat::Markdown => {
                let heading = title.trim_start_matches(['\r', '\n', ' ', '\t', '\x0b', '\x0c', '#', '-']);
                if heading.is_empty() {
                    body
                } else {
                    format!("# {heading}\r\n{body}")
                }
            }
            NotifyFormat::Text => format!("{title}\r\n{body}"),
        };
        title.clear();
    }

    if details.body_max_line_count > 0 {
        body = body
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .take(details.body_max_line_count)
            .collect::<Vec<_>>()
            .join("\r\n");
    }

    if base.overflow_mode == OverflowMode::Upstream {
        return vec![build(title, body)];
    }

    let title_maxlen = details.title_maxlen;
    if title_maxlen > 0 && title.chars().count() > title_maxlen {
        title = truncate_chars(&title, title_maxlen).trim_end().to_string();
    }

    let body_maxlen = details.body_maxlen;
    let body_len = body.chars().count();
    if body_maxlen == 0 || body_len <= body_maxlen {
        return vec![build(title, body)];
    }

    if base.overflow_mode == OverflowMode::Truncate {
        let cut = tidy_chunk(truncate_chars(&body, body_maxlen));
        return vec![build(title, cut)];
    }

    let count = body_len.div_ceil(body_maxlen);
    let digits = count.to_string().len();
    let counter_width = 4 + digits * 2;
    let show_counter = !title.is_empty()
        && title_maxlen > DISPLAY_COUNT_THRESHOLD
        && counter_width <= MAX_DISPLAY_COUNT_WIDTH;

    if show_counter && title.chars().count() > title_maxlen - counter_width {
        title = truncate_chars(&title, title_maxlen - counter_width).to_string();
    }

    char_chunks(&body, body_maxlen)
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| {
            let title = if show_counter {
                format!("{title} [{:0digits$}/{count:0digits$}]", idx + 1)
            } else {
                title.clone()
            };
            build(title, tidy_chunk(chunk))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::base::BaseArgs;
    use crate::services::notifications::common::NotifyType;

    fn base(format: NotifyFormat, overflow: OverflowMode) -> ServiceBase {
        ServiceBase::new(BaseArgs {
            format: Some(format.to_string()),
            overflow: Some(overflow.to_string()),
            ..BaseArgs::default()
        })
        .unwrap()
    }

    fn details(title_maxlen: usize, body_maxlen: usize) -> ServiceDetails {
        ServiceDetails {
            protocols: &["demo"],
            title_maxlen,
            body_maxlen,
            ..ServiceDetails::new("Demo")
        }
    }

    #[test]
    fn test_upstream_only_tidies() {
        let message = NotificationMessage::new("body  \n").with_title("  title ");
        let out = prepare(&details(250, 5), &base(NotifyFormat::Text, OverflowMode::Upstream), &message);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("title"));
        assert_eq!(out[0].body, "body");
    }

    #[test]
    fn test_title_folded_into_body() {
        let message = NotificationMessage::new("body").with_title("title");

        let text = prepare(&details(0, 100), &base(NotifyFormat::Text, OverflowMode::Upstream), &message);
        assert_eq!(text[0].body, "title\r\nbody");
        assert!(text[0].title.is_none());

        let html = prepare(&details(0, 100), &base(NotifyFormat::Html, OverflowMode::Upstream), &message);
        assert_eq!(html[0].body, "<b>title</b><br />\r\nbody");

        let md = prepare(&details(0, 100), &base(NotifyFormat::Markdown, OverflowMode::Upstream), &message);
        assert_eq!(md[0].body, "# title\r\nbody");
    }

    #[test]
    fn test_line_count_limit() {
        let details = ServiceDetails {
            body_max_line_count: 2,
            ..details(250, 100)
        };
        let message = NotificationMessage::new("one\r\ntwo\nthree");
        let out = prepare(&details, &base(NotifyFormat::Text, OverflowMode::Upstream), &message);
        assert_eq!(out[0].body, "one\r\ntwo");
    }

    #[test]
    fn test_truncate() {
        let message = NotificationMessage::new("abcdefghij").with_title("a long title");
        let out = prepare(&details(6, 4), &base(NotifyFormat::Text, OverflowMode::Truncate), &message);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("a long"));
        assert_eq!(out[0].body, "abcd");
    }

    #[test]
    fn test_split_without_counter() {
        let message = NotificationMessage::new("abcdefghij")
            .with_title("t")
            .with_type(NotifyType::Success);
        let out = prepare(&details(100, 4), &base(NotifyFormat::Text, OverflowMode::Split), &message);
        let bodies: Vec<_> = out.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["abcd", "efgh", "ij"]);
        assert!(out.iter().all(|m| m.title.as_deref() == Some("t")));
        assert!(out.iter().all(|m| m.notify_type == NotifyType::Success));
    }

    #[test]
    fn test_split_with_counter() {
        let message = NotificationMessage::new("x".repeat(25)).with_title("Status");
        let out = prepare(&details(250, 10), &base(NotifyFormat::Text, OverflowMode::Split), &message);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].title.as_deref(), Some("Status [1/3]"));
        assert_eq!(out[2].title.as_deref(), Some("Status [3/3]"));
        assert_eq!(out[2].body, "xxxxx");
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let message = NotificationMessage::new("ééééé");
        let out = prepare(&details(250, 2), &base(NotifyFormat::Text, OverflowMode::Split), &message);
        let bodies: Vec<_> = out.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_within_limits_is_untouched() {
        let message = NotificationMessage::new("short");
        let out = prepare(&details(250, 100), &base(NotifyFormat::Text, OverflowMode::Split), &message);
        assert_eq!(out, vec![NotificationMessage::new("short")]);
    }
}
