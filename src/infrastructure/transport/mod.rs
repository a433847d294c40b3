//! Outbound message transports
//!
//! Every transport implements `MessageTransportPort`. Long content is split with
//! [`paginate`] so no single delivery exceeds the platform's size limit.

mod channel_transport;
mod log_transport;
mod webhook_transport;

pub use channel_transport::ChannelTransport;
pub use log_transport::LogTransport;
pub use webhook_transport::WebhookTransport;

/// Split ordered lines into newline-joined chunks of at most `limit` characters.
///
/// Lines are never broken unless a single line is longer than `limit` on its own.
pub fn paginate<S: AsRef<str>>(lines: &[S], limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line = line.as_ref();
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            chunks.extend(chars.chunks(limit).map(|piece| piece.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };
        if needed > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_one_chunk() {
        assert_eq!(paginate(&["ab", "cd"], 10), vec!["ab\ncd"]);
        assert!(paginate::<&str>(&[], 10).is_empty());
    }

    #[test]
    fn test_lines_are_kept_whole() {
        assert_eq!(
            paginate(&["aaaa", "bbbb", "cc"], 9),
            vec!["aaaa\nbbbb".to_string(), "cc".to_string()]
        );
    }

    #[test]
    fn test_oversized_line_is_cut() {
        assert_eq!(
            paginate(&["x", "abcdefg", "y"], 3),
            vec!["x", "abc", "def", "g", "y"]
        );
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        let glyphs = ["🟥🟥", "🟦🟦"];
        assert_eq!(paginate(&glyphs, 5), vec!["🟥🟥\n🟦🟦"]);
    }
}
