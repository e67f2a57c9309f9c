//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries. Vietnamese text is mostly multi-byte, so
/// slicing by bytes directly would panic.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_vietnamese() {
        // "Định" = Đ(2) ị(3) n(1) h(1) = 7 bytes
        assert_eq!(truncate("Định nghĩa", 30), "Định nghĩa");
        // max_len=6 -> target=3 -> 'ị' spans bytes 2..5, back up to 2 -> "Đ..."
        assert_eq!(truncate("Định nghĩa", 6), "Đ...");
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate("", 5), "");
    }
}
