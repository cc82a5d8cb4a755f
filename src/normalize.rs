use std::borrow::Cow;

/// Convert CRLF and lone CR to LF so the line-based passes see one line per
/// `\n`.
pub fn line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
