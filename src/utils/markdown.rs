/// Escapes every character with special meaning in Telegram's MarkdownV2 mode,
/// so user-provided text (task titles, names) is shown literally.
/// 
/// # Example
/// ```
/// use trelox_bot::utils::markdown::escape_markdown;
/// 
/// let escaped = escape_markdown("Chapter 3 (review) - 50m!");
/// assert_eq!(escaped, "Chapter 3 \\(review\\) \\- 50m\\!");
/// ```
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
    ];
    
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
