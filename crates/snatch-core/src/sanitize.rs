//! Output file-name sanitization.

/// Characters rejected by common filesystems (Windows is the strictest).
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitizes a user-supplied output name.
///
/// - Strips `< > : " / \ | ? *` and control characters (removed, not replaced)
/// - Trims leading/trailing whitespace
/// - Limits length to 255 bytes (Linux NAME_MAX), minus room for the `_tmp` / `.mp4` suffixes
pub fn sanitize_file_name(name: &str) -> String {
    const NAME_MAX: usize = 255 - 4;

    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c) && !c.is_control())
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
