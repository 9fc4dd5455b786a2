//! Segment address resolution: URL template + index -> request URL.

/// Token in the URL template that stands for the segment index.
pub const PLACEHOLDER: &str = "(*)";

/// Returns true when `template` carries at least one placeholder.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(PLACEHOLDER)
}

/// Renders `index` as decimal, left-padded with zeros to `padding` digits.
/// A width below the digit count never truncates.
pub fn pad_index(index: u64, padding: usize) -> String {
    format!("{:0width$}", index, width = padding)
}

/// Builds the request URL for segment `index` by replacing every placeholder
/// in `template` with the zero-padded index.
pub fn resolve(template: &str, index: u64, padding: usize) -> String {
    template.replace(PLACEHOLDER, &pad_index(index, padding))
}
