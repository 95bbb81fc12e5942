//! Documentation block file.

/// Line separating two documentation blocks.
pub const BLOCK_SEPARATOR: &str = "--------";

/// Split the documentation file into blocks.
///
/// Blocks are addressed 1-based by the `docN` markers of the header, so block
/// `N` is `blocks[N - 1]`. Each block is trimmed.
pub fn split_blocks(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim_end() == BLOCK_SEPARATOR {
            blocks.push(current.trim().to_string());
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    blocks.push(current.trim().to_string());
    blocks
}
