/// Strip a leading/trailing markdown code fence from a model response.
///
/// Models asked for raw JSON frequently wrap it in ```json ... ``` anyway;
/// callers run this before parsing rather than special-casing every prompt.
pub fn strip_code_blocks(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\n', '\r']);
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

/// Truncate a string to at most `max_chars` chars, on a char boundary.
pub fn truncate_to_char_boundary(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fenced_block() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_blocks(input), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fenced_block() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_blocks(input), "{\"a\": 1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        let input = "{\"a\": 1}";
        assert_eq!(strip_code_blocks(input), "{\"a\": 1}");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let input = "hello world";
        assert_eq!(truncate_to_char_boundary(input, 5), "hello");
    }

    #[test]
    fn truncate_is_a_no_op_when_shorter_than_limit() {
        let input = "hi";
        assert_eq!(truncate_to_char_boundary(input, 50), "hi");
    }
}
