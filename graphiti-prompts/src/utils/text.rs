//! Text processing utilities.

/// Locate the JSON object in a model response that may wrap it in prose or a
/// markdown code fence.
///
/// Tries, in order:
/// 1. the body of a ` ```json ` fence
/// 2. the body of a bare ` ``` ` fence
/// 3. the span from the first `{` to the last `}`
///
/// Returns `None` when no candidate object is found. The returned slice is not
/// guaranteed to be valid JSON; callers still parse it.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let candidate = fenced_body(s, "```json")
        .or_else(|| fenced_body(s, "```"))
        .unwrap_or(s);

    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    (end > start).then(|| &candidate[start..=end])
}

/// Body of the first code fence opened by `opener`, trimmed.
fn fenced_body<'a>(s: &'a str, opener: &str) -> Option<&'a str> {
    let open = s.find(opener)? + opener.len();
    let body_start = open + s[open..].find('\n')? + 1;
    let body_len = s[body_start..].find("```")?;
    let body = s[body_start..body_start + body_len].trim();
    (!body.is_empty()).then_some(body)
}
