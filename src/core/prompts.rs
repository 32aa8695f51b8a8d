use crate::domain::EvidenceItem;

/// First `max_chars` characters of `text`, cut on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn extraction_prompt(text: &str) -> String {
    // JSON output mode requires an object at the top level, so ask for
    // {"claims": [...]}; a bare list is still accepted when parsing.
    format!(
        r#"You are a fact-checking assistant.

Extract ALL sentences from the text below that:
- Make a factual assertion
- Contain numbers, dates, prices, years, or measurable facts

Return STRICTLY valid JSON like this:
{{
  "claims": [
    {{
      "claim_text": "...",
      "claim_type": "general",
      "key_entities": []
    }}
  ]
}}

Text:
{text}"#
    )
}

/// `Source:`/`Content:` blocks for the first `max_sources` evidence items
pub fn evidence_blocks(sources: &[EvidenceItem], max_sources: usize, snippet_chars: usize) -> String {
    sources
        .iter()
        .take(max_sources)
        .map(|s| {
            format!(
                "Source: {}\nContent: {}",
                s.title,
                truncate_chars(&s.content, snippet_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn verification_prompt(claim_text: &str, evidence_blocks: &str) -> String {
    format!(
        r#"You are a professional fact-checker.

Classify the claim into ONE of the following:

1. Verified -> Sources clearly confirm the claim.
2. Inaccurate -> Sources confirm the topic BUT the value/date/details are outdated or incorrect.
3. False -> Claim is a myth, contradicted, or unsupported by reliable sources.

IMPORTANT RULES:
- Do NOT mark a claim False just because numbers differ.
- If the topic is correct but numbers/dates differ -> Inaccurate.
- Use False ONLY when clearly unsupported or debunked.

CLAIM:
{claim_text}

SOURCES:
{evidence_blocks}

Return STRICT JSON:
{{
  "verification_status": "Verified | Inaccurate | False",
  "explanation": "short explanation",
  "corrected_value": "only if Inaccurate"
}}"#
    )
}
