//! Capture guidance served as an MCP prompt.

pub const KNOWLEDGE_CAPTURE_PROMPT: &str = "knowledge_capture_guidance";

pub const KNOWLEDGE_CAPTURE_PROMPT_DESCRIPTION: &str =
    "Guidance on when and how to capture domain knowledge insights";

pub const KNOWLEDGE_CAPTURE_GUIDANCE: &str = r#"## Knowledge Capture Guidance

### When to Capture an Insight

Call capture_insight when the user shares domain knowledge that would make the data catalog more accurate. Signals by category:

**correction**: the user fixes a column description, a table's purpose or how data should be read.
Example: "That column is gross margin before returns, not revenue."

**business_context**: the user explains what data means in business terms the metadata does not say.
Example: "MRR only counts active subscriptions, never trials."

**data_quality**: the user reports a known defect or limitation.
Example: "Timestamps before March 2024 are UTC; after that they are America/Chicago."

**usage_guidance**: the user shares how to query or read the data correctly.
Example: "Always filter status = 'active' on that table or soft deletes show up as duplicates."

**relationship**: the user explains a connection between datasets that lineage does not show.
Example: "orders.customer_id joins the legacy CRM export, not the identity table."

**enhancement**: the user suggests better documentation or metadata.
Example: "sales_daily should carry a tag saying it refreshes at 6 AM CT."

### Agent-Discovered Insights

You may also capture what you learn on your own while exploring data. Use the source field to say where the insight came from:

**source: "agent_discovery"** for things you worked out yourself:
- what a column really holds, from sampling values (e.g. "amt looks like cents, not dollars")
- join keys missing from lineage (e.g. "orders.cust_id matches customers.legacy_id")
- quality patterns found through queries (e.g. "ship_date is NULL for 23% of completed orders since 2024-06")
- refresh cadence observed from max timestamps over several queries

**source: "enrichment_gap"** for metadata gaps an administrator should fill:
- a table with no description whose purpose the data does not reveal
- missing or clearly stale column descriptions
- lineage that is incomplete or contradicts the data
- datasets that plainly belong to a domain but carry no tags or glossary terms

**source: "user"** (the default) for knowledge the user states explicitly.

### When to Ask the User Instead

Do not guess when:
- the metadata is too thin and the data alone does not settle the meaning
- several readings of a column or table are equally plausible
- a wrong insight would be costly (PII classification, deprecation, compliance tags)

Ask the user first and capture only once they confirm.

### When NOT to Capture

Skip:
- transient questions or debugging ("why is my query slow?")
- personal preferences ("I like CTEs")
- anything the catalog already says
- vague claims with no specific context
- trivial observations with no catalog value
- obvious gaps reported without saying what the data actually means
- interpretations you have not verified against the data
- the same gap more than once in a session

### Best Practices

- List entity URNs whenever the insight concerns known datasets
- Add suggested_actions (update_description, add_tag, ...) when a concrete edit is clear
- Use confidence "high" only when the user is clearly authoritative
- For your own discoveries: "high" when verified by a query, "medium" when inferred from patterns, "low" when speculative
- Capture promptly while the context is fresh"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_covers_sections() {
        for section in [
            "When to Capture",
            "Agent-Discovered Insights",
            "When to Ask the User Instead",
            "When NOT to Capture",
            "Best Practices",
            "capture_insight",
            "enrichment_gap",
        ] {
            assert!(KNOWLEDGE_CAPTURE_GUIDANCE.contains(section), "missing {section}");
        }
    }
}
