//! GraphQL document builders for the query pipeline.
//!
//! Retrieval and answer generation both happen server-side in Weaviate: the
//! `nearText` operator embeds and ranks, and the generative module produces a
//! grouped answer over the returned snippets. These helpers only assemble the
//! GraphQL text; user input is embedded through JSON string escaping.

use serde_json::Value;

/// Class holding ingested documents in the Weaviate schema.
pub(crate) const DOCUMENT_CLASS: &str = "Document";

/// Maximum number of snippets retrieved per query.
const QUERY_LIMIT: usize = 8;

/// Instruction handed to the generative module, grouped over all snippets.
fn grouped_task(query: &str) -> String {
    format!(
        "You are a chatbot for Retrieval Augmented Generation. Answer the query '{query}' \
         in two to three sentences using only the given snippets of documents, and add code \
         examples wrapped in markdown at the end if they help."
    )
}

/// Build the `Get` query for retrieval plus grouped generation.
pub(crate) fn build_get_query(query: &str) -> String {
    let concepts = quote(query);
    let task = quote(&grouped_task(query));
    format!(
        "{{ Get {{ {DOCUMENT_CLASS}(nearText: {{concepts: [{concepts}]}}, limit: {QUERY_LIMIT}) \
         {{ doc_name doc_type doc_link text _additional {{ id distance \
         generate(groupedResult: {{task: {task}}}) {{ groupedResult error }} }} }} }} }}"
    )
}

/// Render text as a quoted GraphQL string literal.
fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}
