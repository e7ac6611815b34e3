// Shared prompt fragments.
// Each service that calls a provider defines its own prompts.rs alongside it;
// this file holds only cross-cutting instructions.

/// Appended to system prompts whose output is stored verbatim as markdown.
pub const MARKDOWN_ONLY_INSTRUCTION: &str = "Respond with the Markdown document only. \
    Do NOT wrap the document in code fences. \
    Do NOT include explanations, apologies or notes about the request.";
