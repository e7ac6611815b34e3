// Prompt templates for article and header-image generation.

use std::sync::OnceLock;

use crate::llm_client::prompts::MARKDOWN_ONLY_INSTRUCTION;

const BLOG_SYSTEM_ROLE: &str = "You are an expert technical writer and SEO content strategist. \
    You write accurate, well-structured long-form articles in Markdown.";

/// Article prompt template. Replace `{topic}` before sending.
pub const BLOG_PROMPT_TEMPLATE: &str = r###"Write a comprehensive, original blog article about: {topic}

Requirements:
- Start with a single H1 title line ("# ...") that is specific and engaging.
- Follow with a 2-3 sentence introduction that states what the reader will learn.
- Use 4-6 H2 sections ("## ...") covering fundamentals, practical usage, best practices and common pitfalls.
- Include concrete examples; use fenced code blocks where code helps.
- End with a "## Conclusion" section.
- Length: 1200-1800 words.
"###;

/// Image prompt template. Replace `{title}` before sending.
pub const IMAGE_PROMPT_TEMPLATE: &str =
    "A clean, modern blog header illustration for an article titled \"{title}\". \
    Flat design, soft gradient background, no text, high quality, 16:9";

/// System prompt sent to every text provider in the chain.
pub fn blog_system() -> &'static str {
    static SYSTEM: OnceLock<String> = OnceLock::new();
    SYSTEM.get_or_init(|| format!("{BLOG_SYSTEM_ROLE} {MARKDOWN_ONLY_INSTRUCTION}"))
}

pub fn blog_prompt(topic: &str) -> String {
    BLOG_PROMPT_TEMPLATE.replace("{topic}", topic)
}

pub fn image_prompt(title: &str) -> String {
    IMAGE_PROMPT_TEMPLATE.replace("{title}", title)
}
