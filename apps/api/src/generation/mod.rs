// Article generation engine.
// Implements: provider fallback chain, fallback template, markdown post-processing,
// slugs, header images, persistence and the blog routes.
// All provider calls go through llm_client and images; nothing here talks HTTP directly.

pub mod article;
pub mod generator;
pub mod handlers;
pub mod images;
pub mod prompts;
pub mod repository;
pub mod resolver;
pub mod slug;
pub mod storage;
pub mod template;
