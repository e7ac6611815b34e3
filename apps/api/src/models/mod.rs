pub mod application;
pub mod article;
pub mod billing;
pub mod content;
