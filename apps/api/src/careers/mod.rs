// Job-application intake: public submission, admin listing.

pub mod handlers;
pub mod intake;
pub mod repository;
