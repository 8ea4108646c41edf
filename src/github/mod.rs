//! Code-host (GitHub) integration: webhook admission, wire models, and the outbound REST client.

pub mod client;
pub mod models;
pub mod webhook;

pub use client::{Client, ClientCache};
pub use models::{Account, PullRequest, PullRequestEvent, PullRequestReviewEvent, Repository, Review, ReviewState,
                 WebhookEvent};
