//! mobilectl Git - Git access for changelog generation
//!
//! This crate wraps git2 to provide commit ranges, tag lookup and remote
//! URL handling for the changelog engine.

mod commits;
mod remote;
mod repository;
mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use remote::{compare_url, web_url};
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo};
