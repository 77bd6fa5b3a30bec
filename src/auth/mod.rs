mod claims;
pub mod gate;
pub mod jwt;
pub mod repo;
pub mod repo_types;
pub mod verifier;

pub use claims::Claims;
pub use repo_types::Identity;
