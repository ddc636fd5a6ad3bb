pub mod agent;
pub mod conversation;
pub mod retrieval;
pub mod tooling;
