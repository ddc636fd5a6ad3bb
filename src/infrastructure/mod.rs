pub mod embedding;
pub mod index;
pub mod model;
pub mod search;
