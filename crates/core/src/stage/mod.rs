pub mod snapshot;
pub mod link;
pub mod fetch;
