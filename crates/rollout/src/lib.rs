pub mod bucket;
pub mod resolver;
pub mod version;

pub use bucket::{Bucketer, Sha256Bucketer};
pub use resolver::{Client, ReleaseTerms, Resolver, Verdict};
