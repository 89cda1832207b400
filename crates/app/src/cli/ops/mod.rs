pub mod bucket;
pub mod init;
pub mod version;

pub use bucket::Bucket;
pub use init::Init;
pub use version::Version;
