pub mod http;
pub mod memory;
pub mod storage;

pub use http::HttpBackend;
pub use memory::MemoryCredentialStorage;
pub use storage::FileCredentialStorage;
