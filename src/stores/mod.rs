// Stores layer - Data access and repository pattern
pub mod audit_store;
pub mod certificate_store;
pub mod dictionary_store;
pub mod key_store;
pub mod user_store;
pub mod workhours_store;

pub use audit_store::AuditStore;
pub use certificate_store::CertificateStore;
pub use dictionary_store::DictionaryStore;
pub use key_store::KeyStore;
pub use user_store::UserStore;
pub use workhours_store::WorkhoursStore;
