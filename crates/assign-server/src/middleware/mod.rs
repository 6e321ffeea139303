mod version;

pub use version::add_version_headers;
