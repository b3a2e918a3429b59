pub mod format;
pub mod json_store;
#[cfg(not(target_arch = "wasm32"))]
pub mod sqlite_store;
pub mod traits;
