pub mod response;
pub mod rest_client;
pub mod traits;
