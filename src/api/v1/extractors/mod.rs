pub mod upstream_credentials;

pub use upstream_credentials::{UpstreamCredentials, UpstreamCredentialsExtractor};
