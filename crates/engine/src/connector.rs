use std::sync::Arc;

use wfinterop_api::{ApiError, HttpTrsClient, HttpWesClient, Trs, Wes};
use wfinterop_types::ServiceEntry;

/// Builds service clients for configuration entries.
pub trait ServiceConnector: Send + Sync {
    fn trs(&self, trs_id: &str, entry: &ServiceEntry) -> Result<Trs, ApiError>;

    fn wes(&self, wes_id: &str, entry: &ServiceEntry) -> Result<Wes, ApiError>;
}

/// Connects over HTTP using the entry's host, proto and auth.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl ServiceConnector for HttpConnector {
    fn trs(&self, _trs_id: &str, entry: &ServiceEntry) -> Result<Trs, ApiError> {
        Ok(Trs::new(Arc::new(HttpTrsClient::from_entry(entry)?)))
    }

    fn wes(&self, _wes_id: &str, entry: &ServiceEntry) -> Result<Wes, ApiError> {
        Ok(Wes::new(Arc::new(HttpWesClient::from_entry(entry)?)))
    }
}
