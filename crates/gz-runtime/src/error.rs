use uuid::Uuid;

/// Tagged failure taxonomy for the reconciliation service.
///
/// Only these abort a computation. Data-integrity anomalies — nonzero
/// discrepancy, negative reconstructed balances, unclassified entries — are
/// carried inside the successful result instead.
#[derive(Debug)]
pub enum ServiceError {
    /// The product does not exist in the persistence layer.
    ProductNotFound { product_id: Uuid },
    /// The persistence collaborator was unreachable or a query failed.
    /// No retries happen here; retrying belongs to the collaborator's client.
    Storage(anyhow::Error),
}

impl ServiceError {
    pub fn storage(err: anyhow::Error) -> Self {
        ServiceError::Storage(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::ProductNotFound { .. })
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::ProductNotFound { product_id } => {
                write!(f, "product not found: {product_id}")
            }
            ServiceError::Storage(err) => write!(f, "storage error: {err:#}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::ProductNotFound { .. } => None,
            ServiceError::Storage(err) => Some(err.as_ref()),
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Storage(err)
    }
}
