//! Logical service name -> base URL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use registry_core::DownstreamError;
use url::Url;

pub trait ServiceResolver: Send + Sync {
    /// Base URL of one instance of `service`.
    fn resolve(&self, service: &str) -> Result<Url, DownstreamError>;
}

struct Instances {
    urls: Vec<Url>,
    next: AtomicUsize,
}

/// Fixed instance lists, rotated round-robin per service.
#[derive(Default)]
pub struct StaticResolver {
    services: HashMap<String, Instances>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register instances for a service. An empty list leaves the service
    /// unresolvable.
    pub fn with_service(mut self, service: impl Into<String>, urls: Vec<Url>) -> Self {
        self.services.insert(
            service.into(),
            Instances {
                urls,
                next: AtomicUsize::new(0),
            },
        );
        self
    }
}

impl ServiceResolver for StaticResolver {
    fn resolve(&self, service: &str) -> Result<Url, DownstreamError> {
        let instances = self
            .services
            .get(service)
            .filter(|i| !i.urls.is_empty())
            .ok_or_else(|| DownstreamError::Unresolved(service.to_string()))?;
        let slot = instances.next.fetch_add(1, Ordering::Relaxed) % instances.urls.len();
        Ok(instances.urls[slot].clone())
    }
}
