use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// An entry of the services resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Service {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Service {
    fn matches_search(&self, query: &str) -> bool {
        contains_ignore_case(&self.title, query) || contains_ignore_case(&self.description, query)
    }
}

/// Body for creating or updating a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ServiceInput {
    pub title: String,
    pub description: String,
}

impl ServiceInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&Service> for ServiceInput {
    fn from(service: &Service) -> Self {
        Self::new(service.title.clone(), service.description.clone())
    }
}

/// Services whose title or description contains `query`, ignoring case.
pub fn filter_services<'a>(services: &'a [Service], query: &str) -> Vec<&'a Service> {
    services.iter().filter(|s| s.matches_search(query)).collect()
}
