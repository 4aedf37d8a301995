//! Remote resource references and provisioning outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier plus display name for a project or service on an
/// external hosting platform. The platform is authoritative; nothing is
/// owned locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Environment variables staged for a remote resource.
///
/// Entries are applied independently; one failed upsert never blocks the
/// rest. Insertion order is preserved so reports are deterministic.
#[derive(Debug, Clone, Default)]
pub struct EnvVarSet {
    entries: Vec<(String, String)>,
}

impl EnvVarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
        self
    }

    /// Add a variable only when a value is present.
    pub fn set_opt(&mut self, name: impl Into<String>, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lifecycle of one logical resource during a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionState {
    Unknown,
    Listed,
    Found,
    NotFound,
    Creating,
    Created,
    ConfiguringAttributes,
    Done,
    PartiallyDone,
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionState::Unknown => "unknown",
            ProvisionState::Listed => "listed",
            ProvisionState::Found => "found",
            ProvisionState::NotFound => "not found",
            ProvisionState::Creating => "creating",
            ProvisionState::Created => "created",
            ProvisionState::ConfiguringAttributes => "configuring attributes",
            ProvisionState::Done => "done",
            ProvisionState::PartiallyDone => "partially done",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one independent attribute call (variable upsert or start
/// command update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeOutcome {
    pub name: String,
    pub error: Option<String>,
}

impl AttributeOutcome {
    pub fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: Some(error.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Final summary for one provisioned resource.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub resource: ResourceRef,
    /// Terminal state: `Done` when every attribute applied, otherwise
    /// `PartiallyDone`.
    pub state: ProvisionState,
    /// Whether an existing resource was reused instead of created.
    pub reused: bool,
    pub attributes: Vec<AttributeOutcome>,
}

impl ProvisionReport {
    pub fn applied(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.succeeded())
            .map(|a| a.name.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<&AttributeOutcome> {
        self.attributes.iter().filter(|a| !a.succeeded()).collect()
    }

    pub fn is_partial(&self) -> bool {
        self.state == ProvisionState::PartiallyDone
    }

    /// Manual-completion checklist for attributes the API refused, so the
    /// operator can finish the task from the dashboard.
    pub fn manual_steps(&self, dashboard_url: &str) -> Vec<String> {
        let mut steps = Vec::new();
        if self.failed().is_empty() {
            return steps;
        }
        steps.push(format!("Open {}", dashboard_url));
        steps.push(format!("Select service \"{}\"", self.resource.name));
        for outcome in self.failed() {
            steps.push(format!(
                "Set {} manually ({})",
                outcome.name,
                outcome.error.as_deref().unwrap_or("no detail")
            ));
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_set_replaces_existing() {
        let mut vars = EnvVarSet::new();
        vars.set("RAILS_ENV", "development");
        vars.set("RAILS_ENV", "production");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("RAILS_ENV"), Some("production"));
    }

    #[test]
    fn test_env_var_set_opt_skips_none() {
        let mut vars = EnvVarSet::new();
        vars.set_opt("REDIS_URL", None);
        vars.set_opt("DATABASE_URL", Some("postgres://u:p@h/db"));
        assert_eq!(vars.names(), vec!["DATABASE_URL"]);
    }

    #[test]
    fn test_report_partition_and_manual_steps() {
        let report = ProvisionReport {
            resource: ResourceRef::new("svc-1", "app-worker"),
            state: ProvisionState::PartiallyDone,
            reused: false,
            attributes: vec![
                AttributeOutcome::ok("DATABASE_URL"),
                AttributeOutcome::failed("REDIS_URL", "API error: denied"),
            ],
        };
        assert_eq!(report.applied(), vec!["DATABASE_URL"]);
        assert_eq!(report.failed().len(), 1);
        assert!(report.is_partial());

        let steps = report.manual_steps("https://railway.app/project/p-1");
        assert!(steps.iter().any(|s| s.contains("REDIS_URL")));
        assert!(steps[0].contains("railway.app"));
    }

    #[test]
    fn test_done_report_has_no_manual_steps() {
        let report = ProvisionReport {
            resource: ResourceRef::new("svc-1", "app-worker"),
            state: ProvisionState::Done,
            reused: true,
            attributes: vec![AttributeOutcome::ok("DATABASE_URL")],
        };
        assert!(report.manual_steps("https://railway.app").is_empty());
    }
}
