//! Forwarding table for host properties.
//!
//! Built once when the panel is constructed: every property the host exposes
//! that does not collide with a panel property is read and written straight
//! through to the host. Forwarded writes never trigger a rebuild.

use crate::error::{PanelError, PanelResult};
use crate::host::HostWidget;
use serde_json::Value;
use std::collections::BTreeSet;

/// Properties declared by the panel itself. Never forwarded.
pub const PANEL_PROPERTIES: &[&str] = &[
    "content",
    "stylesheets",
    "classes",
    "options",
    "enable_images",
    "working_directory",
    "host",
];

pub fn is_panel_property(name: &str) -> bool {
    PANEL_PROPERTIES.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct PropertyProxy {
    forwarded: BTreeSet<String>,
}

impl PropertyProxy {
    pub fn build(host: &dyn HostWidget) -> Self {
        let forwarded: BTreeSet<String> = host
            .property_names()
            .into_iter()
            .filter(|name| !is_panel_property(name))
            .collect();
        tracing::debug!(count = forwarded.len(), "forwarding host properties");
        Self { forwarded }
    }

    pub fn is_forwarded(&self, name: &str) -> bool {
        self.forwarded.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forwarded.iter().map(String::as_str)
    }

    pub fn read(&self, host: &dyn HostWidget, name: &str) -> PanelResult<Value> {
        if !self.is_forwarded(name) {
            return Err(PanelError::UnknownProperty {
                name: name.to_string(),
            });
        }
        Ok(host.property(name).unwrap_or(Value::Null))
    }

    pub fn write(&self, host: &dyn HostWidget, name: &str, value: Value) -> PanelResult<()> {
        if !self.is_forwarded(name) {
            return Err(PanelError::UnknownProperty {
                name: name.to_string(),
            });
        }
        host.set_property(name, value).map_err(|reason| PanelError::Host {
            name: name.to_string(),
            reason,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
