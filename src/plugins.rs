//! Plugin catalog contract and its presentation in a panel.
//!
//! Discovery, installation and updates live outside this crate. The
//! plugin-management dialog only needs the list, the update/uninstall
//! operations and change notifications, and shows the list as markdown.

use crate::content::Content;
use crate::error::PanelResult;
use crate::panel::Panel;
use serde::{Deserialize, Serialize};

/// Plugin as reported by the catalog (mirrors its manifest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginChange {
    Installed(String),
    Updated(String),
    Uninstalled(String),
}

pub type PluginListener = Box<dyn Fn(&PluginChange)>;

pub trait PluginCatalog {
    fn plugins(&self) -> Vec<PluginSummary>;

    fn update(&self, id: &str) -> Result<(), String>;

    fn uninstall(&self, id: &str) -> Result<(), String>;

    /// Register a listener called after every change to the catalog.
    fn subscribe(&self, listener: PluginListener);
}

/// Markdown listing of `plugins`: a heading and a table, one row per plugin.
pub fn plugin_listing(plugins: &[PluginSummary]) -> Content {
    let mut lines = vec!["# Plugins".to_string()];
    if plugins.is_empty() {
        lines.push("_No plugins installed._".to_string());
        return Content::Lines(lines);
    }

    let mut table = vec![
        "| Name | Version | Author | Description |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];
    for plugin in plugins {
        table.push(format!(
            "| {} | {} | {} | {} |",
            table_cell(&plugin.name),
            table_cell(&plugin.version),
            table_cell(plugin.author.as_deref().unwrap_or("")),
            table_cell(plugin.description.as_deref().unwrap_or("")),
        ));
    }
    // Table rows must stay on consecutive lines
    lines.push(table.join("\n"));
    Content::Lines(lines)
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Show the catalog's current plugin list in `panel`.
pub fn show_plugins(panel: &mut Panel, catalog: &dyn PluginCatalog) -> PanelResult<()> {
    panel.set_content(plugin_listing(&catalog.plugins()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
