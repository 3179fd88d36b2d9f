//! Markdown display panel.
//!
//! A [`Panel`] wraps a host display widget and keeps a self-contained HTML
//! document (markup, inlined stylesheets, converter script) in sync with its
//! state. Host properties it does not declare itself are forwarded to the
//! widget unchanged.

pub mod config;
pub mod content;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod host;
mod lifecycle;
pub mod logging;
pub mod options;
pub mod panel;
pub mod plugins;
pub mod proxy;
pub mod render;
pub mod stylesheets;

pub use config::PanelConfig;
pub use content::Content;
pub use error::{PanelError, PanelResult};
pub use fetch::{HttpFetcher, ResourceFetcher};
pub use host::{DocumentSource, HostFactory, HostWidget};
pub use lifecycle::{DestroyCause, PanelState};
pub use options::{OptionValue, PanelOptions};
pub use panel::{Panel, PanelBuilder};
pub use render::RenderMode;
pub use stylesheets::Stylesheets;
