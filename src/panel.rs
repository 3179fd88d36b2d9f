//! The markdown panel: owns the state, rebuilds the document on every
//! relevant mutation and keeps its lifetime tied to the host widget.
//!
//! Every setter is a command: apply the change, then run exactly one
//! serialize → build → deliver cycle before returning. Sequential mutations are
//! not coalesced.

use crate::config::PanelConfig;
use crate::content::{serialize_content, Content};
use crate::diagnostics::{DiagnosticEntry, Diagnostics};
use crate::document::DocumentBuilder;
use crate::engine::{self, ConverterEngine};
use crate::error::{PanelError, PanelResult};
use crate::fetch::{HttpFetcher, ResourceFetcher};
use crate::host::{HostFactory, HostWidget};
use crate::lifecycle::{DestroyCause, Lifecycle, PanelState};
use crate::options::{serialize_options, OptionValue, PanelOptions};
use crate::proxy::{self, PropertyProxy};
use crate::render::{self, RenderMode};
use crate::stylesheets::{StylesheetCache, Stylesheets};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

enum HostBinding<'a> {
    Existing(Arc<dyn HostWidget>),
    Create(&'a dyn HostFactory),
}

/// Configures and constructs a [`Panel`].
pub struct PanelBuilder<'a> {
    binding: HostBinding<'a>,
    config: PanelConfig,
    fetcher: Option<Box<dyn ResourceFetcher>>,
    engine: Option<ConverterEngine>,
    engine_path: Option<PathBuf>,
}

impl PanelBuilder<'_> {
    /// Values applied during construction, before the first render.
    pub fn config(mut self, config: PanelConfig) -> Self {
        self.config = config;
        self
    }

    /// Fetcher for stylesheets and the engine repair. Defaults to [`HttpFetcher`].
    pub fn fetcher(mut self, fetcher: impl ResourceFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Use an already loaded engine instead of reading it from disk.
    pub fn engine(mut self, engine: ConverterEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Read the engine from `path` instead of [`engine::engine_path`].
    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_path = Some(path.into());
        self
    }

    pub fn build(self) -> PanelResult<Panel> {
        let fetcher: Box<dyn ResourceFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(HttpFetcher::new()?),
        };

        let (host, owns_host) = match self.binding {
            HostBinding::Existing(host) => (host, false),
            HostBinding::Create(factory) => {
                let host = factory.create_host();
                host.fill_parent();
                (host, true)
            }
        };

        let lifecycle = Lifecycle::new();
        let observed = Arc::clone(&lifecycle);
        host.on_destroyed(Box::new(move || {
            observed.begin_destroy(DestroyCause::HostDestroyed);
        }));

        let proxy = PropertyProxy::build(host.as_ref());
        let mut diagnostics = Diagnostics::default();
        let engine = match self.engine {
            Some(engine) => engine,
            None => {
                let path = self.engine_path.unwrap_or_else(engine::engine_path);
                ConverterEngine::load(&path, fetcher.as_ref(), &mut diagnostics)
            }
        };
        let working_directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let mut panel = Panel {
            host,
            lifecycle,
            proxy,
            fetcher,
            engine,
            diagnostics,
            content: Content::default(),
            stylesheets: Stylesheets::default(),
            classes: Vec::new(),
            options: PanelOptions::with_defaults(),
            enable_images: false,
            working_directory,
            cache: StylesheetCache::new(),
            document: String::new(),
        };

        // A caller's host outlives a failed construction; a host created here
        // has no other owner and goes down with the panel.
        if let Err(e) = panel.apply_config(self.config).and_then(|()| panel.refresh()) {
            if panel.lifecycle.begin_destroy(DestroyCause::Disposed) && owns_host {
                panel.host.destroy();
            }
            return Err(e);
        }
        panel.lifecycle.mark_ready();
        tracing::debug!("panel ready");
        Ok(panel)
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

pub struct Panel {
    host: Arc<dyn HostWidget>,
    lifecycle: Arc<Lifecycle>,
    proxy: PropertyProxy,
    fetcher: Box<dyn ResourceFetcher>,
    engine: ConverterEngine,
    diagnostics: Diagnostics,

    content: Content,
    stylesheets: Stylesheets,
    classes: Vec<String>,
    options: PanelOptions,
    enable_images: bool,
    working_directory: PathBuf,

    cache: StylesheetCache,
    document: String,
}

impl Panel {
    /// Wrap an existing host widget.
    pub fn builder(host: Arc<dyn HostWidget>) -> PanelBuilder<'static> {
        PanelBuilder {
            binding: HostBinding::Existing(host),
            config: PanelConfig::default(),
            fetcher: None,
            engine: None,
            engine_path: None,
        }
    }

    /// Create a fresh host through `factory`, sized to fill its parent.
    pub fn with_new_host(factory: &dyn HostFactory) -> PanelBuilder<'_> {
        PanelBuilder {
            binding: HostBinding::Create(factory),
            config: PanelConfig::default(),
            fetcher: None,
            engine: None,
            engine_path: None,
        }
    }

    // -- state accessors --

    pub fn state(&self) -> PanelState {
        self.lifecycle.state()
    }

    pub fn destroy_cause(&self) -> Option<DestroyCause> {
        self.lifecycle.cause()
    }

    pub fn host(&self) -> &Arc<dyn HostWidget> {
        &self.host
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn stylesheets(&self) -> &Stylesheets {
        &self.stylesheets
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn enable_images(&self) -> bool {
        self.enable_images
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn cache(&self) -> &StylesheetCache {
        &self.cache
    }

    /// The current assembled document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn render_mode(&self) -> RenderMode {
        RenderMode::select(self.enable_images, &self.working_directory)
    }

    /// Recent non-fatal problems, oldest first (0 = all).
    pub fn diagnostics(&self, limit: usize) -> Vec<DiagnosticEntry> {
        self.diagnostics.entries(limit)
    }

    // -- mutations --

    pub fn set_content(&mut self, content: impl Into<Content>) -> PanelResult<()> {
        self.ensure_alive()?;
        self.content = content.into();
        self.changed()
    }

    /// Replace the stylesheet list. Uncached remote references are fetched
    /// before the rebuild.
    pub fn set_stylesheets(&mut self, stylesheets: impl Into<Stylesheets>) -> PanelResult<()> {
        self.ensure_alive()?;
        self.stylesheets = stylesheets.into();
        self.cache
            .resolve(&self.stylesheets, self.fetcher.as_ref(), &mut self.diagnostics);
        self.changed()
    }

    pub fn set_classes<I, S>(&mut self, classes: I) -> PanelResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_alive()?;
        self.classes = classes.into_iter().map(Into::into).collect();
        self.changed()
    }

    /// Replace all options. An assignment deep-equal to the current options
    /// does not rebuild.
    pub fn set_options(&mut self, options: PanelOptions) -> PanelResult<()> {
        self.ensure_alive()?;
        if options == self.options {
            return Ok(());
        }
        self.options = options;
        self.changed()
    }

    /// Set a single option, keeping the others.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> PanelResult<()> {
        let mut options = self.options.clone();
        options.insert(name, value);
        self.set_options(options)
    }

    pub fn set_enable_images(&mut self, enable_images: bool) -> PanelResult<()> {
        self.ensure_alive()?;
        self.enable_images = enable_images;
        self.changed()
    }

    /// Takes effect on the next rebuild; does not rebuild by itself.
    pub fn set_working_directory(&mut self, path: impl Into<PathBuf>) -> PanelResult<()> {
        self.ensure_alive()?;
        self.working_directory = path.into();
        Ok(())
    }

    /// Rebuild the document from the current state and deliver it.
    ///
    /// The only error raised for a live panel is a failed document write in
    /// file-backed mode.
    pub fn refresh(&mut self) -> PanelResult<()> {
        self.ensure_alive()?;
        let content = serialize_content(&self.content);
        let options = serialize_options(&self.options);
        let document = DocumentBuilder {
            content: &content,
            options: &options,
            stylesheets: &self.stylesheets,
            cache: &self.cache,
            classes: &self.classes,
            engine: &self.engine,
        }
        .build();

        render::deliver(self.host.as_ref(), &document, &self.render_mode())?;
        tracing::debug!(bytes = document.len(), images = self.enable_images, "panel refreshed");
        self.document = document;
        Ok(())
    }

    fn changed(&mut self) -> PanelResult<()> {
        match self.lifecycle.state() {
            PanelState::Ready => self.refresh(),
            PanelState::Constructing => Ok(()),
            PanelState::Destroyed => Err(PanelError::Destroyed),
        }
    }

    fn ensure_alive(&self) -> PanelResult<()> {
        if self.lifecycle.is_alive() {
            Ok(())
        } else {
            Err(PanelError::Destroyed)
        }
    }

    // -- generic property access --

    /// Read a panel property or a property forwarded to the host.
    pub fn property(&self, name: &str) -> PanelResult<Value> {
        self.ensure_alive()?;
        let value = match name {
            "content" => serde_json::to_value(&self.content),
            "stylesheets" => serde_json::to_value(&self.stylesheets),
            "classes" => serde_json::to_value(&self.classes),
            "options" => serde_json::to_value(&self.options),
            "enable_images" => Ok(Value::Bool(self.enable_images)),
            "working_directory" => serde_json::to_value(&self.working_directory),
            "host" => {
                return Err(PanelError::InvalidPropertyValue {
                    name: name.to_string(),
                    reason: "the host is not a value property".into(),
                });
            }
            _ => return self.proxy.read(self.host.as_ref(), name),
        };
        value.map_err(|e| PanelError::InvalidPropertyValue {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Write a panel property (rebuilding as its setter does) or forward the
    /// write to the host (no rebuild).
    pub fn set_property(&mut self, name: &str, value: Value) -> PanelResult<()> {
        match name {
            "content" => self.set_content(decode::<Content>(name, value)?),
            "stylesheets" => self.set_stylesheets(decode::<Stylesheets>(name, value)?),
            "classes" => self.set_classes(decode::<Vec<String>>(name, value)?),
            "options" => self.set_options(decode::<PanelOptions>(name, value)?),
            "enable_images" => self.set_enable_images(decode::<bool>(name, value)?),
            "working_directory" => self.set_working_directory(decode::<PathBuf>(name, value)?),
            "host" => Err(PanelError::InvalidPropertyValue {
                name: name.to_string(),
                reason: "the host is fixed at construction".into(),
            }),
            _ => {
                self.ensure_alive()?;
                self.proxy.write(self.host.as_ref(), name, value)
            }
        }
    }

    /// Names of host properties reachable through [`Panel::property`].
    pub fn forwarded_properties(&self) -> impl Iterator<Item = &str> {
        self.proxy.names()
    }

    fn apply_config(&mut self, config: PanelConfig) -> PanelResult<()> {
        if let Some(dir) = config.working_directory {
            self.set_working_directory(dir)?;
        }
        if let Some(options) = config.options {
            self.set_options(options)?;
        }
        if let Some(classes) = config.classes {
            self.set_classes(classes)?;
        }
        if let Some(stylesheets) = config.stylesheets {
            self.set_stylesheets(stylesheets)?;
        }
        if let Some(enable_images) = config.enable_images {
            self.set_enable_images(enable_images)?;
        }
        if let Some(content) = config.content {
            self.set_content(content)?;
        }
        for (name, value) in config.host_properties {
            if proxy::is_panel_property(&name) {
                continue;
            }
            self.set_property(&name, value)?;
        }
        Ok(())
    }

    // -- lifecycle --

    /// Destroy the panel and its host. Repeated calls are no-ops.
    pub fn dispose(&mut self) {
        if self.lifecycle.begin_destroy(DestroyCause::Disposed) {
            self.host.destroy();
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: Value) -> PanelResult<T> {
    serde_json::from_value(value).map_err(|e| PanelError::InvalidPropertyValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
