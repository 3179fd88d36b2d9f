//! Interface of the host display widget a panel renders into.
//!
//! The host is provided by the surrounding GUI toolkit. A panel needs four
//! things from it: an enumerable property set, a settable document source, a
//! destruction notification and layout containment.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// What the host widget displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentSource {
    /// Cleared; nothing is displayed.
    Empty,
    /// Raw document text.
    Markup(String),
    /// A document file on disk.
    File(PathBuf),
}

/// Callback invoked once when the host is destroyed.
pub type DestroyObserver = Box<dyn Fn()>;

pub trait HostWidget {
    /// Names of every property the widget exposes.
    fn property_names(&self) -> Vec<String>;

    fn property(&self, name: &str) -> Option<Value>;

    fn set_property(&self, name: &str, value: Value) -> Result<(), String>;

    fn set_document_source(&self, source: DocumentSource);

    /// Run a layout/paint cycle so a cleared source is actually displayed.
    fn force_layout(&self);

    /// Make the widget fill its parent region.
    fn fill_parent(&self);

    /// Register an observer for the widget's destruction.
    fn on_destroyed(&self, observer: DestroyObserver);

    /// Destroy the widget, notifying observers.
    fn destroy(&self);
}

/// Creates hosts for panels that do not wrap an existing widget.
pub trait HostFactory {
    fn create_host(&self) -> Arc<dyn HostWidget>;
}

// ---------------------------------------------------------------------------
// Test host
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    /// Host recording every call made on it.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub(crate) properties: Mutex<BTreeMap<String, Value>>,
        pub(crate) sources: Mutex<Vec<DocumentSource>>,
        pub(crate) layouts: Mutex<usize>,
        pub(crate) filled: Mutex<bool>,
        pub(crate) destroy_calls: Mutex<usize>,
        observers: Mutex<Vec<DestroyObserver>>,
    }

    impl RecordingHost {
        pub(crate) fn with_properties(properties: &[(&str, Value)]) -> Arc<Self> {
            let host = Self::default();
            {
                let mut props = host.properties.lock();
                for (name, value) in properties {
                    props.insert(name.to_string(), value.clone());
                }
            }
            Arc::new(host)
        }

        pub(crate) fn last_source(&self) -> Option<DocumentSource> {
            self.sources.lock().last().cloned()
        }
    }

    impl HostWidget for RecordingHost {
        fn property_names(&self) -> Vec<String> {
            self.properties.lock().keys().cloned().collect()
        }

        fn property(&self, name: &str) -> Option<Value> {
            self.properties.lock().get(name).cloned()
        }

        fn set_property(&self, name: &str, value: Value) -> Result<(), String> {
            let mut props = self.properties.lock();
            match props.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(format!("no such property: {name}")),
            }
        }

        fn set_document_source(&self, source: DocumentSource) {
            self.sources.lock().push(source);
        }

        fn force_layout(&self) {
            *self.layouts.lock() += 1;
        }

        fn fill_parent(&self) {
            *self.filled.lock() = true;
        }

        fn on_destroyed(&self, observer: DestroyObserver) {
            self.observers.lock().push(observer);
        }

        fn destroy(&self) {
            *self.destroy_calls.lock() += 1;
            let observers = std::mem::take(&mut *self.observers.lock());
            for observer in &observers {
                observer();
            }
        }
    }

    /// Factory handing out one pre-built recording host.
    pub(crate) struct RecordingFactory(pub(crate) Arc<RecordingHost>);

    impl HostFactory for RecordingFactory {
        fn create_host(&self) -> Arc<dyn HostWidget> {
            self.0.clone()
        }
    }
}
