//! The shared model container
//!
//! A named JSON object kept in sync over the channel. Two writers mutate it:
//! the channel's inbound path (merging server frames) and the application
//! (via [`SharedModel::update`]). A publisher channel forwards application
//! mutations to the server; the `receiving` re-entrancy flag suppresses that
//! forwarding while an inbound merge is in progress, so a just-received
//! update is never echoed straight back.

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// A named, observable JSON object map
pub struct SharedModel {
    name: String,
    values: RwLock<Map<String, Value>>,
    /// Held while an inbound merge is applied; suppresses publishing
    receiving: AtomicBool,
    /// Attached by the channel when it acts as a publisher
    publish_tx: Mutex<Option<UnboundedSender<String>>>,
}

impl SharedModel {
    /// Create an empty model under the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(Map::new()),
            receiving: AtomicBool::new(false),
            publish_tx: Mutex::new(None),
        }
    }

    /// The key this model is known by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a single field's current value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Clone the full current contents
    pub fn snapshot(&self) -> Map<String, Value> {
        self.values.read().clone()
    }

    /// Apply an application-side mutation
    ///
    /// If the mutation actually changed the contents and a publisher channel
    /// is attached, the new snapshot is serialized and queued for sending.
    /// Mutations applied while an inbound merge is in progress are never
    /// published.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let (changed, snapshot) = {
            let mut values = self.values.write();
            let before = values.clone();
            mutate(&mut values);
            (*values != before, values.clone())
        };

        if changed {
            self.publish(&snapshot);
        }
    }

    /// Shallow-merge an inbound frame's fields into the model
    ///
    /// New fields overwrite existing ones with the same name (last-write-wins).
    /// Called by the channel for every decoded frame while subscribed. The
    /// merge goes through the same change-notification path as [`update`],
    /// but with the re-entrancy flag held, so it is never echoed back out.
    ///
    /// [`update`]: SharedModel::update
    pub fn merge(&self, fields: Map<String, Value>) {
        self.receiving.store(true, Ordering::Release);
        self.update(|values| {
            for (key, value) in fields {
                values.insert(key, value);
            }
        });
        self.receiving.store(false, Ordering::Release);
    }

    /// Attach the channel's publish queue; replaces any previous one
    pub(crate) fn attach_publisher(&self, tx: UnboundedSender<String>) {
        *self.publish_tx.lock() = Some(tx);
    }

    fn publish(&self, values: &Map<String, Value>) {
        if self.receiving.load(Ordering::Acquire) {
            debug!(model = %self.name, "inbound merge in progress, not publishing");
            return;
        }
        let guard = self.publish_tx.lock();
        let Some(tx) = guard.as_ref() else {
            return;
        };
        match serde_json::to_string(values) {
            Ok(json) => {
                let _ = tx.send(json);
            }
            Err(e) => warn!(model = %self.name, "failed to serialize model: {}", e),
        }
    }
}
