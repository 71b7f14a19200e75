use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{Record, RecordField, Store, TrackingStatus},
    error::UnknownVariant,
};

/// Session draft shared between the form and the submission controller.
///
/// Accepts incomplete input; validation happens at submit time.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    inner: Arc<Mutex<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Record {
        self.lock().clone()
    }

    pub fn set_order_number(&self, value: impl Into<String>) {
        self.lock().order_number = value.into();
    }

    pub fn set_tracking_status(&self, value: TrackingStatus) {
        self.lock().tracking_status = value;
    }

    pub fn set_link(&self, value: impl Into<String>) {
        self.lock().link = value.into();
    }

    pub fn set_store(&self, value: Store) {
        self.lock().store = value;
    }

    pub fn set_action(&self, value: impl Into<String>) {
        self.lock().action = value.into();
    }

    /// Sets a field from its textual form. Enum fields take their wire value, `""` meaning unset.
    pub fn set(&self, field: RecordField, value: &str) -> Result<(), UnknownVariant> {
        match field {
            RecordField::OrderNumber => self.set_order_number(value),
            RecordField::TrackingStatus => self.set_tracking_status(value.parse()?),
            RecordField::Link => self.set_link(value),
            RecordField::Store => self.set_store(value.parse()?),
            RecordField::Action => self.set_action(value),
        }
        Ok(())
    }

    pub fn reset(&self) {
        *self.lock() = Record::default();
    }

    fn lock(&self) -> MutexGuard<'_, Record> {
        // Record has no invariants a panicking writer could break.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
