//! Device list screen state

use hwatch_core::prelude::*;
use hwatch_core::Device;

use crate::api::ApiClient;
use crate::validation::{validate, Check, FieldError, Rule};

use super::matches_filter;

/// List state for the devices screen
#[derive(Debug, Default)]
pub struct DeviceListState {
    items: Vec<Device>,
    filter: String,
}

impl DeviceListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list from the backend
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        self.items = api.list_devices().await?;
        debug!(count = self.items.len(), "device list refreshed");
        Ok(())
    }

    pub fn set_items(&mut self, items: Vec<Device>) {
        self.items = items;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn items(&self) -> &[Device] {
        &self.items
    }

    /// Items passing the current filter (name or serial number)
    pub fn visible(&self) -> Vec<&Device> {
        self.items
            .iter()
            .filter(|d| {
                matches_filter(&d.name, &self.filter)
                    || matches_filter(&d.serial_number, &self.filter)
            })
            .collect()
    }

    /// Optimistic insert-or-replace by record ID
    pub fn upsert(&mut self, device: Device) {
        match self.items.iter_mut().find(|d| d.id == device.id) {
            Some(existing) => *existing = device,
            None => self.items.push(device),
        }
    }

    /// Optimistic removal by record ID
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|d| d.id != id);
    }
}

/// New/edit device form
#[derive(Debug, Default, Clone)]
pub struct DeviceForm {
    pub name: String,
    pub serial_number: String,
    pub group_id: String,
}

const DEVICE_RULES: &[Rule] = &[
    Rule::new("name", Check::Required, "name is required"),
    Rule::new("name", Check::MaxLen(64), "name is too long"),
    Rule::new("serial_number", Check::Required, "serial number is required"),
];

impl DeviceForm {
    pub fn validate(&self) -> Vec<FieldError> {
        validate(
            &[
                ("name", &self.name),
                ("serial_number", &self.serial_number),
                ("group_id", &self.group_id),
            ],
            DEVICE_RULES,
        )
    }
}
