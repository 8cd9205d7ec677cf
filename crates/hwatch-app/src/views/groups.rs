//! Group (house) list and form screen state

use hwatch_core::prelude::*;
use hwatch_core::Group;

use crate::api::ApiClient;
use crate::validation::{validate, Check, FieldError, Rule};

use super::matches_filter;

/// List state for the groups screen
#[derive(Debug, Default)]
pub struct GroupListState {
    items: Vec<Group>,
    filter: String,
}

impl GroupListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        self.items = api.list_groups().await?;
        debug!(count = self.items.len(), "group list refreshed");
        Ok(())
    }

    pub fn set_items(&mut self, items: Vec<Group>) {
        self.items = items;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn items(&self) -> &[Group] {
        &self.items
    }

    pub fn visible(&self) -> Vec<&Group> {
        self.items
            .iter()
            .filter(|g| matches_filter(&g.name, &self.filter))
            .collect()
    }

    pub fn upsert(&mut self, group: Group) {
        match self.items.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => self.items.push(group),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|g| g.id != id);
    }
}

/// New/edit group form
#[derive(Debug, Default, Clone)]
pub struct GroupForm {
    pub name: String,
    pub customer_id: String,
}

const GROUP_RULES: &[Rule] = &[
    Rule::new("name", Check::Required, "name is required"),
    Rule::new("name", Check::MaxLen(64), "name is too long"),
];

impl GroupForm {
    pub fn validate(&self) -> Vec<FieldError> {
        validate(
            &[("name", &self.name), ("customer_id", &self.customer_id)],
            GROUP_RULES,
        )
    }
}
