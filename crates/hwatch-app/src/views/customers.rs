//! Customer list and form screen state

use hwatch_core::prelude::*;
use hwatch_core::Customer;

use crate::api::ApiClient;
use crate::validation::{digits_only, validate, Check, FieldError, Rule};

use super::matches_filter;

/// Contact numbers are exactly 10 digits
pub const PHONE_DIGITS: usize = 10;

/// List state for the customers screen
#[derive(Debug, Default)]
pub struct CustomerListState {
    items: Vec<Customer>,
    filter: String,
}

impl CustomerListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        self.items = api.list_customers().await?;
        debug!(count = self.items.len(), "customer list refreshed");
        Ok(())
    }

    pub fn set_items(&mut self, items: Vec<Customer>) {
        self.items = items;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn items(&self) -> &[Customer] {
        &self.items
    }

    /// Items passing the current filter (name, email, or phone)
    pub fn visible(&self) -> Vec<&Customer> {
        self.items
            .iter()
            .filter(|c| {
                matches_filter(&c.name, &self.filter)
                    || c.email
                        .as_deref()
                        .is_some_and(|e| matches_filter(e, &self.filter))
                    || c.phone
                        .as_deref()
                        .is_some_and(|p| matches_filter(p, &self.filter))
            })
            .collect()
    }

    pub fn upsert(&mut self, customer: Customer) {
        match self.items.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer,
            None => self.items.push(customer),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|c| c.id != id);
    }
}

/// New/edit customer form
#[derive(Debug, Default, Clone)]
pub struct CustomerForm {
    pub name: String,
    phone: String,
    pub email: String,
    pub address: String,
}

const CUSTOMER_RULES: &[Rule] = &[
    Rule::new("name", Check::Required, "name is required"),
    Rule::new("name", Check::MaxLen(64), "name is too long"),
    Rule::new("phone", Check::Required, "phone is required"),
    Rule::new(
        "phone",
        Check::ExactDigits(PHONE_DIGITS),
        "phone must be exactly 10 digits",
    ),
    Rule::new("email", Check::Email, "email is invalid"),
];

impl CustomerForm {
    /// Apply a keystroke's worth of phone input: non-digits are stripped
    /// and anything beyond the cap is dropped before the value reaches
    /// state
    pub fn set_phone(&mut self, input: &str) {
        self.phone = digits_only(input, PHONE_DIGITS);
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn validate(&self) -> Vec<FieldError> {
        validate(
            &[
                ("name", &self.name),
                ("phone", &self.phone),
                ("email", &self.email),
                ("address", &self.address),
            ],
            CUSTOMER_RULES,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, name: &str, phone: &str) -> Customer {
        Customer {
            id: id.into(),
            name: name.into(),
            email: None,
            phone: Some(phone.into()),
            address: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_filter_matches_phone() {
        let mut state = CustomerListState::new();
        state.set_items(vec![
            customer("1", "An Nguyen", "0901234567"),
            customer("2", "Binh Tran", "0987654321"),
        ]);

        state.set_filter("0901");
        let visible = state.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "1");
    }

    #[test]
    fn test_phone_input_strips_and_caps() {
        let mut form = CustomerForm::default();

        form.set_phone("0901234567890");
        assert_eq!(form.phone(), "0901234567");

        form.set_phone("09a0b1c234567");
        assert_eq!(form.phone(), "0901234567");
    }

    #[test]
    fn test_form_validation() {
        let mut form = CustomerForm {
            name: "An Nguyen".into(),
            phone: String::new(),
            email: "an@example.com".into(),
            address: String::new(),
        };
        form.set_phone("0901234567");
        assert!(form.validate().is_empty());

        form.set_phone("090");
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "phone must be exactly 10 digits");
    }

    #[test]
    fn test_optimistic_patch_round_trip() {
        let mut state = CustomerListState::new();
        state.upsert(customer("1", "An", "0901234567"));
        state.upsert(customer("1", "An Nguyen", "0901234567"));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].name, "An Nguyen");
        state.remove("1");
        assert!(state.items().is_empty());
    }
}
