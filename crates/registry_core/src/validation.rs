//! Field checks for creation payloads. Every violation is collected so a
//! client sees all of them in one response.

use crate::error::{FieldViolation, RegistryError};
use crate::types::{NewBank, NewBankDetails, NewDocument};

pub trait Validate {
    fn violations(&self) -> Vec<FieldViolation>;

    fn validate(&self) -> Result<(), RegistryError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Validation(violations))
        }
    }
}

fn require_text(out: &mut Vec<FieldViolation>, field: &str, value: &str) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, "must not be blank"));
    }
}

fn require_positive(out: &mut Vec<FieldViolation>, field: &str, value: i64) {
    if value <= 0 {
        out.push(FieldViolation::new(field, "must be positive"));
    }
}

impl Validate for NewBank {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        require_text(&mut out, "name", &self.name);
        require_text(&mut out, "code", &self.code);
        require_text(&mut out, "address", &self.address);
        require_text(&mut out, "phoneNumber", &self.phone_number);
        require_text(&mut out, "email", &self.email);
        out
    }
}

impl Validate for NewBankDetails {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        require_positive(&mut out, "bankId", self.bank_id);
        require_text(&mut out, "name", &self.name);
        require_text(&mut out, "code", &self.code);
        require_text(&mut out, "address", &self.address);
        require_text(&mut out, "phoneNumber", &self.phone_number);
        require_text(&mut out, "email", &self.email);
        out
    }
}

impl Validate for NewDocument {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        require_positive(&mut out, "bankId", self.bank_id);
        require_text(&mut out, "title", &self.title);
        require_text(&mut out, "message", &self.message);
        out
    }
}
