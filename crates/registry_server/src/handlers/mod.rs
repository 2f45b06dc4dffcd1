pub mod bank_details;
pub mod banks;
pub mod documents;
pub mod health;
