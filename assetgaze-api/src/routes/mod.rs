/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, status and logout
/// - `transactions`: Transaction CRUD
/// - `accounts`: Account creation and listing
/// - `brokers`: Broker reference data

pub mod accounts;
pub mod auth;
pub mod brokers;
pub mod health;
pub mod transactions;
