//! # IO Module
//!
//! The interface layer between HTTP clients and the domain logic. It turns
//! requests into domain calls and domain results into JSON responses; see
//! [`rest`] for the endpoints and the error mapping.

pub mod rest;

pub use rest::{
    cron_apis::*, health, income_apis::*, subscription_apis::*, summary_apis::*, user_apis::*,
};
