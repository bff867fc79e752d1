//! Console API: a resilient client for a web console's `/api/` backend.
//!
//! This crate dispatches calls with session headers, retries transient
//! failures with jittered exponential backoff, rotates the anti-forgery
//! token from responses, and builds org-scoped links into the console.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use console_api::api::ApiClient;
//! use console_api::config::load_config;
//! use console_api::context::AppContext;
//! use console_api::types::Params;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let context = Arc::new(AppContext::from_config(&config).unwrap());
//! let client = ApiClient::new_with_retry_policy(
//!     context,
//!     config.network.timeout(),
//!     config.retry.policy(),
//! );
//! let response = client.get("v1/GetUserUITraits", &Params::new(), None).await.unwrap();
//! println!("{}", response.data);
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod build_info;
pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod links;
#[cfg(test)]
pub mod testsupport;
pub mod types;
