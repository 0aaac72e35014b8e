//! Carina Core
//!
//! Resource model, provider trait and state waiter shared by Carina providers

pub mod differ;
pub mod provider;
pub mod resource;
pub mod wait;
