//! # volunteer-hub
//!
//! Headless client core for the volunteer matching platform.
//!
//! This crate contains the session and notification stores, the navigation
//! table, local storage, and the adapters that talk to the hosted auth and
//! realtime-database backend. Rendering is left to whatever view layer
//! subscribes to the store.

pub mod app;
pub mod config;
pub mod remote;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;
