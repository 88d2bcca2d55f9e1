#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::StoreFairing;
use crate::logging::LoggerFairing;
use crate::store::Stores;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

/// Build the server, with stores chosen by the runtime configuration.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(StoreFairing)
        .attach(LoggerFairing)
}

/// Build the server around the given stores, skipping store configuration.
pub fn rocket_for_stores(stores: Stores) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .manage(stores)
        .attach(LoggerFairing)
}
