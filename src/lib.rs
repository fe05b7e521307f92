//! School Gradebook
//!
//! A role-based gradebook web application built on Actix Web: students read
//! their grades, teachers enter grades and review class statistics, admins
//! manage users, subjects and teacher assignments.
//!
//! # Layout
//! - `cache`: object cache backends (Moka/Redis) holding sessions
//! - `charts`: SVG bar charts embedded in dashboards
//! - `config`: configuration
//! - `entity`: SeaORM entities
//! - `errors`: unified error type
//! - `grading`: weighted averages, ranking, median and mode
//! - `middlewares`: session, role and rate-limit middlewares
//! - `models`: forms, domain types and view models
//! - `routes`: HTTP routes
//! - `runtime`: startup and shutdown
//! - `services`: request workflows
//! - `session`: login sessions and the request principal
//! - `storage`: persistence (SeaORM)
//! - `utils`: password hashing and input validation
//! - `views`: template rendering and flash messages

pub mod cache;
pub mod charts;
pub mod config;
pub mod entity;
pub mod errors;
pub mod grading;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
pub mod views;
