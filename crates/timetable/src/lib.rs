//! Course selection planner: catalog filtering, a conflict-free selection
//! set with persistence, timetable views and a local JSON API.

pub mod catalog;
pub mod config;
pub mod db;
pub mod planner;
pub mod render;
pub mod schedule;
pub mod server;
pub mod types;
