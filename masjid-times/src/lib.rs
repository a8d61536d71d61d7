//! Prayer times for a place of worship.
//!
//! Scrapes the timetable a place publishes on its public page, caches it,
//! and combines today's times, iqama offsets and a daily devotional text
//! into one display-ready view.

pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod devotional;
pub mod domain;
pub mod error;
pub mod source;
pub mod web;
