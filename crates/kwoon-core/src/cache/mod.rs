//! Local caching module for offline data access.
//!
//! `CacheManager` stores the last fetched copy of each resource as JSON in
//! the user's cache directory. Data is considered stale after 60 minutes.
//!
//! Cached data types include:
//! - The signed-in user and dashboard stats
//! - The student profile and the student's own school
//! - Schools, students, users, enrollments
//! - Lessons, events, grade requirements
//! - Products, service requests, media, mail logs

pub mod manager;

pub use manager::{CacheAges, CachedData, CacheManager};
