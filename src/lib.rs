//! ydisk_web - minimal web front-end for a Yandex Disk account
//!
//! Lists, uploads, deletes, and renames files through the Yandex Disk REST API,
//! reporting outcomes with one-shot flash messages.

pub mod api;
pub mod config;
pub mod paths;
pub mod session;
pub mod storage;
pub mod types;
