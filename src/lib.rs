//! CaseDesk: a law-firm case and matter tracker on an embedded database.
//!
//! The domain rules live in [`legal`], persistence behind the [`db::Database`]
//! trait, install-lifecycle behavior in [`hooks`], and configuration in
//! [`settings`] + [`config`].

pub mod config;
pub mod db;
pub mod error;
pub mod hooks;
pub mod legal;
pub mod settings;
