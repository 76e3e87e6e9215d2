//! # scripref
//!
//! Recognizes, disambiguates and validates scripture references such as
//! `Mat 1:2–3:4; 5:6` embedded in translated text, where the separators between
//! books, chapters and verses are configured per project and may collide.
//!
//! Start from [`scripture::load_defaults`] or a [`scripture::Loader`], then build
//! a [`scripture::ScriptureReferenceChecker`] (or just the
//! [`scripture::ScriptureReferenceBuilder`] to parse and format).

pub mod scripture;
