//! # Route Module
//!
//! Turns framework route addresses into the hosting platform's path syntax.
//!
//! ```text
//! "GET /users/:id/files/*"
//!     └─ parse_address ─→ verb: get, path: /users/:id/files/*
//!                            └─ translate_path ─→ /users/{id}/files/{0+}
//!                                                 params: [id, 0]
//! ```
//!
//! Action identifiers become function names through [`camel_case`]:
//! `user/find` → `userFind`.

mod address;
mod naming;
mod path;


pub use address::{parse_address, ParsedAddress, Verb};
pub use naming::{camel_case, split_words};
pub use path::{translate_path, TranslatedPath, WILDCARD_PARAM};
