//! # Handler Module
//!
//! Builds the entry-point modules placed under `functions/`.
//!
//! Each deployable unit gets a small JS module that wraps the target action
//! with the runtime wrapper, wiring in bootstrap and teardown steps and the
//! resolved CORS setting:
//!
//! ```text
//! require('babel-polyfill');
//! module.exports.fn = require('baggywrinkle')(require('../../api/controllers/user/find.js'),
//!   { bootstrap: [...], teardown: [...], cors: {...} });
//! ```
//!
//! A [`HandlerPlan`] describes the module as data; rendering goes through
//! askama templates in `templates/`. The bootstrap files themselves
//! (`initialize-orm.js`, `initialize-helpers.js`) are rendered here too.

mod plan;
mod templates;

#[cfg(test)]
mod tests;

pub use plan::{
    relative_require, BootstrapStep, CorsLiteral, HandlerOption, HandlerPlan, HandlerSupport,
    TeardownStep, HELPERS_BOOTSTRAP_FILE, ORM_BOOTSTRAP_FILE,
};
pub use templates::{render_helpers_bootstrap, render_orm_bootstrap};
