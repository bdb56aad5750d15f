//! GoogScope - static analyzer for Closure-style namespace dependencies.
//!
//! This crate extracts the namespaces a JavaScript file actually uses,
//! compares them against its `goog.provide`/`goog.require`/`goog.module`
//! declarations, and reports missing requires, obsolete requires and
//! duplicate declarations. It also flags constructs the Closure compiler
//! cannot type-check: bracket access with a constant string key, `@param`
//! annotations with a missing or trailing type, and undocumented class
//! methods.

pub mod extract;
pub mod fix;
pub mod namespace;
pub mod project;
pub mod report;
pub mod validate;
