//! Budgeted truncation of markdown-like text that never splits embedded
//! resources such as images, links or caller-defined spans.
//!
//! ```
//! use markcut::{Cutter, CutterConfig, Limits};
//!
//! let cutter = Cutter::new(CutterConfig::new().with_suffix("...")).unwrap();
//! let out = cutter.cut("see [the docs](https://example.com) for more", &Limits::empty().with_text(6));
//! assert_eq!(out, "see [th...](https://example.com)");
//! ```

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(warnings)] // Tous les warnings sont traités comme des erreurs
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute fonction, struct, enum ou module public doit être documenté
#![deny(dead_code)] // Le code inutilisé est interdit
#![deny(non_camel_case_types)]
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy pour stricte discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)] // Active les lints expérimentales
#![deny(clippy::unwrap_used)] // Interdit unwrap()
#![deny(clippy::expect_used)] // Interdit expect()
#![deny(clippy::panic)] // Interdit panic!()
#![deny(clippy::print_stdout)] // Interdit println!() en production
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)] // Force const lorsque possible
#![deny(clippy::unwrap_in_result)] // Interdit unwrap() sur Result
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)] // Interdit le shadowing de variables non liées
#![deny(clippy::cognitive_complexity)]
#![deny(overflowing_literals)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used))]

/// Resource-aware truncation engine.
#[allow(clippy::module_name_repetitions)]
pub mod cutter;

pub use cutter::{
    Cutter, CutterConfig, CutterError, CutterResult, CutterSettings, Dissection, Limits, Matcher,
    MatcherRegistry, Pattern, Report, Resource,
};
