//! # Product Canvas
//!
//! Reframes product photographs shot against a seamless light backdrop.
//! Every operation reads one image, computes a new one in memory, and writes
//! it in a single step; a failed run leaves no output behind.
//!
//! ```text
//! extend   subject rows → padded region → trimmed or backdrop-filled canvas
//! crop     rectangle → scaled → centered on a black canvas
//! matte    whole image → fitted inside padding → centered on a solid canvas
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel work: threshold estimation, foreground bounds, the three operations, encode/decode |
//! | [`config`] | `canvas.toml` loading, merging with stock defaults, validation |
//! | [`batch`] | JSON job files run in parallel with per-job progress events |
//! | [`output`] | CLI output formatting; pure functions returning lines |
//!
//! # Design Decisions
//!
//! ## Threshold From The Frame Edges
//!
//! The backdrop brightness is measured on narrow stripes at the top and bottom
//! center of the frame, where a centered product shot has nothing but backdrop.
//! The darker of the two means, less a small cushion and clamped to a sane
//! range, separates backdrop from subject. An explicit threshold skips the
//! estimate entirely.
//!
//! ## Validation Before Pixels
//!
//! Every request is turned into a validated params struct before anything is
//! decoded. Bad arguments fail fast with a message naming the offending value,
//! and the output extension is checked before the input is even opened.
//!
//! ## Layered Defaults
//!
//! Built-in defaults, then `canvas.toml`, then command-line flags or batch job
//! fields. The imaging layer never reads configuration; callers fill the
//! request first.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
