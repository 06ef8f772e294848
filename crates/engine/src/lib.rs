//! DigiSheet Engine library.
//!
//! Everything around the formula engines that touches the outside world or
//! holds open sheets.
//!
//! ## Structure
//!
//! - `use_cases/` - Sheet sessions, the tab host, and the saved sheet library
//! - `infrastructure/` - External dependency implementations (ports + adapters)

pub mod infrastructure;
pub mod use_cases;
