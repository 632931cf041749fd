//! User facing errors for bindle.
mod code_frame;
mod code_highlight;
mod diagnostic;
mod diagnostics;
pub mod error_kind;

pub use self::code_frame::*;
pub use self::code_highlight::*;
pub use self::diagnostic::*;
pub use self::diagnostics::*;
pub use self::error_kind::*;
