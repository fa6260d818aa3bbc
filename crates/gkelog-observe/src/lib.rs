mod logger;
pub use logger::*;

mod format;
pub use format::GkeFormat;
