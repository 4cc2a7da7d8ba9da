pub mod dashboard;
pub mod groups;
pub mod study;
pub mod words;

pub use dashboard::*;
pub use groups::*;
pub use study::*;
pub use words::*;
