pub mod flow;
pub mod indicators;
pub mod learning;
pub mod market;
pub mod pattern;
pub mod recommendation;
pub mod signals;

pub use flow::*;
pub use indicators::*;
pub use learning::*;
pub use market::*;
pub use pattern::*;
pub use recommendation::*;
pub use signals::*;
