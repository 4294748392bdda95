pub mod money;
pub mod line_item;
pub mod order;

pub use money::*;
pub use line_item::*;
pub use order::*;
