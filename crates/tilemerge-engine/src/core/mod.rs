pub use self::{direction::*, grid::*};

pub(crate) mod direction;
pub(crate) mod grid;
