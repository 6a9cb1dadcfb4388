pub use self::{position::*, vision::*};

pub(crate) mod position;
pub(crate) mod vision;
