mod decorators;
mod dnd;
mod renderer;
mod view;

pub use decorators::*;
pub use dnd::*;
pub use renderer::*;
pub use view::*;
