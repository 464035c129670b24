pub mod io_primitives;
pub mod util;
