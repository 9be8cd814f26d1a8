mod las_reader;
pub use self::las_reader::*;

mod las_writer;
pub use self::las_writer::*;
