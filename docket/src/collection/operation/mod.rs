mod find_optimizer;
mod index_writer;
mod read_operations;
mod write_operations;

pub(crate) use index_writer::*;
pub(crate) use read_operations::*;
pub(crate) use write_operations::*;
