/// Row identifier. Tables use `SERIAL` primary keys.
pub type Id = i32;
