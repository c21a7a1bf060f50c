use std::io;

/// Rebuilds a value from its wire representation, possibly borrowing from `buf`.
pub trait Deserialize<'a>: Sized {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}
