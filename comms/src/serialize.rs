/// Turns a value into its wire representation.
pub trait Serialize<'a> {
    /// Writes the owned part of the representation into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer where the header and any owned bytes are written.
    ///
    /// # Returns
    /// An optional borrowed tail that is sent right after `buf` without copying.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}
