pub mod assertion;
pub mod canonicalize;
pub mod did;
pub mod envelope;
pub mod simulate;
