// Identity module - Who is calling
// The ledger never authenticates; it only compares the supplied caller address
// against the stored creator address.

mod address;

pub use address::{Address, AddressError};
