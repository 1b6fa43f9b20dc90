pub mod address;
pub mod errors;
pub mod public_key;

pub use address::{Address, ADDRESS_SIZE};
pub use errors::AddressError;
pub use public_key::{PublicKey, MAX_SIGNATURE_SIZE, PUBLIC_KEY_SIZE};
