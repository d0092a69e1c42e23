#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub type AResult<T> = std::result::Result<T, failure::Error>;

mod error;

pub mod hwmon;
pub mod smbus;
pub mod spd5118;

pub use self::error::{
	Error,
	Result,
};
