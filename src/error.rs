use std::io;

/// Driver errors.
///
/// Bus failures are passed through unchanged; nothing here retries. A failed
/// operation never invalidates the device instance.
#[derive(Debug, Fail)]
pub enum Error {
	#[fail(display = "bus transaction failed: {}", _0)]
	Bus(#[cause] io::Error),

	/// Attribute/type combination not in the register map, or a write while
	/// the corresponding write-enable flag is off.
	#[fail(display = "operation not supported")]
	NotSupported,

	/// Value not acceptable for the target, e.g. trying to *set* a
	/// hardware-latched alarm.
	#[fail(display = "invalid value")]
	InvalidValue,

	/// Candidate address did not identify as an SPD5118. Only produced
	/// during detection, never at runtime.
	#[fail(display = "not an SPD5118 device")]
	NotDetected,
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Error::Bus(e)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
