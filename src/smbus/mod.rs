/// SMBus-style register transport
///
/// The SPD5118 sits on an SMBus; every interaction is a byte/word/block data
/// transaction addressed by an 8-bit register. The trait below is the seam
/// between the driver core and the actual bus: the Linux i2c-dev backend
/// lives in `linux`, tests plug in a mock chip.

mod transport;

pub mod linux;

#[cfg(test)]
pub(crate) mod mock;

pub use self::transport::{
	Functionality,
	SmbusTransport,
};

pub use self::linux::{
	BusAddress,
	I2cDev,
	open_device,
};
