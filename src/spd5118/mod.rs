mod device;
pub mod regs;

pub use self::device::Spd5118;

pub use self::regs::{
	Alarm,
	AlarmStatus,
	DEVICE_TYPE,
	EEPROM_SIZE,
	Revision,
	TempReg,
	VendorId,
};

use crate::Error;
use crate::Result;
use crate::smbus::SmbusTransport;

/// Bus addresses SPD5118 chips show up at (one per DIMM slot).
pub const SCAN_ADDRESSES: [u16; 8] = [0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57];

/// Check whether the device at the other end of `bus` is an SPD5118:
/// the adapter must do byte and word data, the type signature must read
/// back 0x5118 and the vendor field must be a well-formed JEP106 id
/// (which tells it apart from plain EEPROMs at the same addresses).
///
/// Bus errors count as "not this device" here; an absent chip simply
/// doesn't answer.
pub fn detect<B: SmbusTransport>(bus: &mut B) -> Result<()> {
	if !bus.functionality().supports_required() {
		return Err(Error::NotDetected);
	}

	match bus.read_word_swapped(regs::REG_TYPE) {
		Ok(DEVICE_TYPE) => (),
		Ok(typ) => {
			debug!("type signature mismatch: 0x{:04x}", typ);
			return Err(Error::NotDetected);
		}
		Err(e) => {
			debug!("type signature read failed: {}", e);
			return Err(Error::NotDetected);
		}
	}

	let vendor = match bus.read_word(regs::REG_VENDOR) {
		Ok(v) => VendorId(v),
		Err(e) => {
			debug!("vendor read failed: {}", e);
			return Err(Error::NotDetected);
		}
	};
	if !vendor.is_valid() {
		debug!("vendor id invalid: 0x{:04x}", vendor.0);
		return Err(Error::NotDetected);
	}

	Ok(())
}
