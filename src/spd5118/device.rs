use std::io;
use std::sync::{
	Mutex,
	MutexGuard,
};

use crate::Error;
use crate::Result;
use crate::hwmon::HwmonConfig;
use crate::smbus::SmbusTransport;

use super::regs::{
	Alarm,
	AlarmStatus,
	DEVICE_TYPE,
	EEPROM_BASE,
	EEPROM_SIZE,
	PAGE_SHIFT,
	PAGE_SIZE,
	REG_PAGE,
	REG_REVISION,
	REG_TEMP_CLR,
	REG_TEMP_STATUS,
	REG_TYPE,
	REG_VENDOR,
	Revision,
	TempReg,
	VendorId,
};

struct BusState<B> {
	bus: B,
	/// Hardware page currently selected, `None` when unknown (forces a
	/// reselect on next EEPROM access).
	current_page: Option<u8>,
}

impl<B: SmbusTransport> BusState<B> {
	fn set_current_page(&mut self, page: u8) -> Result<()> {
		if self.current_page == Some(page) {
			return Ok(());
		}

		if let Err(e) = self.bus.write_byte(REG_PAGE, page) {
			// current_page stays as-is so a retry reissues the select
			error!("failed to select page {}: {}", page, e);
			return Err(e);
		}

		debug!("selected page {}", page);
		self.current_page = Some(page);
		Ok(())
	}

	/// One bus transaction worth of EEPROM data: select the page holding
	/// `offset`, then read up to the end of that page. Returns the number
	/// of bytes transferred.
	fn eeprom_read_chunk(&mut self, offset: usize, target: &mut [u8]) -> Result<usize> {
		let page = (offset >> PAGE_SHIFT) as u8;
		let intra = offset & (PAGE_SIZE - 1);

		self.set_current_page(page)?;

		// can't cross page boundaries
		let count = target.len().min(PAGE_SIZE - intra);
		self.bus.read_block_or_emulated(EEPROM_BASE + intra as u8, &mut target[..count])
	}
}

/// One attached SPD5118.
///
/// Identity fields are fixed at probe time; everything that touches the bus
/// serializes through one mutex. Page select and the windowed read behind it
/// are separate bus transactions, so without that lock a concurrent caller
/// could silently switch pages mid-read.
pub struct Spd5118<B> {
	state: Mutex<BusState<B>>,
	vendor: VendorId,
	revision: Revision,
	config: HwmonConfig,
}

impl<B: SmbusTransport> Spd5118<B> {
	/// Attach to a chip that already answered detection (or that the caller
	/// trusts to be one): verifies the type signature and captures the
	/// identity registers.
	pub fn probe(mut bus: B, config: HwmonConfig) -> Result<Spd5118<B>> {
		let typ = bus.read_word_swapped(REG_TYPE)?;
		if typ != DEVICE_TYPE {
			debug!("device type incorrect (0x{:04x})", typ);
			return Err(Error::NotDetected);
		}

		let revision = Revision(bus.read_byte(REG_REVISION)?);
		let vendor = VendorId(bus.read_word(REG_VENDOR)?);

		Ok(Spd5118 {
			state: Mutex::new(BusState {
				bus,
				current_page: None,
			}),
			vendor,
			revision,
			config,
		})
	}

	fn state(&self) -> MutexGuard<'_, BusState<B>> {
		// a panicked holder can't leave the page cache half-updated
		// (current_page only changes after a successful select), so a
		// poisoned lock is still usable
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	pub fn vendor_id(&self) -> VendorId {
		self.vendor
	}

	pub fn revision(&self) -> Revision {
		self.revision
	}

	pub fn config(&self) -> HwmonConfig {
		self.config
	}

	/// Forget the cached page, e.g. after something else may have touched
	/// the page-select register behind our back.
	pub fn invalidate_page_cache(&self) {
		self.state().current_page = None;
	}

	pub fn read_temp_register(&self, reg: u8) -> Result<TempReg> {
		let mut state = self.state();
		Ok(TempReg(state.bus.read_word(reg)?))
	}

	pub fn write_temp_register(&self, reg: u8, value: TempReg) -> Result<()> {
		let mut state = self.state();
		state.bus.write_word(reg, value.0)
	}

	pub fn read_alarm_status(&self) -> Result<AlarmStatus> {
		let mut state = self.state();
		Ok(AlarmStatus(state.bus.read_byte(REG_TEMP_STATUS)?))
	}

	/// Clear one latched alarm. Alarms are set by hardware only; this is
	/// the only software-side transition.
	pub fn clear_alarm(&self, alarm: Alarm) -> Result<()> {
		let mut state = self.state();
		state.bus.write_byte(REG_TEMP_CLR, alarm.mask())
	}

	/// Read from the flat 1024-byte EEPROM space. All-or-nothing: a bus
	/// error anywhere aborts the whole request. The lock is held across the
	/// entire request, not per chunk.
	pub fn eeprom_read(&self, offset: usize, target: &mut [u8]) -> Result<()> {
		if offset >= EEPROM_SIZE || target.len() > EEPROM_SIZE - offset {
			return Err(Error::InvalidValue);
		}

		let mut state = self.state();

		let mut done = 0;
		while done < target.len() {
			let transferred = state.eeprom_read_chunk(offset + done, &mut target[done..])?;
			if transferred == 0 {
				return Err(Error::Bus(io::Error::new(
					io::ErrorKind::UnexpectedEof,
					"bus transferred no data",
				)));
			}
			done += transferred;
		}

		Ok(())
	}
}
