use crate::Result;

pub const BLOCK_MAX: usize = 32;

/// SMBus transaction kinds an adapter supports.
///
/// Checked during detection: the SPD5118 register protocol needs byte and
/// word data at minimum. Block reads are optional, `read_block_or_emulated`
/// falls back to per-byte reads without them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Functionality {
	pub byte_data: bool,
	pub word_data: bool,
	pub block_read: bool,
}

impl Functionality {
	pub fn supports_required(&self) -> bool {
		self.byte_data && self.word_data
	}
}

pub trait SmbusTransport {
	fn functionality(&self) -> Functionality;

	fn read_byte(&mut self, reg: u8) -> Result<u8>;
	fn write_byte(&mut self, reg: u8, data: u8) -> Result<()>;

	/// Word transactions are SMBus little-endian: low byte at `reg`,
	/// high byte at `reg + 1`.
	fn read_word(&mut self, reg: u8) -> Result<u16>;
	fn write_word(&mut self, reg: u8, data: u16) -> Result<()>;

	/// Byte-order-swapped word read; the SPD5118 type signature reads as
	/// 0x5118 this way.
	fn read_word_swapped(&mut self, reg: u8) -> Result<u16> {
		Ok(self.read_word(reg)?.swap_bytes())
	}

	/// Native block read. Returns the number of bytes transferred, at most
	/// `BLOCK_MAX` per transaction.
	fn read_block(&mut self, reg: u8, target: &mut [u8]) -> Result<usize>;

	fn read_block_or_emulated(&mut self, reg: u8, target: &mut [u8]) -> Result<usize> {
		if target.is_empty() {
			return Ok(0);
		}
		if self.functionality().block_read {
			let count = target.len().min(BLOCK_MAX);
			self.read_block(reg, &mut target[..count])
		} else {
			for (i, slot) in target.iter_mut().enumerate() {
				*slot = self.read_byte(reg.wrapping_add(i as u8))?;
			}
			Ok(target.len())
		}
	}
}

impl<'a, B: ?Sized + SmbusTransport> SmbusTransport for &'a mut B {
	fn functionality(&self) -> Functionality {
		B::functionality(*self)
	}

	fn read_byte(&mut self, reg: u8) -> Result<u8> {
		B::read_byte(*self, reg)
	}

	fn write_byte(&mut self, reg: u8, data: u8) -> Result<()> {
		B::write_byte(*self, reg, data)
	}

	fn read_word(&mut self, reg: u8) -> Result<u16> {
		B::read_word(*self, reg)
	}

	fn write_word(&mut self, reg: u8, data: u16) -> Result<()> {
		B::write_word(*self, reg, data)
	}

	fn read_word_swapped(&mut self, reg: u8) -> Result<u16> {
		B::read_word_swapped(*self, reg)
	}

	fn read_block(&mut self, reg: u8, target: &mut [u8]) -> Result<usize> {
		B::read_block(*self, reg, target)
	}

	fn read_block_or_emulated(&mut self, reg: u8, target: &mut [u8]) -> Result<usize> {
		B::read_block_or_emulated(*self, reg, target)
	}
}
