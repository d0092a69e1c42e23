/// Mock SPD5118 chip for tests: a flat register file plus an EEPROM model
/// behind its own page latch, with a transaction log and injectable
/// failures. The handle is `Clone` so tests keep access after the device
/// takes ownership of the bus.

use std::io;
use std::sync::{
	Arc,
	Mutex,
};

use crate::spd5118::regs::{
	EEPROM_BASE,
	EEPROM_SIZE,
	PAGE_SHIFT,
	PAGE_SIZE,
	REG_PAGE,
	REG_REVISION,
	REG_TYPE,
	REG_VENDOR,
};

use super::{
	Functionality,
	SmbusTransport,
	transport::BLOCK_MAX,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Txn {
	ReadByte(u8),
	WriteByte(u8, u8),
	ReadWord(u8),
	WriteWord(u8, u16),
	ReadBlock(u8, usize),
}

pub struct MockState {
	pub regs: [u8; 0x80],
	pub eeprom: [u8; EEPROM_SIZE],
	pub page: u8,
	pub log: Vec<Txn>,
	pub functionality: Functionality,
	/// Cap on bytes per native block read (adapters may transfer less than
	/// asked for).
	pub block_limit: usize,
	pub fail_next_page_select: bool,
	pub fail_next_block_read: bool,
}

#[derive(Clone)]
pub struct MockChip(Arc<Mutex<MockState>>);

fn injected_failure(what: &str) -> crate::Error {
	crate::Error::Bus(io::Error::new(io::ErrorKind::Other, format!("injected {} failure", what)))
}

impl MockChip {
	pub fn new() -> MockChip {
		let mut regs = [0u8; 0x80];
		regs[REG_TYPE as usize] = 0x51;
		regs[REG_TYPE as usize + 1] = 0x18;
		regs[REG_REVISION as usize] = 0x12;
		regs[REG_VENDOR as usize] = 0x01; // one continuation prefix, odd parity
		regs[REG_VENDOR as usize + 1] = 0x8c;

		let mut eeprom = [0u8; EEPROM_SIZE];
		for (i, b) in eeprom.iter_mut().enumerate() {
			*b = (i * 7 + (i >> 8)) as u8;
		}

		MockChip(Arc::new(Mutex::new(MockState {
			regs,
			eeprom,
			page: 0,
			log: Vec::new(),
			functionality: Functionality {
				byte_data: true,
				word_data: true,
				block_read: true,
			},
			block_limit: BLOCK_MAX,
			fail_next_page_select: false,
			fail_next_block_read: false,
		})))
	}

	pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
		f(&mut self.0.lock().unwrap())
	}

	pub fn log(&self) -> Vec<Txn> {
		self.with(|s| s.log.clone())
	}

	pub fn clear_log(&self) {
		self.with(|s| s.log.clear());
	}

	pub fn page_selects(&self) -> usize {
		self.with(|s| {
			s.log.iter().filter(|t| match t {
				Txn::WriteByte(reg, _) => *reg == REG_PAGE,
				_ => false,
			}).count()
		})
	}

	pub fn expected_eeprom(&self, offset: usize, len: usize) -> Vec<u8> {
		self.with(|s| s.eeprom[offset..offset + len].to_vec())
	}
}

impl MockState {
	fn byte_at(&self, reg: u8) -> u8 {
		if reg >= EEPROM_BASE {
			let intra = (reg - EEPROM_BASE) as usize;
			self.eeprom[((self.page as usize) << PAGE_SHIFT) + (intra % PAGE_SIZE)]
		} else {
			self.regs[reg as usize]
		}
	}
}

impl SmbusTransport for MockChip {
	fn functionality(&self) -> Functionality {
		self.with(|s| s.functionality)
	}

	fn read_byte(&mut self, reg: u8) -> crate::Result<u8> {
		self.with(|s| {
			s.log.push(Txn::ReadByte(reg));
			Ok(s.byte_at(reg))
		})
	}

	fn write_byte(&mut self, reg: u8, data: u8) -> crate::Result<()> {
		self.with(|s| {
			s.log.push(Txn::WriteByte(reg, data));
			if reg == REG_PAGE {
				if s.fail_next_page_select {
					s.fail_next_page_select = false;
					return Err(injected_failure("page select"));
				}
				s.page = data & 7;
			}
			if reg < EEPROM_BASE {
				s.regs[reg as usize] = data;
			}
			Ok(())
		})
	}

	fn read_word(&mut self, reg: u8) -> crate::Result<u16> {
		self.with(|s| {
			s.log.push(Txn::ReadWord(reg));
			Ok(s.byte_at(reg) as u16 | (s.byte_at(reg.wrapping_add(1)) as u16) << 8)
		})
	}

	fn write_word(&mut self, reg: u8, data: u16) -> crate::Result<()> {
		self.with(|s| {
			s.log.push(Txn::WriteWord(reg, data));
			if reg < EEPROM_BASE {
				s.regs[reg as usize] = data as u8;
				s.regs[reg as usize + 1] = (data >> 8) as u8;
			}
			Ok(())
		})
	}

	fn read_block(&mut self, reg: u8, target: &mut [u8]) -> crate::Result<usize> {
		self.with(|s| {
			if s.fail_next_block_read {
				s.fail_next_block_read = false;
				s.log.push(Txn::ReadBlock(reg, 0));
				return Err(injected_failure("block read"));
			}
			let count = target.len().min(s.block_limit).min(BLOCK_MAX);
			s.log.push(Txn::ReadBlock(reg, count));
			for (i, slot) in target[..count].iter_mut().enumerate() {
				*slot = s.byte_at(reg.wrapping_add(i as u8));
			}
			Ok(count)
		})
	}
}
