/// SPD5118 register map and register value types.
///
/// Register offsets are MR numbers from JESD300-5B; multi-byte registers
/// read as SMBus words (low byte first).

use std::fmt;

pub const REG_TYPE: u8 = 0x00; // MR0:MR1
pub const REG_REVISION: u8 = 0x02; // MR2
pub const REG_VENDOR: u8 = 0x03; // MR3:MR4
pub const REG_PAGE: u8 = 0x0b; // MR11, I2C legacy mode / page select
pub const REG_TEMP_CLR: u8 = 0x13; // MR19
pub const REG_TEMP_MAX: u8 = 0x1c; // MR28:MR29
pub const REG_TEMP_MIN: u8 = 0x1e; // MR30:MR31
pub const REG_TEMP_CRIT: u8 = 0x20; // MR32:MR33
pub const REG_TEMP_LCRIT: u8 = 0x22; // MR34:MR35
pub const REG_TEMP: u8 = 0x31; // MR49:MR50
pub const REG_TEMP_STATUS: u8 = 0x33; // MR51

/// Type signature, read with a byte-swapped word transaction.
pub const DEVICE_TYPE: u16 = 0x5118;

pub const NUM_PAGES: usize = 8;
pub const PAGE_SIZE: usize = 128;
pub const PAGE_SHIFT: usize = 7;
pub const EEPROM_BASE: u8 = 0x80;
pub const EEPROM_SIZE: usize = NUM_PAGES * PAGE_SIZE;

/// One temperature step in millicelsius (hardware LSB is 0.25 °C)
pub const TEMP_UNIT: i32 = 1000 / 4;
/// Representable range in millicelsius
pub const TEMP_RANGE_MIN: i32 = -256_000;
pub const TEMP_RANGE_MAX: i32 = 255_750;

/// Raw temperature register: bits [15:2] hold an 11-bit two's-complement
/// count of 0.25 °C steps, bits [1:0] are reserved.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TempReg(pub u16);

impl TempReg {
	pub fn millicelsius(self) -> i32 {
		let field = (self.0 >> 2) & 0x7ff;
		// sign-extend from bit 10
		let steps = ((field << 5) as i16) >> 5;
		steps as i32 * TEMP_UNIT
	}

	pub fn from_millicelsius(mc: i32) -> TempReg {
		let mc = mc.max(TEMP_RANGE_MIN).min(TEMP_RANGE_MAX);
		// truncation toward zero is fine, the value is clamped already
		TempReg((((mc / TEMP_UNIT) as u16) & 0x7ff) << 2)
	}
}

impl fmt::Display for TempReg {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mc = self.millicelsius();
		let sign = if mc < 0 { "-" } else { "" };
		write!(f, "{}{}.{:03} C", sign, (mc / 1000).abs(), (mc % 1000).abs())
	}
}

/// JEP106 manufacturer field: low byte is the continuation-prefix count,
/// high byte the manufacturer id, both with odd parity in bit 7.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VendorId(pub u16);

impl VendorId {
	pub fn is_valid(self) -> bool {
		let pfx = self.0 as u8;
		let id = (self.0 >> 8) as u8;
		if pfx.count_ones() & 1 == 0 || id.count_ones() & 1 == 0 {
			return false;
		}
		let id = id & 0x7f;
		// 0 is unassigned, 0x7f is the continuation code
		id != 0 && id != 0x7f
	}
}

impl fmt::Display for VendorId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let pfx = self.0 as u8 & 0x7f;
		let id = (self.0 >> 8) as u8 & 0x7f;
		for _ in 0..pfx {
			write!(f, "7F ")?;
		}
		write!(f, "{:02X}", id)
	}
}

/// MR2 device revision.
///
/// JESD300-5B: bits [5:4] major revision (displayed 1-based), bits [3:1]
/// minor revision 0..8 — the minor range doesn't fit three bits, probably a
/// typo in the standard; we extract exactly what it documents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Revision(pub u8);

impl Revision {
	pub fn major(self) -> u8 {
		1 + ((self.0 >> 4) & 3)
	}

	pub fn minor(self) -> u8 {
		(self.0 >> 1) & 7
	}
}

impl fmt::Display for Revision {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}.{}", self.major(), self.minor())
	}
}

/// The four hardware-latched threshold alarms. Status and clear registers
/// use the same bit position per alarm.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Alarm {
	High,
	Low,
	Crit,
	Lcrit,
}

impl Alarm {
	pub const ALL: [Alarm; 4] = [Alarm::High, Alarm::Low, Alarm::Crit, Alarm::Lcrit];

	pub fn mask(self) -> u8 {
		match self {
			Alarm::High => 1 << 0,
			Alarm::Low => 1 << 1,
			Alarm::Crit => 1 << 2,
			Alarm::Lcrit => 1 << 3,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlarmStatus(pub u8);

impl AlarmStatus {
	pub fn is_set(self, alarm: Alarm) -> bool {
		0 != self.0 & alarm.mask()
	}
}

impl fmt::Debug for AlarmStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} (", self.0)?;
		if self.is_set(Alarm::High) { write!(f, " [HIGH]")?; }
		if self.is_set(Alarm::Low) { write!(f, " [LOW]")?; }
		if self.is_set(Alarm::Crit) { write!(f, " [CRIT]")?; }
		if self.is_set(Alarm::Lcrit) { write!(f, " [LCRIT]")?; }
		write!(f, " )")
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn check_decode(raw: u16, mc: i32) {
		assert_eq!(TempReg(raw).millicelsius(), mc, "decoding 0x{:04x}", raw);
	}

	fn check_encode(mc: i32, raw: u16) {
		assert_eq!(TempReg::from_millicelsius(mc).0, raw, "encoding {} mC", mc);
	}

	#[test]
	fn temp_decode() {
		check_decode(0x0000, 0);
		check_decode(0x0004, 250); // one step
		check_decode(0x0190, 25_000); // 25 °C
		check_decode(0x1ffc, -250);
		check_decode(0x0ffc, 255_750); // largest positive
		check_decode(0x1000, -256_000); // most negative
		// reserved low bits are ignored
		check_decode(0x0193, 25_000);
		// bits above the 11-bit field are ignored
		check_decode(0x8190, 25_000);
		check_decode(0xe004, 250);
	}

	#[test]
	fn temp_decode_range_and_step() {
		for field in 0u16..0x800 {
			let mc = TempReg(field << 2).millicelsius();
			assert!(mc >= TEMP_RANGE_MIN && mc <= TEMP_RANGE_MAX, "0x{:03x} decoded to {}", field, mc);
			assert_eq!(mc % TEMP_UNIT, 0, "0x{:03x} decoded off-step to {}", field, mc);
		}
	}

	#[test]
	fn temp_encode() {
		check_encode(0, 0x0000);
		check_encode(250, 0x0004);
		check_encode(25_000, 0x0190);
		check_encode(-250, 0x1ffc);
		check_encode(255_750, 0x0ffc);
		check_encode(-256_000, 0x1000);
	}

	#[test]
	fn temp_encode_clamps() {
		check_encode(300_000, 0x0ffc);
		check_encode(i32::max_value(), 0x0ffc);
		check_encode(-300_000, 0x1000);
		check_encode(i32::min_value(), 0x1000);
	}

	#[test]
	fn temp_encode_truncates() {
		check_encode(25_100, 0x0190);
		check_encode(249, 0x0000);
		check_encode(-125, 0x0000);
		check_encode(-251, 0x1ffc);
	}

	#[test]
	fn temp_round_trip() {
		for field in 0u16..0x800 {
			let reg = TempReg(field << 2);
			let back = TempReg::from_millicelsius(reg.millicelsius());
			assert_eq!(back, reg, "round trip for field 0x{:03x}", field);
		}
	}

	fn check_vendor(reg: u16, valid: bool) {
		assert_eq!(VendorId(reg).is_valid(), valid, "vendor 0x{:04x}", reg);
	}

	#[test]
	fn vendor_validation() {
		// id 0x80 | 0x0c = odd-parity 0x8c? 0x8c has 3 bits -> odd. pfx 0x01 odd.
		check_vendor(0x8c01, true);
		check_vendor(0x0101, true); // id 0x01, pfx 0x01
		check_vendor(0xfe80, true); // id 0x7e with parity bit, pfx 0x80 (0 prefixes)
		// even parity in either byte
		check_vendor(0x0301, false);
		check_vendor(0x0103, false);
		check_vendor(0x0000, false);
		// masked id hits the reserved sentinels
		check_vendor(0x8001, false); // id & 0x7f == 0
		check_vendor(0x7f01, false); // id & 0x7f == 0x7f
		check_vendor(0xff01, false); // even parity and sentinel both
	}

	#[test]
	fn vendor_display() {
		assert_eq!(VendorId(0x8502).to_string(), "7F 7F 05");
		assert_eq!(VendorId(0x0180).to_string(), "01");
		assert_eq!(VendorId(0xce01).to_string(), "7F 4E");
	}

	#[test]
	fn revision_display() {
		assert_eq!(Revision(0x00).to_string(), "1.0");
		assert_eq!(Revision(0x12).to_string(), "2.1");
		assert_eq!(Revision(0x3e).to_string(), "4.7");
		// bits outside [5:1] don't contribute
		assert_eq!(Revision(0xc1).to_string(), "1.0");
	}

	#[test]
	fn alarm_bits() {
		let st = AlarmStatus(0b0101);
		assert!(st.is_set(Alarm::High));
		assert!(!st.is_set(Alarm::Low));
		assert!(st.is_set(Alarm::Crit));
		assert!(!st.is_set(Alarm::Lcrit));
	}
}
