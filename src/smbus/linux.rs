/// Linux i2c-dev backend: SMBus data transactions through `/dev/i2c-N`.

use std::fmt;
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::str;

use libc::{
	c_int,
	c_ulong,
};

use super::{
	Functionality,
	SmbusTransport,
	transport::BLOCK_MAX,
};

// from <uapi/linux/i2c-dev.h>
const I2C_SLAVE: c_ulong = 0x0703;
const I2C_FUNCS: c_ulong = 0x0705;
const I2C_SMBUS: c_ulong = 0x0720;

// from <uapi/linux/i2c.h>
const I2C_SMBUS_READ: u8 = 1;
const I2C_SMBUS_WRITE: u8 = 0;

const I2C_SMBUS_BYTE_DATA: u32 = 2;
const I2C_SMBUS_WORD_DATA: u32 = 3;
const I2C_SMBUS_I2C_BLOCK_DATA: u32 = 8;

const I2C_FUNC_SMBUS_READ_BYTE_DATA: c_ulong = 0x0008_0000;
const I2C_FUNC_SMBUS_WRITE_BYTE_DATA: c_ulong = 0x0010_0000;
const I2C_FUNC_SMBUS_READ_WORD_DATA: c_ulong = 0x0020_0000;
const I2C_FUNC_SMBUS_WRITE_WORD_DATA: c_ulong = 0x0040_0000;
const I2C_FUNC_SMBUS_READ_I2C_BLOCK: c_ulong = 0x0400_0000;

// union i2c_smbus_data: largest member is block[I2C_SMBUS_BLOCK_MAX + 2]
#[repr(C)]
struct SmbusData {
	block: [u8; BLOCK_MAX + 2],
}

impl SmbusData {
	fn zeroed() -> Self {
		SmbusData {
			block: [0u8; BLOCK_MAX + 2],
		}
	}

	fn word(&self) -> u16 {
		// the kernel already converted from SMBus byte order to host order
		u16::from_ne_bytes([self.block[0], self.block[1]])
	}

	fn set_word(&mut self, data: u16) {
		let b = data.to_ne_bytes();
		self.block[0] = b[0];
		self.block[1] = b[1];
	}
}

#[repr(C)]
struct SmbusIoctlData {
	read_write: u8,
	command: u8,
	size: u32,
	data: *mut SmbusData,
}

/// A bus number and 7-bit device address, parsed from `BUS:ADDR`
/// (decimal bus, hex address), e.g. `1:0x51`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BusAddress {
	pub bus: u32,
	pub address: u16,
}

impl fmt::Display for BusAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}:0x{:02x}", self.bus, self.address)
	}
}

impl str::FromStr for BusAddress {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.split(':');
		let bus_s = parts.next().ok_or_else(|| format_err!("Need BUS:ADDR, got {:?}", s))?;
		let addr_s = parts.next().ok_or_else(|| format_err!("Need BUS:ADDR, got {:?}", s))?;
		ensure!(parts.next().is_none(), "At most one ':' in bus address: {:?}", s);

		let bus = bus_s.parse::<u32>()
			.map_err(|e| format_err!("invalid i2c bus number {:?}: {}", bus_s, e))?;

		let addr_hex = addr_s.trim_start_matches("0x");
		let address = u16::from_str_radix(addr_hex, 16)
			.map_err(|e| format_err!("invalid i2c address {:?}: {}", addr_s, e))?;

		// 7-bit addressing, 0x00..0x07 and 0x78..0x7f are reserved
		ensure!(address >= 0x08 && address <= 0x77, "i2c address out of range: 0x{:02x}", address);

		Ok(BusAddress {
			bus,
			address,
		})
	}
}

pub struct I2cDev {
	file: fs::File,
	address: BusAddress,
	functionality: Functionality,
}

fn ioctl_check(fd: c_int, request: c_ulong, arg: c_ulong) -> io::Result<()> {
	let res = unsafe { libc::ioctl(fd, request, arg) };
	if res < 0 {
		Err(io::Error::last_os_error())
	} else {
		Ok(())
	}
}

pub fn open_device(address: BusAddress) -> io::Result<I2cDev> {
	let path = format!("/dev/i2c-{}", address.bus);
	let file = fs::OpenOptions::new()
		.read(true)
		.write(true)
		.open(path)?;
	let fd = file.as_raw_fd();

	ioctl_check(fd, I2C_SLAVE, address.address as c_ulong)?;

	let mut funcs: c_ulong = 0;
	let res = unsafe { libc::ioctl(fd, I2C_FUNCS, &mut funcs as *mut c_ulong) };
	if res < 0 {
		return Err(io::Error::last_os_error());
	}

	let functionality = Functionality {
		byte_data: 0 != funcs & I2C_FUNC_SMBUS_READ_BYTE_DATA
			&& 0 != funcs & I2C_FUNC_SMBUS_WRITE_BYTE_DATA,
		word_data: 0 != funcs & I2C_FUNC_SMBUS_READ_WORD_DATA
			&& 0 != funcs & I2C_FUNC_SMBUS_WRITE_WORD_DATA,
		block_read: 0 != funcs & I2C_FUNC_SMBUS_READ_I2C_BLOCK,
	};

	Ok(I2cDev {
		file,
		address,
		functionality,
	})
}

impl I2cDev {
	pub fn address(&self) -> BusAddress {
		self.address
	}

	fn smbus_access(&self, read_write: u8, command: u8, size: u32, data: &mut SmbusData) -> io::Result<()> {
		let mut args = SmbusIoctlData {
			read_write,
			command,
			size,
			data: data as *mut SmbusData,
		};
		let res = unsafe {
			libc::ioctl(self.file.as_raw_fd(), I2C_SMBUS, &mut args as *mut SmbusIoctlData)
		};
		if res < 0 {
			Err(io::Error::last_os_error())
		} else {
			Ok(())
		}
	}
}

impl SmbusTransport for I2cDev {
	fn functionality(&self) -> Functionality {
		self.functionality
	}

	fn read_byte(&mut self, reg: u8) -> crate::Result<u8> {
		let mut data = SmbusData::zeroed();
		self.smbus_access(I2C_SMBUS_READ, reg, I2C_SMBUS_BYTE_DATA, &mut data)?;
		Ok(data.block[0])
	}

	fn write_byte(&mut self, reg: u8, value: u8) -> crate::Result<()> {
		let mut data = SmbusData::zeroed();
		data.block[0] = value;
		self.smbus_access(I2C_SMBUS_WRITE, reg, I2C_SMBUS_BYTE_DATA, &mut data)?;
		Ok(())
	}

	fn read_word(&mut self, reg: u8) -> crate::Result<u16> {
		let mut data = SmbusData::zeroed();
		self.smbus_access(I2C_SMBUS_READ, reg, I2C_SMBUS_WORD_DATA, &mut data)?;
		Ok(data.word())
	}

	fn write_word(&mut self, reg: u8, value: u16) -> crate::Result<()> {
		let mut data = SmbusData::zeroed();
		data.set_word(value);
		self.smbus_access(I2C_SMBUS_WRITE, reg, I2C_SMBUS_WORD_DATA, &mut data)?;
		Ok(())
	}

	fn read_block(&mut self, reg: u8, target: &mut [u8]) -> crate::Result<usize> {
		let count = target.len().min(BLOCK_MAX);
		let mut data = SmbusData::zeroed();
		data.block[0] = count as u8;
		self.smbus_access(I2C_SMBUS_READ, reg, I2C_SMBUS_I2C_BLOCK_DATA, &mut data)?;
		let transferred = (data.block[0] as usize).min(count);
		target[..transferred].copy_from_slice(&data.block[1..1 + transferred]);
		Ok(transferred)
	}
}

#[cfg(test)]
mod test {
	use super::BusAddress;

	fn check_addr(bus: u32, address: u16, repr: &str) {
		match repr.parse::<BusAddress>() {
			Err(e) => panic!("{} failed to parse as BusAddress: {}", repr, e),
			Ok(a) => assert_eq!(BusAddress { bus, address }, a, "failed validating parsed {}", repr),
		}
	}

	fn check_addr_canonical(bus: u32, address: u16, repr: &str) {
		check_addr(bus, address, repr);
		assert_eq!(BusAddress { bus, address }.to_string(), repr, "failed stringifying bus {} address 0x{:02x}", bus, address);
	}

	fn check_invalid_addr(repr: &str) {
		assert!(repr.parse::<BusAddress>().is_err(), "{:?} must not be a valid BUS:ADDR", repr);
	}

	#[test]
	fn parse_bus_address() {
		check_addr_canonical(0, 0x50, "0:0x50");
		check_addr_canonical(1, 0x51, "1:0x51");
		check_addr_canonical(12, 0x77, "12:0x77");
		check_addr_canonical(3, 0x08, "3:0x08");
		check_addr(1, 0x57, "1:57");
		check_invalid_addr("");
		check_invalid_addr("1");
		check_invalid_addr(":0x50");
		check_invalid_addr("1:");
		check_invalid_addr("1:0x50:2");
		check_invalid_addr("one:0x50");
		check_invalid_addr("1:0xgg");
		// reserved address ranges
		check_invalid_addr("1:0x00");
		check_invalid_addr("1:0x07");
		check_invalid_addr("1:0x78");
		check_invalid_addr("1:0xff");
	}
}
