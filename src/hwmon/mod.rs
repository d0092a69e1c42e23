/// Monitoring-framework surface: one chip channel (register-based thermal
/// zone) and one temperature channel with input, four limits and four
/// latched alarms. Mirrors the usual hwmon ops triple: visibility query,
/// read entry point, write entry point.

use std::fmt;

use crate::Error;
use crate::Result;
use crate::smbus::SmbusTransport;
use crate::spd5118::Spd5118;
use crate::spd5118::regs::{
	Alarm,
	REG_TEMP,
	REG_TEMP_CRIT,
	REG_TEMP_LCRIT,
	REG_TEMP_MAX,
	REG_TEMP_MIN,
	TempReg,
};

/// Write-enable switches, fixed at process start. Thresholds and alarm
/// clears are refused (not hidden, still readable) unless enabled here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct HwmonConfig {
	pub enable_temp_write: bool,
	pub enable_alarm_write: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SensorType {
	Chip,
	Temp,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TempAttr {
	Input,
	Min,
	Max,
	Crit,
	Lcrit,
	MinAlarm,
	MaxAlarm,
	CritAlarm,
	LcritAlarm,
}

impl TempAttr {
	pub const ALL: [TempAttr; 9] = [
		TempAttr::Input,
		TempAttr::Min,
		TempAttr::Max,
		TempAttr::Crit,
		TempAttr::Lcrit,
		TempAttr::MinAlarm,
		TempAttr::MaxAlarm,
		TempAttr::CritAlarm,
		TempAttr::LcritAlarm,
	];

	/// Register holding this attribute's temperature value, if it is a
	/// temperature value.
	fn temp_register(self) -> Option<u8> {
		match self {
			TempAttr::Input => Some(REG_TEMP),
			TempAttr::Min => Some(REG_TEMP_MIN),
			TempAttr::Max => Some(REG_TEMP_MAX),
			TempAttr::Crit => Some(REG_TEMP_CRIT),
			TempAttr::Lcrit => Some(REG_TEMP_LCRIT),
			_ => None,
		}
	}

	fn is_limit(self) -> bool {
		match self {
			TempAttr::Min | TempAttr::Max | TempAttr::Crit | TempAttr::Lcrit => true,
			_ => false,
		}
	}

	/// The latched alarm behind this attribute, if it is an alarm.
	/// Min maps to the LOW flag, Max to HIGH.
	fn alarm(self) -> Option<Alarm> {
		match self {
			TempAttr::MinAlarm => Some(Alarm::Low),
			TempAttr::MaxAlarm => Some(Alarm::High),
			TempAttr::CritAlarm => Some(Alarm::Crit),
			TempAttr::LcritAlarm => Some(Alarm::Lcrit),
			_ => None,
		}
	}
}

impl fmt::Display for TempAttr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			TempAttr::Input => "temp1_input",
			TempAttr::Min => "temp1_min",
			TempAttr::Max => "temp1_max",
			TempAttr::Crit => "temp1_crit",
			TempAttr::Lcrit => "temp1_lcrit",
			TempAttr::MinAlarm => "temp1_min_alarm",
			TempAttr::MaxAlarm => "temp1_max_alarm",
			TempAttr::CritAlarm => "temp1_crit_alarm",
			TempAttr::LcritAlarm => "temp1_lcrit_alarm",
		};
		f.write_str(name)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Access {
	None,
	ReadOnly,
	ReadWrite,
}

/// What this driver registers with the framework.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChannelInfo {
	/// Chip-level capability: readings are usable as a thermal zone.
	Chip { register_tz: bool },
	Temp { attrs: &'static [TempAttr] },
}

pub const CHANNEL_INFO: [ChannelInfo; 2] = [
	ChannelInfo::Chip { register_tz: true },
	ChannelInfo::Temp { attrs: &TempAttr::ALL },
];

/// Attribute access without touching the bus: a pure function of the
/// attribute and the write-enable configuration.
pub fn visibility(config: HwmonConfig, sensor: SensorType, attr: TempAttr) -> Access {
	if sensor != SensorType::Temp {
		return Access::None;
	}

	match attr {
		TempAttr::Input => Access::ReadOnly,
		a if a.is_limit() => {
			if config.enable_temp_write {
				Access::ReadWrite
			} else {
				Access::ReadOnly
			}
		}
		_ => {
			// alarms
			if config.enable_alarm_write {
				Access::ReadWrite
			} else {
				Access::ReadOnly
			}
		}
	}
}

/// The ops table the monitoring framework drives.
pub trait HwmonDevice {
	fn visibility(&self, sensor: SensorType, attr: TempAttr) -> Access;

	/// Temperatures in millicelsius, alarms as 0/1.
	fn read(&self, sensor: SensorType, attr: TempAttr) -> Result<i64>;

	fn write(&self, sensor: SensorType, attr: TempAttr, value: i64) -> Result<()>;
}

impl<B: SmbusTransport> HwmonDevice for Spd5118<B> {
	fn visibility(&self, sensor: SensorType, attr: TempAttr) -> Access {
		visibility(self.config(), sensor, attr)
	}

	fn read(&self, sensor: SensorType, attr: TempAttr) -> Result<i64> {
		if sensor != SensorType::Temp {
			return Err(Error::NotSupported);
		}

		if let Some(reg) = attr.temp_register() {
			return Ok(self.read_temp_register(reg)?.millicelsius() as i64);
		}
		if let Some(alarm) = attr.alarm() {
			return Ok(self.read_alarm_status()?.is_set(alarm) as i64);
		}

		Err(Error::NotSupported)
	}

	fn write(&self, sensor: SensorType, attr: TempAttr, value: i64) -> Result<()> {
		if sensor != SensorType::Temp {
			return Err(Error::NotSupported);
		}

		if attr.is_limit() {
			if !self.config().enable_temp_write {
				return Err(Error::NotSupported);
			}
			let reg = attr.temp_register().ok_or(Error::NotSupported)?;
			let clamped = value.max(i64::from(i32::min_value())).min(i64::from(i32::max_value()));
			return self.write_temp_register(reg, TempReg::from_millicelsius(clamped as i32));
		}

		if let Some(alarm) = attr.alarm() {
			// alarms are hardware-latched: software may only clear them
			if value != 0 {
				return Err(Error::InvalidValue);
			}
			if !self.config().enable_alarm_write {
				return Err(Error::NotSupported);
			}
			return self.clear_alarm(alarm);
		}

		Err(Error::NotSupported)
	}
}
