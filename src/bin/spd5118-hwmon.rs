#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate spd5118_hwmon;
use spd5118_hwmon::*;

use std::io::{
	self,
	Write,
};
use std::process::exit;

use spd5118_hwmon::hwmon::{
	Access,
	HwmonConfig,
	HwmonDevice,
	SensorType,
	TempAttr,
};
use spd5118_hwmon::smbus::BusAddress;
use spd5118_hwmon::spd5118::Spd5118;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn limit_attr(name: &str) -> AResult<TempAttr> {
	match name {
		"min" => Ok(TempAttr::Min),
		"max" => Ok(TempAttr::Max),
		"crit" => Ok(TempAttr::Crit),
		"lcrit" => Ok(TempAttr::Lcrit),
		_ => bail!("unknown limit {:?} (use min, max, crit or lcrit)", name),
	}
}

fn alarm_attr(name: &str) -> AResult<TempAttr> {
	match name {
		"min" => Ok(TempAttr::MinAlarm),
		"max" => Ok(TempAttr::MaxAlarm),
		"crit" => Ok(TempAttr::CritAlarm),
		"lcrit" => Ok(TempAttr::LcritAlarm),
		_ => bail!("unknown alarm {:?} (use min, max, crit or lcrit)", name),
	}
}

fn open_chip(addr: BusAddress, config: HwmonConfig) -> AResult<Spd5118<smbus::I2cDev>> {
	let mut bus = smbus::open_device(addr)?;
	spd5118::detect(&mut bus)?;
	Ok(Spd5118::probe(bus, config)?)
}

fn list(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let bus: u32 = get_param(sub_m, "BUS")?;

	for &address in spd5118::SCAN_ADDRESSES.iter() {
		let addr = BusAddress { bus, address };
		let mut dev = match smbus::open_device(addr) {
			Ok(dev) => dev,
			Err(e) => {
				warn!("{}: can't open: {}", addr, e);
				continue;
			}
		};
		if spd5118::detect(&mut dev).is_err() {
			continue;
		}
		match Spd5118::probe(dev, config) {
			Ok(chip) => {
				println!("{} rev {} vendor {}", addr, chip.revision(), chip.vendor_id());
			}
			Err(e) => warn!("{}: detected but probe failed: {}", addr, e),
		}
	}

	Ok(())
}

fn info(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let addr: BusAddress = get_param(sub_m, "DEVICE")?;
	let dev = open_chip(addr, config)?;

	println!("revision: {}", dev.revision());
	println!("pmic vendor id: {}", dev.vendor_id());

	for attr in TempAttr::ALL.iter().cloned() {
		let access = match dev.visibility(SensorType::Temp, attr) {
			Access::None => continue,
			Access::ReadOnly => "ro",
			Access::ReadWrite => "rw",
		};
		let value = dev.read(SensorType::Temp, attr)?;
		match attr {
			TempAttr::MinAlarm | TempAttr::MaxAlarm | TempAttr::CritAlarm | TempAttr::LcritAlarm => {
				println!("{}: {} ({})", attr, value, access);
			}
			_ => {
				println!("{}: {} mC ({})", attr, value, access);
			}
		}
	}

	Ok(())
}

fn dump_eeprom(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let addr: BusAddress = get_param(sub_m, "DEVICE")?;
	let dev = open_chip(addr, config)?;

	let mut data = vec![0u8; spd5118::EEPROM_SIZE];
	dev.eeprom_read(0, &mut data)?;
	io::stdout().write_all(&data)?;

	Ok(())
}

fn set_limit(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let addr: BusAddress = get_param(sub_m, "DEVICE")?;
	let attr = limit_attr(sub_m.value_of("LIMIT").unwrap_or(""))?;
	let millicelsius: i64 = get_param(sub_m, "MILLICELSIUS")?;

	let dev = open_chip(addr, config)?;
	dev.write(SensorType::Temp, attr, millicelsius)?;
	info!("{}: set {} to {} mC", addr, attr, millicelsius);

	Ok(())
}

fn clear_alarm(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let addr: BusAddress = get_param(sub_m, "DEVICE")?;
	let attr = alarm_attr(sub_m.value_of("ALARM").unwrap_or(""))?;

	let dev = open_chip(addr, config)?;
	dev.write(SensorType::Temp, attr, 0)?;
	info!("{}: cleared {}", addr, attr);

	Ok(())
}

fn clear_alarms(sub_m: &clap::ArgMatches, config: HwmonConfig) -> AResult<()> {
	let addr: BusAddress = get_param(sub_m, "DEVICE")?;
	let dev = open_chip(addr, config)?;

	for attr in [TempAttr::MinAlarm, TempAttr::MaxAlarm, TempAttr::CritAlarm, TempAttr::LcritAlarm].iter().cloned() {
		dev.write(SensorType::Temp, attr, 0)?;
	}
	info!("{}: cleared all alarms", addr);

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg enable_temp_write: --("enable-temp-write") "Allow setting temperature thresholds")
		(@arg enable_alarm_write: --("enable-alarm-write") "Allow clearing temperature alarms")
		(@subcommand list =>
			(about: "scan an i2c bus for SPD5118 devices")
			(@arg BUS: +required "i2c bus number (/dev/i2c-N)")
		)
		(@subcommand info =>
			(about: "show identity, temperatures and alarms")
			(@arg DEVICE: +required "device to use (BUS:ADDR, e.g. 1:0x51)")
		)
		(@subcommand dump_eeprom =>
			(about: "dump the 1024-byte SPD EEPROM as binary to stdout")
			(@arg DEVICE: +required "device to use (BUS:ADDR, e.g. 1:0x51)")
		)
		(@subcommand set_limit =>
			(about: "set a temperature threshold (needs --enable-temp-write)")
			(@arg DEVICE: +required "device to use (BUS:ADDR, e.g. 1:0x51)")
			(@arg LIMIT: +required "threshold: min, max, crit or lcrit")
			(@arg MILLICELSIUS: +required "threshold value in millicelsius")
		)
		(@subcommand clear_alarm =>
			(about: "clear one latched alarm (needs --enable-alarm-write)")
			(@arg DEVICE: +required "device to use (BUS:ADDR, e.g. 1:0x51)")
			(@arg ALARM: +required "alarm: min, max, crit or lcrit")
		)
		(@subcommand clear_alarms =>
			(about: "clear all latched alarms (needs --enable-alarm-write)")
			(@arg DEVICE: +required "device to use (BUS:ADDR, e.g. 1:0x51)")
		)
	).get_matches();

	let config = HwmonConfig {
		enable_temp_write: matches.is_present("enable_temp_write"),
		enable_alarm_write: matches.is_present("enable_alarm_write"),
	};

	match matches.subcommand() {
		("list", Some(sub_m)) => {
			list(sub_m, config)
		}
		("info", Some(sub_m)) => {
			info(sub_m, config)
		}
		("dump_eeprom", Some(sub_m)) => {
			dump_eeprom(sub_m, config)
		}
		("set_limit", Some(sub_m)) => {
			set_limit(sub_m, config)
		}
		("clear_alarm", Some(sub_m)) => {
			clear_alarm(sub_m, config)
		}
		("clear_alarms", Some(sub_m)) => {
			clear_alarms(sub_m, config)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
