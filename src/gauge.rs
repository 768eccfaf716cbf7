//! Typed addressing over the link: (channel, parameter) reads and writes,
//! the controller identity block, and the per-channel sensor facade.

use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::link::Link;
use crate::port::TransportError;
use crate::proto::command::Command;
use crate::proto::frame::Reply;

/// Controller-scoped parameters ride on this pseudo-channel.
const CONTROLLER_CHANNEL: u16 = 0;

/// Status payload the instrument answers accepted writes with.
const WRITE_OK: &str = "0";

/// Well-known parameter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Hardware/software version.
    Version,
    SerialNumber,
    PartNumber,
    /// Sensor type of a measurement channel.
    SensorType,
    /// Display name of a measurement channel.
    Name,
    /// Unit the controller displays and reports readings in.
    DisplayUnit,
    /// Number of measurement channels fitted.
    ChannelCount,
    /// Live reading of a measurement channel.
    Reading,
}

impl Parameter {
    pub fn code(self) -> u16 {
        match self {
            Parameter::Version => 1,
            Parameter::SerialNumber => 2,
            Parameter::PartNumber => 3,
            Parameter::SensorType => 4,
            Parameter::Name => 5,
            Parameter::DisplayUnit => 6,
            Parameter::ChannelCount => 8,
            Parameter::Reading => 29,
        }
    }
}

/// What a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Controller,
    Channel(u16),
}

impl Target {
    fn channel(self) -> u16 {
        match self {
            Target::Controller => CONTROLLER_CHANNEL,
            Target::Channel(n) => n,
        }
    }
}

/// Everything a transaction can fail with, one variant per failure class.
#[derive(Debug, Error)]
pub enum GaugeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The instrument negative-acknowledged the command.
    #[error("instrument refused command: {0:?}")]
    Refused(String),
    /// Response carried neither ACK nor NACK, or arrived truncated.
    #[error("malformed or missing response")]
    Malformed,
    /// A well-framed payload would not convert to the expected type.
    #[error("cannot parse {text:?} as {wanted}")]
    Decode { text: String, wanted: &'static str },
    /// Acknowledged, but with a payload other than the accepted-status.
    #[error("write not confirmed, instrument answered {0:?}")]
    WriteRejected(String),
    /// Outgoing values must stay in the single-byte wire charset.
    #[error("value {0:?} is not plain ASCII text")]
    InvalidValue(String),
}

/// Stateless addressing front end over a shared [`Link`].
///
/// Cheap to clone; any number of copies may drive the same link, their
/// transactions serialize there.
#[derive(Clone)]
pub struct Gauge {
    link: Arc<Link>,
}

impl Gauge {
    pub fn new(link: Arc<Link>) -> Self {
        Self { link }
    }

    /// Read a catalogued parameter, handing back the payload text.
    pub fn read(&self, target: Target, param: Parameter) -> Result<String, GaugeError> {
        self.read_raw(target.channel(), param.code())
    }

    /// Read an arbitrary (channel, code) pair. Escape hatch for parameters
    /// outside the catalogue.
    pub fn read_raw(&self, channel: u16, code: u16) -> Result<String, GaugeError> {
        let cmd = Command::read(format!("{channel};{code}"));
        match self.link.exchange(&cmd)? {
            Reply::Data(text) => Ok(text),
            Reply::Empty => Ok(String::new()),
            Reply::Nack(detail) => Err(GaugeError::Refused(detail)),
            Reply::Malformed => Err(GaugeError::Malformed),
        }
    }

    pub fn read_float(&self, target: Target, param: Parameter) -> Result<f64, GaugeError> {
        parse(self.read(target, param)?, "float")
    }

    pub fn read_int(&self, target: Target, param: Parameter) -> Result<i64, GaugeError> {
        parse(self.read(target, param)?, "integer")
    }

    /// Write a catalogued parameter.
    pub fn write(&self, target: Target, param: Parameter, value: &str) -> Result<(), GaugeError> {
        self.write_raw(target.channel(), param.code(), value)
    }

    /// Write an arbitrary (channel, code) pair.
    ///
    /// A bare ACK or the `"0"` status payload confirms the write; any other
    /// payload is a rejection, as is a NACK.
    pub fn write_raw(&self, channel: u16, code: u16, value: &str) -> Result<(), GaugeError> {
        if !value.is_ascii() {
            return Err(GaugeError::InvalidValue(value.to_string()));
        }
        let cmd = Command::write(format!("{channel};{code};{value}"));
        match self.link.exchange(&cmd)? {
            Reply::Empty => Ok(()),
            Reply::Data(status) if status == WRITE_OK => Ok(()),
            Reply::Data(status) => Err(GaugeError::WriteRejected(status)),
            Reply::Nack(detail) => Err(GaugeError::Refused(detail)),
            Reply::Malformed => Err(GaugeError::Malformed),
        }
    }
}

fn parse<T: FromStr>(text: String, wanted: &'static str) -> Result<T, GaugeError> {
    text.trim()
        .parse()
        .map_err(|_| GaugeError::Decode { text, wanted })
}

/// Identity block of the controller, read once at startup and passed around
/// by value afterwards. The channel count describes instrument topology and
/// is not re-read per transaction.
#[derive(Debug, Clone)]
pub struct ControllerInfo {
    pub version: String,
    pub serial_number: String,
    pub part_number: String,
    pub display_unit: String,
    pub channel_count: u16,
}

impl ControllerInfo {
    pub fn read(gauge: &Gauge) -> Result<Self, GaugeError> {
        let channels = gauge.read_int(Target::Controller, Parameter::ChannelCount)?;
        let info = Self {
            version: gauge.read(Target::Controller, Parameter::Version)?,
            serial_number: gauge.read(Target::Controller, Parameter::SerialNumber)?,
            part_number: gauge.read(Target::Controller, Parameter::PartNumber)?,
            display_unit: gauge.read(Target::Controller, Parameter::DisplayUnit)?,
            channel_count: u16::try_from(channels).map_err(|_| GaugeError::Decode {
                text: channels.to_string(),
                wanted: "channel count",
            })?,
        };
        info!(
            "controller {} (s/n {}), {} channels",
            info.part_number, info.serial_number, info.channel_count
        );
        Ok(info)
    }
}

/// One measurement channel bound to the shared link.
///
/// Sensor type and display name are fetched once when the value is built;
/// the live reading goes to the instrument every time.
pub struct Sensor {
    gauge: Gauge,
    channel: u16,
    sensor_type: String,
    name: String,
}

impl Sensor {
    pub fn init(gauge: Gauge, channel: u16) -> Result<Self, GaugeError> {
        let sensor_type = gauge.read(Target::Channel(channel), Parameter::SensorType)?;
        let name = gauge.read(Target::Channel(channel), Parameter::Name)?;
        debug!("channel {channel}: {name} ({sensor_type})");
        Ok(Self {
            gauge,
            channel,
            sensor_type,
            name,
        })
    }

    pub fn channel(&self) -> u16 {
        self.channel
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> &str {
        &self.sensor_type
    }

    /// Current reading, in the controller's display unit.
    pub fn pressure(&self) -> Result<f64, GaugeError> {
        self.gauge
            .read_float(Target::Channel(self.channel), Parameter::Reading)
    }

    /// Rename the channel on the instrument. The cached name follows only
    /// once the instrument confirms the write.
    pub fn set_name(&mut self, name: &str) -> Result<(), GaugeError> {
        self.gauge
            .write(Target::Channel(self.channel), Parameter::Name, name)?;
        self.name = name.to_string();
        Ok(())
    }
}
