use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use graphix_link::{
    ControllerInfo, Gauge, Link, LinkConfig, Parameter, Sensor, Target, open_port,
};

mod cli;

use cli::{Cli, Cmd, SerialOpts};

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    match args.cmd {
        Cmd::Info(opts) => info(opts),
        Cmd::Read(opts) => read(opts),
        Cmd::Write(opts) => write(opts),
        Cmd::Pressure(opts) => pressure(opts),
        Cmd::SetName(opts) => set_name(opts),
    }
}

fn connect(ser: &SerialOpts) -> Result<Gauge> {
    let port = open_port(&ser.dev, ser.baud)
        .with_context(|| format!("opening {} at {} baud", ser.dev, ser.baud))?;
    let config = LinkConfig {
        settle: Duration::from_millis(ser.settle_ms),
        ..LinkConfig::default()
    };
    Ok(Gauge::new(Arc::new(Link::with_config(
        Box::new(port),
        config,
    ))))
}

fn info(opts: cli::InfoOpts) -> Result<()> {
    let gauge = connect(&opts.ser)?;
    let info = ControllerInfo::read(&gauge).context("reading controller identity")?;
    println!("version:      {}", info.version);
    println!("serial:       {}", info.serial_number);
    println!("part number:  {}", info.part_number);
    println!("display unit: {}", info.display_unit);
    println!("channels:     {}", info.channel_count);
    Ok(())
}

fn read(opts: cli::ReadOpts) -> Result<()> {
    let gauge = connect(&opts.ser)?;
    let text = gauge
        .read_raw(opts.channel, opts.param)
        .with_context(|| format!("reading {};{}", opts.channel, opts.param))?;
    println!("{text}");
    Ok(())
}

fn write(opts: cli::WriteOpts) -> Result<()> {
    let gauge = connect(&opts.ser)?;
    gauge
        .write_raw(opts.channel, opts.param, &opts.value)
        .with_context(|| format!("writing {};{}", opts.channel, opts.param))?;
    println!("ok");
    Ok(())
}

fn pressure(opts: cli::PressureOpts) -> Result<()> {
    let gauge = connect(&opts.ser)?;
    let unit = gauge
        .read(Target::Controller, Parameter::DisplayUnit)
        .context("reading display unit")?;
    let sensor = Sensor::init(gauge, opts.channel)
        .with_context(|| format!("initializing channel {}", opts.channel))?;
    let value = sensor.pressure().context("reading pressure")?;
    println!(
        "{} ({}): {:.3e} {}",
        sensor.name(),
        sensor.sensor_type(),
        value,
        unit
    );
    Ok(())
}

fn set_name(opts: cli::SetNameOpts) -> Result<()> {
    let gauge = connect(&opts.ser)?;
    let mut sensor = Sensor::init(gauge, opts.channel)
        .with_context(|| format!("initializing channel {}", opts.channel))?;
    let old = sensor.name().to_string();
    sensor
        .set_name(&opts.name)
        .with_context(|| format!("renaming channel {}", opts.channel))?;
    println!("{old} -> {}", sensor.name());
    Ok(())
}
