use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "graphix-link", about = "GRAPHIX vacuum gauge controller client")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Print the controller identity block
    Info(InfoOpts),
    /// Read one (channel, parameter) pair
    Read(ReadOpts),
    /// Write one (channel, parameter) pair
    Write(WriteOpts),
    /// Read a channel's pressure
    Pressure(PressureOpts),
    /// Rename a measurement channel
    SetName(SetNameOpts),
}

#[derive(Args, Debug, Clone)]
pub struct SerialOpts {
    /// Serial device path
    #[arg(long, default_value = "/dev/ttyGraphix")]
    pub dev: String,
    /// Baud rate
    #[arg(long, default_value_t = 38_400)]
    pub baud: u32,
    /// Settle time between write and read, milliseconds
    #[arg(long, default_value_t = 20)]
    pub settle_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct InfoOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
}

#[derive(Args, Debug, Clone)]
pub struct ReadOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Channel number (0 addresses the controller itself)
    #[arg(long, default_value_t = 0)]
    pub channel: u16,
    /// Parameter code
    #[arg(long)]
    pub param: u16,
}

#[derive(Args, Debug, Clone)]
pub struct WriteOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Channel number (0 addresses the controller itself)
    #[arg(long, default_value_t = 0)]
    pub channel: u16,
    /// Parameter code
    #[arg(long)]
    pub param: u16,
    /// Value to write
    pub value: String,
}

#[derive(Args, Debug, Clone)]
pub struct PressureOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Channel number
    #[arg(long)]
    pub channel: u16,
}

#[derive(Args, Debug, Clone)]
pub struct SetNameOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Channel number
    #[arg(long)]
    pub channel: u16,
    /// New display name
    pub name: String,
}
