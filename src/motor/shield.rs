// Serial protocol for the dual H-bridge motor shield
//
// The shield exposes two H-bridge channels behind a small register-style
// protocol. Every request is a fixed 6-byte packet:
//   [0xA5, 0x5A, channel, opcode, value, checksum]
// and is acknowledged with a same-shape reply:
//   [0xA5, 0x5A, channel, status, value, checksum]
// where a nonzero status reports a shield-side fault.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{self, SerialPort};
use tracing::debug;

use super::{Rotation, WheelMotor};

/// Default serial configuration for the shield
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// H-bridge channel assignment
pub const CHANNEL_LEFT: u8 = 0;
pub const CHANNEL_RIGHT: u8 = 1;

/// Packet header bytes
const HEADER: [u8; 2] = [0xA5, 0x5A];

/// Shield instruction set
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Opcode {
    SetDuty = 0x01,
    SetRotation = 0x02,
    Ping = 0x03,
    GetStatus = 0x04,
}

/// Rotation modes on the wire
const ROTATION_NEUTRAL: u8 = 0;
const ROTATION_FORWARD: u8 = 1;
const ROTATION_BACKWARD: u8 = 2;

/// Error types for shield communication
#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response on channel {channel}: {reason}")]
    InvalidResponse { channel: u8, reason: String },

    #[error("Checksum mismatch on channel {channel}")]
    ChecksumMismatch { channel: u8 },

    #[error("Shield reported fault 0x{status:02X} on channel {channel}")]
    Fault { channel: u8, status: u8 },

    #[error("Timeout waiting for response on channel {channel}")]
    Timeout { channel: u8 },
}

pub type Result<T> = std::result::Result<T, ShieldError>;

/// One H-bridge channel of the shield, usable as a wheel motor.
///
/// Each motor owns its own handle to the serial port, so the pair can be
/// handed off independently to the drive sequencer.
pub struct ShieldMotor {
    port: Box<dyn SerialPort>,
    channel: u8,
}

impl ShieldMotor {
    /// Open the shield and return its (left, right) channels
    pub fn open_pair(port_name: &str) -> Result<(Self, Self)> {
        Self::open_pair_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with a custom baudrate
    pub fn open_pair_with_baudrate(port_name: &str, baudrate: u32) -> Result<(Self, Self)> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;
        let clone = port.try_clone()?;

        Ok((
            Self {
                port,
                channel: CHANNEL_LEFT,
            },
            Self {
                port: clone,
                channel: CHANNEL_RIGHT,
            },
        ))
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Calculate checksum over a packet body (everything after the header)
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| u16::from(b)).sum();
        (!sum & 0xFF) as u8
    }

    /// Build a request packet with header and checksum
    fn build_packet(channel: u8, opcode: Opcode, value: u8) -> [u8; 6] {
        let mut packet = [HEADER[0], HEADER[1], channel, opcode as u8, value, 0];
        packet[5] = Self::checksum(&packet[2..5]);
        packet
    }

    /// Send a request and read back the shield's acknowledgement.
    ///
    /// Returns the value byte of the reply.
    fn transact(&mut self, opcode: Opcode, value: u8) -> Result<u8> {
        let packet = Self::build_packet(self.channel, opcode, value);
        debug!(
            "Shield request: channel={}, opcode={:?}, value={}",
            self.channel, opcode, value
        );
        self.port.write_all(&packet)?;
        self.port.flush()?;

        self.read_response()
    }

    fn read_response(&mut self) -> Result<u8> {
        let mut reply = [0u8; 6];
        self.port.read_exact(&mut reply).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                ShieldError::Timeout {
                    channel: self.channel,
                }
            } else {
                ShieldError::Io(e)
            }
        })?;

        if reply[..2] != HEADER {
            return Err(ShieldError::InvalidResponse {
                channel: self.channel,
                reason: format!("Invalid header: {:02X?}", &reply[..2]),
            });
        }

        if reply[2] != self.channel {
            return Err(ShieldError::InvalidResponse {
                channel: self.channel,
                reason: format!("Channel mismatch: expected {}, got {}", self.channel, reply[2]),
            });
        }

        if Self::checksum(&reply[2..5]) != reply[5] {
            return Err(ShieldError::ChecksumMismatch {
                channel: self.channel,
            });
        }

        let status = reply[3];
        if status != 0 {
            return Err(ShieldError::Fault {
                channel: self.channel,
                status,
            });
        }

        Ok(reply[4])
    }

    /// Check whether this channel's bridge responds
    pub fn ping(&mut self) -> Result<bool> {
        match self.transact(Opcode::Ping, 0) {
            Ok(_) => Ok(true),
            Err(ShieldError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read the channel's status register (fault flags, 0 = healthy)
    pub fn status(&mut self) -> Result<u8> {
        self.transact(Opcode::GetStatus, 0)
    }
}

impl WheelMotor for ShieldMotor {
    type Error = ShieldError;

    fn set_duty_cycle(&mut self, duty: u8) -> Result<()> {
        self.transact(Opcode::SetDuty, duty)?;
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<()> {
        let mode = match rotation {
            Rotation::Neutral => ROTATION_NEUTRAL,
            Rotation::Forward => ROTATION_FORWARD,
            Rotation::Backward => ROTATION_BACKWARD,
        };
        self.transact(Opcode::SetRotation, mode)?;
        Ok(())
    }
}
