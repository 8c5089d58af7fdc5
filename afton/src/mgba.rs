//! Debug output through mGBA's logging port, and a [`log`] backend on top of it.

use core::fmt::Write;

use afton_reg::{
    MGBA_DEBUG_ENABLE, MGBA_DEBUG_LEVEL, MGBA_OUTPUT_STRING, MGBA_OUTPUT_STRING_LENGTH,
};

use crate::bus::{Bus, Mmio};

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum DebugLevel {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
}

impl From<log::Level> for DebugLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => DebugLevel::Error,
            log::Level::Warn => DebugLevel::Warning,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug | log::Level::Trace => DebugLevel::Debug,
        }
    }
}

const ENABLE_HANDSHAKE_IN: u16 = 0xC0DE;
const ENABLE_HANDSHAKE_OUT: u16 = 0x1DEA;

const DEBUG_FLAG_CODE: u16 = 0x0100;

fn is_running_in_mgba<B: Bus + ?Sized>(bus: &mut B) -> bool {
    bus.write16(MGBA_DEBUG_ENABLE, ENABLE_HANDSHAKE_IN);
    bus.read16(MGBA_DEBUG_ENABLE) == ENABLE_HANDSHAKE_OUT
}

pub struct Mgba<'b, B: Bus + ?Sized> {
    bus: &'b mut B,
}

impl<'b, B: Bus + ?Sized> Mgba<'b, B> {
    /// Returns `None` unless the emulator answers the handshake.
    #[must_use]
    pub fn new(bus: &'b mut B) -> Option<Self> {
        if is_running_in_mgba(bus) {
            Some(Mgba { bus })
        } else {
            None
        }
    }

    pub fn print(
        &mut self,
        output: core::fmt::Arguments,
        level: DebugLevel,
    ) -> Result<(), core::fmt::Error> {
        let mut writer = MgbaWriter {
            bus: &mut *self.bus,
            bytes_written: 0,
            level,
        };
        write!(&mut writer, "{output}")?;
        writer.terminate();
        self.set_level(level);
        Ok(())
    }

    fn set_level(&mut self, level: DebugLevel) {
        self.bus.write16(MGBA_DEBUG_LEVEL, DEBUG_FLAG_CODE | level as u16);
    }
}

struct MgbaWriter<'b, B: Bus + ?Sized> {
    bus: &'b mut B,
    bytes_written: usize,
    level: DebugLevel,
}

impl<B: Bus + ?Sized> MgbaWriter<'_, B> {
    fn terminate(&mut self) {
        if self.bytes_written < MGBA_OUTPUT_STRING_LENGTH {
            self.bus
                .write8(MGBA_OUTPUT_STRING + self.bytes_written as u32, 0);
        }
    }
}

impl<B: Bus + ?Sized> Write for MgbaWriter<'_, B> {
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        for b in s.bytes() {
            if self.bytes_written == MGBA_OUTPUT_STRING_LENGTH {
                // the buffer is full, flush it as its own message
                self.bus
                    .write16(MGBA_DEBUG_LEVEL, DEBUG_FLAG_CODE | self.level as u16);
                self.bytes_written = 0;
            }
            self.bus
                .write8(MGBA_OUTPUT_STRING + self.bytes_written as u32, b);
            self.bytes_written += 1;
        }
        Ok(())
    }
}

struct MgbaLogger;

impl log::Log for MgbaLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // Safety: the logger is only installed by `init_logger`, whose caller
        // promised we are on the console
        let mut bus = unsafe { Mmio::new() };
        if let Some(mut mgba) = Mgba::new(&mut bus) {
            let _ = mgba.print(
                format_args!("[{}] {}", record.target(), record.args()),
                record.level().into(),
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: MgbaLogger = MgbaLogger;

/// Sends [`log`] output to mGBA. Returns `false`, installing nothing, when not
/// running inside mGBA.
///
/// # Safety
/// Must only be called on the console, once, before anything else logs. The
/// console has no atomics so the logger is installed without synchronisation.
pub unsafe fn init_logger(level: log::LevelFilter) -> bool {
    let mut bus = unsafe { Mmio::new() };
    if !is_running_in_mgba(&mut bus) {
        return false;
    }

    let installed = unsafe { log::set_logger_racy(&LOGGER) }.is_ok();
    if installed {
        unsafe { log::set_max_level_racy(level) };
    }

    installed
}
