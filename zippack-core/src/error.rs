use alloc::format;
use alloc::string::ToString;
use core::error;
use core::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty name, absolute name or a name containing a NUL byte
    InvalidName,
    InvalidDate { year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8 },
    NameTooLong(usize),
    Overflow,
    TooManyEntries(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        let msg = match self {
            InvalidName => "Name Invalid".to_string(),
            InvalidDate { year, month, day, hour, minute, second } => format!(
                "Date not representable in DOS format: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
            NameTooLong(len) => format!("Name too long: {} bytes", len),
            Overflow => "Overflow (archive would need ZIP64)".to_string(),
            TooManyEntries(count) => format!("Too many entries: {}", count),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {}
