//! MS-DOS date/time packing used by every ZIP header timestamp
use core::fmt;

use crate::Error;

/// Packed DOS timestamp: date in the high 16 bits, time in the low 16 bits.
///
/// Seconds are stored with 2 second resolution, and only the years 1980
/// through 2107 are representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DosDateTime(u32);

impl DosDateTime {
    pub const MIN_YEAR: u16 = 1980;
    pub const MAX_YEAR: u16 = 2107;

    /// Pack a calendar date and wall-clock time. `month` and `day` start at 1.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<DosDateTime, Error> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year)
            || !(1..=12).contains(&month)
            || day < 1
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 60
        {
            return Err(Error::InvalidDate { year, month, day, hour, minute, second });
        }

        // A leap second is folded into the last representable 2 second slot
        let second = second.min(59);

        let bits = ((u32::from(year - Self::MIN_YEAR) & 0x7f) << 25)
            | (u32::from(month) << 21)
            | (u32::from(day) << 16)
            | (u32::from(hour) << 11)
            | (u32::from(minute) << 5)
            | (u32::from(second) >> 1);
        Ok(DosDateTime(bits))
    }

    /// 1980-01-01 00:00:00, the DOS epoch
    pub const fn epoch() -> DosDateTime {
        DosDateTime((1 << 21) | (1 << 16))
    }

    pub const fn from_bits(bits: u32) -> DosDateTime {
        DosDateTime(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn date(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn time(&self) -> u16 {
        self.0 as u16
    }

    pub fn year(&self) -> u16 {
        Self::MIN_YEAR + (self.date() >> 9)
    }

    pub fn month(&self) -> u8 {
        ((self.date() >> 5) & 0x0f) as u8
    }

    pub fn day(&self) -> u8 {
        (self.date() & 0x1f) as u8
    }

    pub fn hour(&self) -> u8 {
        (self.time() >> 11) as u8
    }

    pub fn minute(&self) -> u8 {
        ((self.time() >> 5) & 0x3f) as u8
    }

    pub fn second(&self) -> u8 {
        ((self.time() & 0x1f) * 2) as u8
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 31,
    }
}

impl Default for DosDateTime {
    fn default() -> Self {
        Self::epoch()
    }
}

impl From<DosDateTime> for u32 {
    fn from(value: DosDateTime) -> u32 {
        value.0
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}
