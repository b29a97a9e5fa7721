// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Persisted user settings.
//!
//! The block is four bytes followed by a one-byte additive checksum:
//!
//! | Offset | Field |
//! | ------ | ----- |
//! | 0 | beeper enabled (0/1) |
//! | 1 | start powered on (0/1) |
//! | 2 | temperature setpoint index |
//! | 3 | duration setpoint index |
//! | 4 | wrapping sum of bytes 0..=3 |
//!
//! A block that fails the checksum, or whose fields are out of range, loads as
//! [`Settings::default`]. Saving only happens on explicit user confirmation, never per tick.
//!
//! On flash, [`SlotJournal`] appends every saved block to the next free slot of an erasable
//! region, so a save programs five bytes and the region is erased once per full pass.

use core::fmt::Debug;

use log::{debug, info, warn};

use crate::config::{DURATION_SETPOINTS_H, TEMPERATURE_SETPOINTS};

/// Stored block length, checksum included.
pub const BLOCK_LEN: usize = 5;

/// Value of an erased flash byte.
pub const ERASED: u8 = 0xFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub use_beeper: bool,
    pub start_powered: bool,
    pub temperature_index: u8,
    pub duration_index: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_beeper: true,
            start_powered: false,
            temperature_index: 0,
            duration_index: 0,
        }
    }
}

/// Wrapping byte sum.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

impl Settings {
    pub fn to_block(&self) -> [u8; BLOCK_LEN] {
        let mut block = [
            self.use_beeper as u8,
            self.start_powered as u8,
            self.temperature_index,
            self.duration_index,
            0,
        ];
        block[BLOCK_LEN - 1] = checksum(&block[..BLOCK_LEN - 1]);
        block
    }

    /// Decode a stored block. `None` on checksum mismatch or out-of-range fields.
    pub fn from_block(block: &[u8; BLOCK_LEN]) -> Option<Self> {
        let (body, sum) = block.split_at(BLOCK_LEN - 1);
        if checksum(body) != sum[0] {
            return None;
        }

        let flag = |b: u8| match b {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        };
        let settings = Self {
            use_beeper: flag(body[0])?,
            start_powered: flag(body[1])?,
            temperature_index: body[2],
            duration_index: body[3],
        };
        settings.indices_in_range().then_some(settings)
    }

    fn indices_in_range(&self) -> bool {
        (self.temperature_index as usize) < TEMPERATURE_SETPOINTS.len()
            && (self.duration_index as usize) < DURATION_SETPOINTS_H.len()
    }
}

/// Non-volatile storage holding one settings block.
pub trait SettingsMedium {
    type Error: Debug;

    fn read(&mut self, buf: &mut [u8; BLOCK_LEN]) -> Result<(), Self::Error>;

    fn write(&mut self, block: &[u8; BLOCK_LEN]) -> Result<(), Self::Error>;
}

/// Raw erasable storage such as one flash sector.
///
/// Programming may only clear bits; a byte goes back to [`ERASED`] only through
/// [`erase`](Self::erase), which covers the whole region.
pub trait EraseRegion {
    type Error: Debug;

    /// Region size in bytes.
    fn capacity(&self) -> usize;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn program(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error>;

    fn erase(&mut self) -> Result<(), Self::Error>;
}

/// [`SettingsMedium`] that appends each block to the next free slot of an [`EraseRegion`].
///
/// Slots fill front to back and the last written one holds the current block. Byte 0 of a stored
/// block is a 0/1 flag, so a slot is free exactly when its first byte reads [`ERASED`]. A save
/// that finds no free slot erases the region and starts again at slot 0.
pub struct SlotJournal<R> {
    region: R,
    slot_len: usize,
}

impl<R: EraseRegion> SlotJournal<R> {
    /// Slots shorter than [`BLOCK_LEN`] are widened to it.
    pub fn new(region: R, slot_len: usize) -> Self {
        Self {
            region,
            slot_len: slot_len.max(BLOCK_LEN),
        }
    }

    pub fn slots(&self) -> usize {
        self.region.capacity() / self.slot_len
    }

    /// Number of written slots, found by binary search over their first bytes.
    pub fn used(&mut self) -> Result<usize, R::Error> {
        let (mut lo, mut hi) = (0, self.slots());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mut first = [0u8; 1];
            self.region.read(mid * self.slot_len, &mut first)?;
            if first[0] == ERASED {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    }

    #[inline]
    pub fn region(&self) -> &R {
        &self.region
    }
}

impl<R: EraseRegion> SettingsMedium for SlotJournal<R> {
    type Error = R::Error;

    /// An empty journal reads as an erased block.
    fn read(&mut self, buf: &mut [u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        match self.used()?.checked_sub(1) {
            Some(slot) => self.region.read(slot * self.slot_len, buf),
            None => {
                buf.fill(ERASED);
                Ok(())
            }
        }
    }

    fn write(&mut self, block: &[u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        let mut slot = self.used()?;
        if slot >= self.slots() {
            debug!("settings: journal full after {} saves, erasing", slot);
            self.region.erase()?;
            slot = 0;
        }
        self.region.program(slot * self.slot_len, block)
    }
}

/// Checksummed settings on top of a [`SettingsMedium`].
pub struct SettingsStore<M> {
    medium: M,
}

impl<M: SettingsMedium> SettingsStore<M> {
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    /// Load the stored settings, falling back to defaults on any read or validation failure.
    pub fn load(&mut self) -> Settings {
        let mut block = [0u8; BLOCK_LEN];
        if let Err(e) = self.medium.read(&mut block) {
            warn!("settings: read failed ({:?}), using defaults", e);
            return Settings::default();
        }

        match Settings::from_block(&block) {
            Some(settings) => {
                info!("settings: loaded {:?}", settings);
                settings
            }
            None => {
                warn!("settings: invalid block {:02x?}, using defaults", block);
                Settings::default()
            }
        }
    }

    pub fn save(&mut self, settings: &Settings) -> Result<(), M::Error> {
        self.medium.write(&settings.to_block())?;
        info!("settings: saved {:?}", settings);
        Ok(())
    }

    #[inline]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    #[inline]
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryMedium, MemoryRegion};

    fn sample() -> Settings {
        Settings {
            use_beeper: false,
            start_powered: true,
            temperature_index: 3,
            duration_index: 7,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = SettingsStore::new(MemoryMedium::new());
        store.save(&sample()).unwrap();
        assert_eq!(store.medium().block, [0, 1, 3, 7, 11]);
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn any_corrupted_byte_loads_defaults() {
        let good = sample().to_block();
        for i in 0..BLOCK_LEN {
            let mut block = good;
            block[i] ^= 0x01;
            let mut store = SettingsStore::new(MemoryMedium::with_block(block));
            assert_eq!(store.load(), Settings::default(), "byte {i}");
        }
    }

    #[test]
    fn erased_medium_loads_defaults() {
        let mut store = SettingsStore::new(MemoryMedium::new());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn out_of_range_index_with_valid_checksum_loads_defaults() {
        let body = [1, 0, TEMPERATURE_SETPOINTS.len() as u8, 0];
        let block = [body[0], body[1], body[2], body[3], checksum(&body)];
        let mut store = SettingsStore::new(MemoryMedium::with_block(block));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn read_failure_loads_defaults() {
        let mut medium = MemoryMedium::with_block(sample().to_block());
        medium.broken = true;
        let mut store = SettingsStore::new(medium);
        assert_eq!(store.load(), Settings::default());
        assert!(store.save(&sample()).is_err());
    }

    fn journal(slots: usize) -> SettingsStore<SlotJournal<MemoryRegion>> {
        SettingsStore::new(SlotJournal::new(MemoryRegion::new(slots * 8), 8))
    }

    fn other() -> Settings {
        Settings {
            duration_index: 2,
            ..sample()
        }
    }

    #[test]
    fn empty_journal_loads_defaults() {
        let mut store = journal(4);
        assert_eq!(store.medium_mut().used().unwrap(), 0);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn journal_appends_and_latest_slot_wins() {
        let mut store = journal(4);
        store.save(&sample()).unwrap();
        store.save(&other()).unwrap();

        let bytes = &store.medium().region().bytes;
        assert_eq!(bytes[..BLOCK_LEN], sample().to_block());
        assert_eq!(bytes[8..8 + BLOCK_LEN], other().to_block());
        assert_eq!(bytes[16], ERASED);
        assert_eq!(store.medium().region().erases, 0);
        assert_eq!(store.load(), other());
    }

    #[test]
    fn full_journal_erases_once_and_restarts() {
        let mut store = journal(4);
        for _ in 0..4 {
            store.save(&sample()).unwrap();
        }
        assert_eq!(store.medium_mut().used().unwrap(), 4);
        assert_eq!(store.medium().region().erases, 0);

        store.save(&other()).unwrap();
        assert_eq!(store.medium().region().erases, 1);
        assert_eq!(store.medium_mut().used().unwrap(), 1);
        assert_eq!(store.load(), other());
    }

    #[test]
    fn torn_latest_slot_loads_defaults() {
        let mut region = MemoryRegion::new(4 * 8);
        region.bytes[..BLOCK_LEN].copy_from_slice(&sample().to_block());
        // Power lost after the first byte of the next save.
        region.bytes[8] = 0;
        let mut store = SettingsStore::new(SlotJournal::new(region, 8));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn used_slot_search_is_logarithmic() {
        let mut region = MemoryRegion::new(256 * 1024);
        for slot in 0..12_345 {
            region.bytes[slot * 8] = 1;
        }
        let mut journal = SlotJournal::new(region, 8);
        assert_eq!(journal.slots(), 32_768);
        assert_eq!(journal.used().unwrap(), 12_345);
        assert!(journal.region().reads <= 16);
    }

    #[test]
    fn checksum_wraps() {
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
    }
}
