// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Settings journal in the last internal flash sector.
//!
//! In single-bank mode the STM32F767 has twelve sectors; sector 11 (256 KiB at `0x081C_0000`) is
//! reserved for settings and sits far past the end of the firmware image. It is split into
//! [`SLOT_LEN`]-byte slots for [`SlotJournal`](dryer::settings::SlotJournal), so a save programs
//! one slot byte by byte. Instruction fetch stalls for the whole sector erase, which only runs
//! once every 32768 saves.

use dryer::settings::EraseRegion;
use dryer::wait::spin_until;
use stm32f7xx_hal::pac;
use thiserror::Error;

const SECTOR: u32 = 11;
const SECTOR_BASE: usize = 0x081C_0000;
const SECTOR_LEN: usize = 256 * 1024;

/// Journal slot size: one settings block padded to a double word.
pub const SLOT_LEN: usize = 8;

const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xCDEF_89AB;

// ----- SR bits -----
const SR_EOP: u32 = 1 << 0;
const SR_OPERR: u32 = 1 << 1;
const SR_WRPERR: u32 = 1 << 4;
const SR_PGAERR: u32 = 1 << 5;
const SR_PGPERR: u32 = 1 << 6;
const SR_ERSERR: u32 = 1 << 7;
const SR_BSY: u32 = 1 << 16;
const SR_ERRORS: u32 = SR_OPERR | SR_WRPERR | SR_PGAERR | SR_PGPERR | SR_ERSERR;

// ----- CR bits -----
const CR_PG: u32 = 1 << 0;
const CR_SER: u32 = 1 << 1;
const CR_SNB_SHIFT: u32 = 3;
const CR_PSIZE_X32: u32 = 0b10 << 8;
const CR_STRT: u32 = 1 << 16;
const CR_LOCK: u32 = 1 << 31;

/// Polls allowed for a sector erase; erase takes up to a couple of seconds.
const ERASE_BUDGET: u32 = 50_000_000;
/// Polls allowed for one byte program.
const PROGRAM_BUDGET: u32 = 100_000;

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum FlashError {
    #[error("flash stayed busy")]
    Busy,
    #[error("access outside the settings sector")]
    OutOfBounds,
    #[error("flash reported status {0:#x}")]
    Status(u32),
}

pub struct FlashSector {
    flash: pac::FLASH,
}

impl FlashSector {
    pub fn new(flash: pac::FLASH) -> Self {
        Self { flash }
    }

    fn unlock(&mut self) {
        if self.flash.cr.read().bits() & CR_LOCK != 0 {
            self.flash.keyr.write(|w| unsafe { w.bits(KEY1) });
            self.flash.keyr.write(|w| unsafe { w.bits(KEY2) });
        }
    }

    fn lock(&mut self) {
        self.flash.cr.write(|w| unsafe { w.bits(CR_LOCK) });
    }

    fn wait_idle(&self, budget: u32) -> Result<(), FlashError> {
        spin_until(budget, || self.flash.sr.read().bits() & SR_BSY == 0)
            .map_err(|_| FlashError::Busy)?;

        let sr = self.flash.sr.read().bits();
        // Status bits are cleared by writing one.
        self.flash
            .sr
            .write(|w| unsafe { w.bits(SR_EOP | SR_ERRORS) });
        match sr & SR_ERRORS {
            0 => Ok(()),
            errors => Err(FlashError::Status(errors)),
        }
    }

    fn checked(offset: usize, len: usize) -> Result<usize, FlashError> {
        match offset.checked_add(len) {
            Some(end) if end <= SECTOR_LEN => Ok(SECTOR_BASE + offset),
            _ => Err(FlashError::OutOfBounds),
        }
    }

    fn erase_sector(&mut self) -> Result<(), FlashError> {
        self.wait_idle(PROGRAM_BUDGET)?;

        self.flash.cr.write(|w| unsafe {
            w.bits(CR_SER | CR_PSIZE_X32 | (SECTOR << CR_SNB_SHIFT))
        });
        self.flash
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | CR_STRT) });
        self.wait_idle(ERASE_BUDGET)
    }

    fn program_bytes(&mut self, addr: usize, bytes: &[u8]) -> Result<(), FlashError> {
        self.wait_idle(PROGRAM_BUDGET)?;

        // PSIZE x8
        self.flash.cr.write(|w| unsafe { w.bits(CR_PG) });
        for (i, &byte) in bytes.iter().enumerate() {
            unsafe { core::ptr::write_volatile((addr + i) as *mut u8, byte) };
            cortex_m::asm::dsb();
            self.wait_idle(PROGRAM_BUDGET)?;
        }
        Ok(())
    }
}

impl EraseRegion for FlashSector {
    type Error = FlashError;

    fn capacity(&self) -> usize {
        SECTOR_LEN
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let addr = Self::checked(offset, buf.len())?;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = unsafe { core::ptr::read_volatile((addr + i) as *const u8) };
        }
        Ok(())
    }

    fn program(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error> {
        let addr = Self::checked(offset, bytes.len())?;
        self.unlock();
        let result = self.program_bytes(addr, bytes);
        self.lock();
        result
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        self.unlock();
        let result = self.erase_sector();
        self.lock();
        result
    }
}
