// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use hamrig_core::NativeMemory;

/// Reads straight out of this process's address space.
///
/// Only addresses handed out by the loaded library, plus offsets inside
/// the blocks they point at, are ever read. The null page is reported as
/// unreadable; anything else is trusted.
pub struct ProcessMemory;

impl NativeMemory for ProcessMemory {
    fn read(&self, addr: u64, buf: &mut [u8]) -> bool {
        if addr == 0 || usize::try_from(addr).is_err() {
            return false;
        }
        if addr.checked_add(buf.len() as u64).is_none() {
            return false;
        }
        // SAFETY: the library owns the block at `addr` for the process lifetime.
        unsafe {
            std::ptr::copy_nonoverlapping(addr as usize as *const u8, buf.as_mut_ptr(), buf.len());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_own_memory() {
        let data: [u8; 6] = [1, 2, 3, 4, b'o', 0];
        let addr = data.as_ptr() as u64;
        let mut buf = [0u8; 4];
        assert!(ProcessMemory.read(addr, &mut buf));
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(ProcessMemory.read_c_string(addr + 4, 16).as_deref(), Some("o"));
        assert!(!ProcessMemory.read(0, &mut buf));
    }
}
