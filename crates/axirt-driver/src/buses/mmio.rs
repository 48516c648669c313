//! Memory-mapped register file access
//!
//! Maps the AXI-RT register file into the process via `/dev/mem` and
//! performs volatile, bounds-checked 32-bit accesses. Unsafe code is
//! confined to the mapping itself and the volatile load/store pair.

use crate::bus::{check_access, RegisterBus};
use crate::error::{AxiRtError, Result};
use axirt_regs::regs;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::ptr::NonNull;

/// Granularity `/dev/mem` mappings must be aligned to.
const PAGE_SIZE: usize = 4096;

/// Owned backing of a `/dev/mem` mapping; absent when the pointer was
/// supplied by the integrator.
struct Mapping {
    base: NonNull<u8>,
    len: usize,
    _file: File,
}

/// Memory-mapped AXI-RT register file.
///
/// Construct with [`MmioBus::map`] on hosted systems, or
/// [`MmioBus::from_raw`] when the integrating firmware already mapped the
/// register file.
pub struct MmioBus {
    /// First register of the file (base + in-page offset).
    ptr: NonNull<u8>,
    /// Register file length in bytes.
    len: usize,
    /// Present iff this bus owns the mapping and must unmap on drop.
    mapping: Option<Mapping>,
}

impl std::fmt::Debug for MmioBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmioBus")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("len", &self.len)
            .field("owned", &self.mapping.is_some())
            .finish()
    }
}

// SAFETY: MmioBus owns (or exclusively borrows, per from_raw contract) the
// mapped register window. The mapping is process-wide, so moving the bus
// between threads does not invalidate it. No thread-local state.
unsafe impl Send for MmioBus {}

// SAFETY: reads use &self and are bounds-checked volatile loads; register
// reads on this block are idempotent. Writes require &mut self, so the
// borrow checker enforces the single-writer discipline the hardware needs.
unsafe impl Sync for MmioBus {}

impl MmioBus {
    /// Map the register file from `/dev/mem` at physical address `base`.
    ///
    /// The mapping is page-aligned internally; `base` itself only needs
    /// the 4-byte alignment of the register file.
    ///
    /// # Errors
    ///
    /// Returns an error if `/dev/mem` cannot be opened (typically requires
    /// root) or the mapping fails.
    pub fn map(base: u64) -> Result<Self> {
        if base % 4 != 0 {
            return Err(AxiRtError::map_failed(format!(
                "base address {base:#x} is not 4-byte aligned"
            )));
        }

        let file = OpenOptions::new().read(true).write(true).open("/dev/mem")?;

        let page_mask = PAGE_SIZE as u64 - 1;
        let map_base = base & !page_mask;
        // Truncation acceptable: the in-page delta is below PAGE_SIZE
        #[allow(clippy::cast_possible_truncation)]
        let delta = (base - map_base) as usize;
        let map_len = (delta + regs::REG_FILE_SIZE).next_multiple_of(PAGE_SIZE);

        tracing::debug!("Mapping register file: phys {base:#x}, page base {map_base:#x}");

        // SAFETY: mmap is unsafe but all preconditions are validated:
        // - file descriptor is valid (just opened via OpenOptions)
        // - map_len is nonzero and page-aligned
        // - map_base is page-aligned (masked above)
        // - PROT_READ|PROT_WRITE + MAP_SHARED is the required MMIO mode
        // - rustix returns Result, errors are propagated
        // - the file is stored in Mapping to keep the fd open for the
        //   lifetime of the mapping; munmap happens in Drop
        let map_ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                map_len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                map_base,
            )
            .map_err(|e| AxiRtError::map_failed(format!("mmap of /dev/mem failed: {e}")))?;

            NonNull::new(addr.cast::<u8>())
                .ok_or_else(|| AxiRtError::map_failed("mmap returned null"))?
        };

        // SAFETY: delta < map_len, so the offset pointer stays inside the
        // mapping created above.
        let ptr = unsafe { NonNull::new_unchecked(map_ptr.as_ptr().add(delta)) };

        tracing::info!(
            "Mapped AXI-RT register file at phys {base:#x} ({} bytes)",
            regs::REG_FILE_SIZE
        );

        Ok(Self {
            ptr,
            len: regs::REG_FILE_SIZE,
            mapping: Some(Mapping {
                base: map_ptr,
                len: map_len,
                _file: file,
            }),
        })
    }

    /// Wrap an already-mapped register file.
    ///
    /// The bus performs no unmapping on drop; the caller keeps ownership
    /// of the mapping.
    ///
    /// # Safety
    ///
    /// `ptr` must be 4-byte aligned, valid for volatile reads and writes
    /// of `len` bytes for the lifetime of the returned bus, and must not
    /// be accessed through any other path while the bus exists.
    #[must_use]
    pub unsafe fn from_raw(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            mapping: None,
        }
    }
}

impl RegisterBus for MmioBus {
    fn read_reg(&self, offset: usize) -> Result<u32> {
        check_access(offset, self.len)?;

        // SAFETY: volatile load from a mapped hardware register:
        // - bounds and alignment validated by check_access
        // - ptr is valid for self.len bytes (mmap contract / from_raw contract)
        // - read_volatile is required: the hardware changes these values
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };

        tracing::trace!("rd {offset:#05x} = {value:#010x}");
        Ok(value)
    }

    fn write_reg(&mut self, offset: usize, value: u32) -> Result<()> {
        check_access(offset, self.len)?;

        tracing::trace!("wr {offset:#05x} = {value:#010x}");

        // SAFETY: volatile store to a mapped hardware register:
        // - bounds and alignment validated by check_access
        // - ptr is valid for self.len bytes (mmap contract / from_raw contract)
        // - write_volatile is required: register writes have side effects
        //   and must not be reordered or elided
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }

        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Drop for MmioBus {
    fn drop(&mut self) {
        if let Some(mapping) = &self.mapping {
            // SAFETY: base/len are exactly the pointer and length returned
            // by mmap in map(); Drop runs at most once and no references
            // into the mapping outlive the bus.
            unsafe {
                if let Err(e) = munmap(mapping.base.as_ptr().cast(), mapping.len) {
                    tracing::error!("munmap failed during drop: {e}");
                }
            }
            tracing::debug!("Unmapped AXI-RT register file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires hardware and root
    fn map_and_read_version() {
        let bus = MmioBus::map(0x0100_0000).expect("mapping /dev/mem");
        let major = bus.read_reg(regs::MAJOR_VERSION).expect("version read");
        println!("AXI-RT major version: {major}");
    }

    #[test]
    fn raw_bus_rejects_out_of_bounds() {
        let mut backing = [0u32; regs::REG_FILE_SIZE / 4];
        let ptr = NonNull::new(backing.as_mut_ptr().cast::<u8>()).unwrap();
        // SAFETY: backing outlives the bus and is not otherwise accessed
        let mut bus = unsafe { MmioBus::from_raw(ptr, regs::REG_FILE_SIZE) };

        assert!(bus.read_reg(regs::REG_FILE_SIZE).is_err());
        assert!(bus.write_reg(regs::REG_FILE_SIZE - 2, 0).is_err());
        assert!(bus.write_reg(regs::MAJOR_VERSION, 7).is_ok());
        assert_eq!(bus.read_reg(regs::MAJOR_VERSION).unwrap(), 7);
    }
}
