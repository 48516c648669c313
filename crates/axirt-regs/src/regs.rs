//! Register map for the AXI-RT unit.
//!
//! Byte offsets from the register file base. All registers are 32 bits
//! wide. The layout is fixed by the hardware generator; the packing
//! parameters of each multireg are captured in its [`Multireg`]
//! descriptor so drivers never hand-roll the address or shift math.

use crate::multireg::Multireg;

// ── Hardware parameterization ────────────────────────────────────────────────

/// Number of managers regulated by this instance.
pub const NUM_MRG: usize = 2;

/// Number of subordinate address regions per manager.
pub const NUM_SUB: usize = 4;

/// Register width in bits.
pub const REG_WIDTH: u32 = 32;

/// Size of the register file in bytes (one past the last register).
pub const REG_FILE_SIZE: usize = 0x114;

// ── Version ──────────────────────────────────────────────────────────────────

/// Major version, read-only.
pub const MAJOR_VERSION: usize = 0x00;
/// Minor version, read-only.
pub const MINOR_VERSION: usize = 0x04;
/// Patch version, read-only.
pub const PATCH_VERSION: usize = 0x08;

// ── Control multiregs ────────────────────────────────────────────────────────

/// Enable traffic regulation, one bit per manager.
pub const RT_ENABLE: Multireg = Multireg {
    offset: 0x0c,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

/// Regulation inactive status, one bit per manager. Read-only.
pub const RT_BYPASSED: Multireg = Multireg {
    offset: 0x10,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

/// Burst fragmentation limit in beats, 8 bits per manager.
pub const LEN_LIMIT: Multireg = Multireg {
    offset: 0x14,
    field_width: 8,
    fields_per_reg: 4,
    count: 1,
};

/// Enable the internal MTU, one bit per manager.
pub const IMTU_ENABLE: Multireg = Multireg {
    offset: 0x18,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

/// Reset both period and budget counters, one bit per manager.
pub const IMTU_ABORT: Multireg = Multireg {
    offset: 0x1c,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

// ── Region address ranges ────────────────────────────────────────────────────
// 64-bit addresses split into 32-bit halves, one register per region.

/// Region start address, low half.
pub const START_ADDR_SUB_LOW: Multireg = Multireg {
    offset: 0x20,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Region start address, high half.
pub const START_ADDR_SUB_HIGH: Multireg = Multireg {
    offset: 0x30,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Region end address, low half.
pub const END_ADDR_SUB_LOW: Multireg = Multireg {
    offset: 0x40,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Region end address, high half.
pub const END_ADDR_SUB_HIGH: Multireg = Multireg {
    offset: 0x50,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

// ── Region budgets and periods ───────────────────────────────────────────────
// One full-width register per region, split by channel.

/// Write-channel budget.
pub const WRITE_BUDGET: Multireg = Multireg {
    offset: 0x60,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Read-channel budget.
pub const READ_BUDGET: Multireg = Multireg {
    offset: 0x70,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Write-channel period.
pub const WRITE_PERIOD: Multireg = Multireg {
    offset: 0x80,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Read-channel period.
pub const READ_PERIOD: Multireg = Multireg {
    offset: 0x90,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

// ── Remaining-counter status ─────────────────────────────────────────────────
// Read-only; the hardware decrements these as traffic flows.

/// Remaining write-channel budget.
pub const WRITE_BUDGET_LEFT: Multireg = Multireg {
    offset: 0xa0,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Remaining read-channel budget.
pub const READ_BUDGET_LEFT: Multireg = Multireg {
    offset: 0xb0,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Remaining write-channel period.
pub const WRITE_PERIOD_LEFT: Multireg = Multireg {
    offset: 0xc0,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

/// Remaining read-channel period.
pub const READ_PERIOD_LEFT: Multireg = Multireg {
    offset: 0xd0,
    field_width: 32,
    fields_per_reg: 1,
    count: NUM_SUB,
};

// ── Guard unit ───────────────────────────────────────────────────────────────

/// Isolation request, one bit per manager.
pub const ISOLATE: Multireg = Multireg {
    offset: 0xe0,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

/// Isolation granted status, one bit per manager. Read-only.
pub const ISOLATED: Multireg = Multireg {
    offset: 0xe4,
    field_width: 1,
    fields_per_reg: 32,
    count: 1,
};

/// Isolate-request bit for the read channel guard.
pub const ISOLATE_READ_BIT: u32 = 1 << 0;
/// Isolate-request bit for the write channel guard.
pub const ISOLATE_WRITE_BIT: u32 = 1 << 1;

// ── Parameter readback ───────────────────────────────────────────────────────
// Read-only constants mirroring the synthesis-time configuration.

/// Configured number of managers.
pub const NUM_MANAGERS: usize = 0xe8;
/// AXI address width in bits.
pub const ADDR_WIDTH: usize = 0xec;
/// AXI data width in bits.
pub const DATA_WIDTH: usize = 0xf0;
/// AXI ID width in bits.
pub const ID_WIDTH: usize = 0xf4;
/// AXI user signal width in bits.
pub const USER_WIDTH: usize = 0xf8;
/// Maximum outstanding transactions.
pub const NUM_PENDING: usize = 0xfc;
/// Write buffer depth in beats.
pub const W_BUFFER_DEPTH: usize = 0x100;
/// Configured number of address regions.
pub const NUM_ADDR_REGIONS: usize = 0x104;
/// Period counter width in bits.
pub const PERIOD_WIDTH: usize = 0x108;
/// Budget counter width in bits.
pub const BUDGET_WIDTH: usize = 0x10c;
/// Upper bound on managers supported by this register layout.
pub const MAX_NUM_MANAGERS: usize = 0x110;
