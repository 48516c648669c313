//! Driver validation against the simulated register file
//!
//! Every test checks register-level effects: which offsets changed, with
//! which values, and that rejected operations touched nothing.

use axirt_driver::{regmap, AxiRt, AxiRtError, Channel, RegisterBus, RtConfig, SimBus};
use std::time::Duration;

const CFG: RtConfig = RtConfig {
    num_managers: 2,
    num_regions: 4,
};

fn driver() -> AxiRt<SimBus> {
    AxiRt::new(SimBus::new(CFG.num_managers, CFG.num_regions), CFG).expect("driver init")
}

#[test]
fn len_limit_modifies_only_the_target_lane() {
    // all four lanes can be exercised even though only two managers are
    // wired up in this configuration
    let cfg = RtConfig {
        num_managers: 4,
        num_regions: 4,
    };
    let mut rt = AxiRt::new(SimBus::new(4, 4), cfg).unwrap();

    rt.set_len_limit(0x11, 0).unwrap();
    rt.set_len_limit(0x22, 1).unwrap();
    rt.set_len_limit(0x33, 2).unwrap();
    rt.set_len_limit(0x44, 3).unwrap();
    assert_eq!(
        rt.bus().read_reg(regmap::LEN_LIMIT.offset).unwrap(),
        0x4433_2211
    );

    // rewriting one lane leaves the others bit-for-bit unchanged
    rt.set_len_limit(0xff, 1).unwrap();
    assert_eq!(
        rt.bus().read_reg(regmap::LEN_LIMIT.offset).unwrap(),
        0x4433_ff11
    );
}

#[test]
fn len_limit_group_fills_every_lane() {
    let mut rt = driver();
    rt.set_len_limit_group(16, 0).unwrap();
    assert_eq!(
        rt.bus().read_reg(regmap::LEN_LIMIT.offset).unwrap(),
        0x1010_1010
    );
}

#[test]
fn region_splits_address_halves() {
    let mut rt = driver();
    rt.set_region(0x1_0000_0004, 0x2_0000_0008, 1, 0).unwrap();

    let bus = rt.bus();
    assert_eq!(bus.read_reg(0x24).unwrap(), 0x0000_0004); // start low, slot 1
    assert_eq!(bus.read_reg(0x34).unwrap(), 0x0000_0001); // start high
    assert_eq!(bus.read_reg(0x44).unwrap(), 0x0000_0008); // end low
    assert_eq!(bus.read_reg(0x54).unwrap(), 0x0000_0002); // end high

    assert_eq!(rt.region(1, 0).unwrap(), (0x1_0000_0004, 0x2_0000_0008));
}

#[test]
fn enable_masks_to_configured_managers() {
    let mut rt = driver();
    rt.enable(0xffff_ffff).unwrap();
    assert_eq!(rt.bus().read_reg(regmap::RT_ENABLE.offset).unwrap(), 0b11);

    rt.disable().unwrap();
    assert_eq!(rt.bus().read_reg(regmap::RT_ENABLE.offset).unwrap(), 0);
}

#[test]
fn claim_read_exclusive_leaves_write_bit_alone() {
    let mut rt = driver();
    rt.claim(true, false).unwrap();
    assert_eq!(rt.bus().read_reg(regmap::ISOLATE.offset).unwrap(), 0b01);

    // a second claim for write exclusivity keeps the read request
    rt.claim(false, true).unwrap();
    assert_eq!(rt.bus().read_reg(regmap::ISOLATE.offset).unwrap(), 0b11);

    rt.release().unwrap();
    assert_eq!(rt.bus().read_reg(regmap::ISOLATE.offset).unwrap(), 0);
}

#[test]
fn budget_write_targets_exactly_one_register() {
    let mut rt = driver();
    let before = rt.bus().snapshot();

    rt.set_budget(100, 2, 0, Channel::Write).unwrap();

    let after = rt.bus().snapshot();
    for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
        if i * 4 == 0x68 {
            assert_eq!(*a, 100, "third write-budget slot");
        } else {
            assert_eq!(b, a, "register {:#x} must not move", i * 4);
        }
    }
}

#[test]
fn period_addressing_per_channel() {
    let mut rt = driver();
    rt.set_period(7, 3, 1, Channel::Write).unwrap();
    rt.set_period(9, 0, 1, Channel::Read).unwrap();
    assert_eq!(rt.bus().read_reg(0x8c).unwrap(), 7);
    assert_eq!(rt.bus().read_reg(0x90).unwrap(), 9);
}

#[test]
fn out_of_range_indices_reject_before_any_access() {
    let mut rt = driver();
    let before = rt.bus().snapshot();

    assert!(matches!(
        rt.set_len_limit(1, 2),
        Err(AxiRtError::ManagerOutOfRange { mgr_id: 2, count: 2 })
    ));
    assert!(matches!(
        rt.set_region(0, 0xfff, 4, 0),
        Err(AxiRtError::RegionOutOfRange { region_id: 4, count: 4 })
    ));
    assert!(matches!(
        rt.set_budget(1, 0, 9, Channel::Read),
        Err(AxiRtError::ManagerOutOfRange { mgr_id: 9, count: 2 })
    ));
    assert!(matches!(
        rt.set_len_limit_group(1, 1),
        Err(AxiRtError::GroupOutOfRange { group_id: 1, count: 1 })
    ));
    assert!(rt.is_isolated(5).is_err());
    assert!(rt.budget_left(0, 7, Channel::Write).is_err());

    assert_eq!(before, rt.bus().snapshot(), "no write may have occurred");
}

#[test]
fn driver_rejects_undersized_bus() {
    #[derive(Debug)]
    struct TinyBus;
    impl RegisterBus for TinyBus {
        fn read_reg(&self, offset: usize) -> axirt_driver::Result<u32> {
            Err(AxiRtError::OutOfBounds { offset, len: 0 })
        }
        fn write_reg(&mut self, offset: usize, _value: u32) -> axirt_driver::Result<()> {
            Err(AxiRtError::OutOfBounds { offset, len: 0 })
        }
        fn len(&self) -> usize {
            0x10
        }
    }

    assert!(matches!(
        AxiRt::new(TinyBus, RtConfig::default()),
        Err(AxiRtError::Unmapped { len: 0x10, .. })
    ));
}

#[test]
fn driver_rejects_oversized_config() {
    let bus = SimBus::new(2, 4);
    let cfg = RtConfig {
        num_managers: 5, // beyond the 4 length-limit lanes
        num_regions: 4,
    };
    assert!(matches!(
        AxiRt::new(bus, cfg),
        Err(AxiRtError::InvalidConfig { .. })
    ));

    let bus = SimBus::new(2, 4);
    let cfg = RtConfig {
        num_managers: 2,
        num_regions: 5,
    };
    assert!(matches!(
        AxiRt::new(bus, cfg),
        Err(AxiRtError::InvalidConfig { .. })
    ));
}

#[test]
fn blocking_claim_waits_for_acknowledgment() {
    let bus = SimBus::new(2, 4).with_ack_delay(3);
    let mut rt = AxiRt::new(bus, CFG).unwrap();

    rt.claim_blocking(true, true, Duration::from_secs(1)).unwrap();
    assert!(rt.is_isolated(0).unwrap());
    assert!(rt.is_isolated(1).unwrap());
}

#[test]
fn blocking_claim_times_out_when_hardware_never_acks() {
    let bus = SimBus::new(2, 4).with_ack_delay(u32::MAX);
    let mut rt = AxiRt::new(bus, CFG).unwrap();

    let err = rt
        .claim_blocking(true, false, Duration::from_millis(5))
        .unwrap_err();
    assert!(matches!(err, AxiRtError::IsolationTimeout { waited_ms: 5 }));

    // the request itself went out and can be withdrawn
    assert_eq!(rt.bus().read_reg(regmap::ISOLATE.offset).unwrap(), 0b01);
    rt.release().unwrap();
}

#[test]
fn bypassed_status_readback() {
    let bus = SimBus::new(2, 4);
    let mut rt = AxiRt::new(bus, CFG).unwrap();
    assert!(!rt.is_bypassed(0).unwrap());

    // fake the hardware reporting manager 1 bypassed
    rt = {
        let mut bus = rt.into_bus();
        bus.poke(regmap::RT_BYPASSED.offset, 0b10);
        AxiRt::new(bus, CFG).unwrap()
    };
    assert!(!rt.is_bypassed(0).unwrap());
    assert!(rt.is_bypassed(1).unwrap());
}

#[test]
fn remaining_counters_read_the_left_registers() {
    let mut bus = SimBus::new(2, 4);
    bus.poke(regmap::WRITE_BUDGET_LEFT.reg_offset(2), 77);
    bus.poke(regmap::READ_PERIOD_LEFT.reg_offset(1), 55);
    let rt = AxiRt::new(bus, CFG).unwrap();

    assert_eq!(rt.budget_left(2, 0, Channel::Write).unwrap(), 77);
    assert_eq!(rt.period_left(1, 0, Channel::Read).unwrap(), 55);
    assert_eq!(rt.budget_left(0, 0, Channel::Read).unwrap(), 0);
}

#[test]
fn version_and_params_readback() {
    let rt = driver();
    let v = rt.version().unwrap();
    assert_eq!((v.major, v.minor, v.patch), (0, 4, 1));

    let p = rt.hw_params().unwrap();
    assert_eq!(p.num_managers, 2);
    assert_eq!(p.num_addr_regions, 4);
    assert_eq!(p.addr_width, 48);
    assert_eq!(p.data_width, 64);
    assert_eq!(p.max_num_managers, 32);
}

#[test]
fn imtu_control_masks_to_configured_managers() {
    let mut rt = driver();
    rt.imtu_enable(0xff).unwrap();
    assert_eq!(rt.bus().read_reg(regmap::IMTU_ENABLE.offset).unwrap(), 0b11);

    rt.imtu_abort(0b01).unwrap();
    assert_eq!(rt.bus().read_reg(regmap::IMTU_ABORT.offset).unwrap(), 0b01);
}
