//! # Formatter Tests
//!
//! Verifies format selection, address placement, byte-enable sourcing and the header
//! endianness conversion of the request and completion formatters.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tlpsim_core::common::DataWidth;
use tlpsim_core::config::AddressWidth;
use tlpsim_core::packetizer::{CompletionFormatter, RequestFormatter};
use tlpsim_core::stream::{Completion, Request};
use tlpsim_core::tlp::fields;
use tlpsim_core::tlp::{CplStatus, Endianness, Fmt};

fn wide() -> RequestFormatter {
    RequestFormatter::new(Endianness::Big, AddressWidth::Bits64)
}

// ══════════════════════════════════════════════════════════
// 1. Request format selection
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Request::read(0x1000, 1, 1, 0), Fmt::MemRd32)]
#[case(Request::read(0xFFFF_FFFC, 1, 1, 0), Fmt::MemRd32)]
#[case(Request::read(0x1_0000_0000, 1, 1, 0), Fmt::MemRd64)]
#[case(Request::write(0x1000, 1, 0, vec![1]), Fmt::MemWr32)]
#[case(Request::write(0x8000_0000_0000_0000, 1, 0, vec![1]), Fmt::MemWr64)]
fn request_format_follows_address(#[case] request: Request, #[case] fmt: Fmt) {
    assert_eq!(wide().header(&request.meta()).fmt, fmt);
}

#[test]
fn thirty_two_bit_formatter_never_selects_four_dword_headers() {
    let f = RequestFormatter::new(Endianness::Big, AddressWidth::Bits32);
    let header = f.header(&Request::read(0x1_0000_2000, 1, 1, 0).meta());
    assert_eq!(header.fmt, Fmt::MemRd32);
    assert_eq!(header.address, 0x2000);
}

#[test]
fn sixty_four_bit_address_halves_are_swapped() {
    let header = wide().header(&Request::read(0x0000_00AB_1234_5678, 1, 1, 0).meta());
    assert_eq!(header.address, 0x1234_5678_0000_00AB);
    let raw = header.encode();
    assert_eq!(raw.dword(2), 0x0000_00AB);
    assert_eq!(raw.dword(3), 0x1234_5678);
}

#[test]
fn request_fixed_fields_are_zero() {
    let header = wide().header(&Request::write(0x40, 0x0203, 9, vec![0; 3]).meta());
    assert_eq!((header.tc, header.td, header.ep, header.attr), (0, false, false, 0));
    assert_eq!(header.length, 3);
    assert_eq!(header.requester_id, 0x0203);
    assert_eq!(header.tag, 9);
}

// ══════════════════════════════════════════════════════════
// 2. Request byte enables
// ══════════════════════════════════════════════════════════

#[test]
fn single_dword_request_has_no_last_be() {
    let header = wide().header(&Request::write(0, 1, 0, vec![7]).meta());
    assert_eq!(header.first_be, 0xF);
    assert_eq!(header.last_be, 0);
}

#[test]
fn multi_dword_request_enables_last_dword() {
    let header = wide().header(&Request::read(0, 2, 1, 0).meta());
    assert_eq!(header.first_be, 0xF);
    assert_eq!(header.last_be, 0xF);
}

#[test]
fn read_beats_carry_no_enables() {
    let beats = Request::read(0x1000, 64, 1, 0).beats(DataWidth::W256);
    assert_eq!(beats.len(), 1);
    let raw = wide().format(&beats[0]);
    assert_eq!(raw.word.be, 0);
    assert!(raw.word.first && raw.word.last);
}

#[test]
fn write_beats_enable_exactly_the_payload() {
    let request = Request::write(0x1000, 1, 0, (1..=5).collect());
    let raw: Vec<_> = request
        .beats(DataWidth::W128)
        .iter()
        .map(|beat| wide().format(beat))
        .collect();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].word.be, 0xFFFF);
    assert_eq!(raw[0].word.dat, vec![1, 2, 3, 4]);
    assert_eq!(raw[1].word.be, 0x000F);
    assert_eq!(raw[1].word.dat, vec![5, 0, 0, 0]);
    assert!(raw[0].word.first && !raw[0].word.last);
    assert!(!raw[1].word.first && raw[1].word.last);
    assert_eq!(raw[0].meta, raw[1].meta);
}

// ══════════════════════════════════════════════════════════
// 3. Completion formatter
// ══════════════════════════════════════════════════════════

#[test]
fn successful_completion_is_cpld_sc() {
    let f = CompletionFormatter::new(Endianness::Big);
    let cpl = Completion::success(0x10, 0x20, 3, 0x40, vec![1, 2, 3]);
    let header = f.header(&cpl.meta());
    assert_eq!(header.fmt, Fmt::CplD);
    assert_eq!(header.status, CplStatus::Sc);
    assert_eq!(header.length, 3);
    assert_eq!(header.byte_count, 12);
    assert_eq!(header.lower_address, 0x40);
}

#[test]
fn lower_address_uses_all_seven_bits() {
    let f = CompletionFormatter::new(Endianness::Big);
    let cpl = Completion::success(0x10, 0x20, 3, 0x7F, vec![1]);
    let raw = f.header(&cpl.meta()).encode();
    assert_eq!(raw.field(fields::completion::LOWER_ADDRESS), 0x7F);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "lower address is a seven-bit field")]
fn lower_address_above_seven_bits_is_rejected() {
    let f = CompletionFormatter::new(Endianness::Big);
    let cpl = Completion::success(0x10, 0x20, 3, 0x80, vec![1]);
    let _ = f.header(&cpl.meta());
}

#[test]
fn error_completion_is_cpl_ur_without_enables() {
    let f = CompletionFormatter::new(Endianness::Big);
    let cpl = Completion::unsupported(0x10, 0x20, 3);
    let header = f.header(&cpl.meta());
    assert_eq!(header.fmt, Fmt::Cpl);
    assert_eq!(header.status, CplStatus::Ur);
    assert_eq!(header.length, 0);
    let beats = cpl.beats(DataWidth::W64);
    assert_eq!(beats.len(), 1);
    assert_eq!(f.format(&beats[0]).word.be, 0);
}

#[rstest]
#[case(1, DataWidth::W64, &[0x0F])]
#[case(2, DataWidth::W64, &[0xFF])]
#[case(3, DataWidth::W128, &[0x0FFF])]
#[case(5, DataWidth::W128, &[0xFFFF, 0x000F])]
fn completion_enables_are_dword_granular(
    #[case] length: u32,
    #[case] width: DataWidth,
    #[case] expected: &[u64],
) {
    let f = CompletionFormatter::new(Endianness::Big);
    let cpl = Completion::success(1, 2, 3, 0, (0..length).collect());
    let be: Vec<u64> = cpl.beats(width).iter().map(|b| f.format(b).word.be).collect();
    assert_eq!(be, expected);
}

// ══════════════════════════════════════════════════════════
// 4. Header endianness
// ══════════════════════════════════════════════════════════

#[test]
fn little_endian_swaps_header_bytes_only() {
    let big = RequestFormatter::new(Endianness::Big, AddressWidth::Bits32);
    let little = RequestFormatter::new(Endianness::Little, AddressWidth::Bits32);
    let beat = &Request::write(0x1000, 0x0100, 5, vec![0x1122_3344]).beats(DataWidth::W64)[0];

    let natural = big.format(beat);
    let swapped = little.format(beat);
    assert_eq!(natural.meta.header.dword(0), 0x4000_0001);
    assert_eq!(swapped.meta.header.dword(0), 0x0100_0040);
    for i in 0..3 {
        assert_eq!(
            swapped.meta.header.dword(i),
            natural.meta.header.dword(i).swap_bytes()
        );
    }
    // Payload is converted once, on the way out of the packetizer.
    assert_eq!(swapped.word.dat, natural.word.dat);
    assert_eq!(swapped.meta.fmt, Fmt::MemWr32);
}

#[test]
fn endianness_helpers() {
    assert_eq!(Endianness::Little.dword(0x1122_3344), 0x4433_2211);
    assert_eq!(Endianness::Little.nibble(0b0001), 0b1000);
    assert_eq!(Endianness::Little.convert_be(0x0F31, 3), 0x0FC8);
    assert_eq!(Endianness::Big.convert_be(0x0F31, 3), 0x0F31);
    let mut data = [0x0102_0304, 0xA0B0_C0D0];
    Endianness::Little.convert_dwords(&mut data);
    assert_eq!(data, [0x0403_0201, 0xD0C0_B0A0]);
}
