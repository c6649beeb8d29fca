//! # Header Encoder Tests
//!
//! Verifies the bit layout of encoded request and completion headers, the format and
//! type codes, and the wrap of maximum-size length and byte-count fields.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tlpsim_core::tlp::fields::{HeaderField, common, completion, request};
use tlpsim_core::tlp::{CompletionHeader, CplStatus, Fmt, RawHeader, RequestHeader};

fn request_header(fmt: Fmt, length: u16, address: u64) -> RequestHeader {
    RequestHeader {
        fmt,
        tc: 0,
        td: false,
        ep: false,
        attr: 0,
        length,
        requester_id: 0x0100,
        tag: 5,
        last_be: if length > 1 { 0xF } else { 0 },
        first_be: 0xF,
        address,
    }
}

fn completion_header(fmt: Fmt, status: CplStatus, length: u16) -> CompletionHeader {
    CompletionHeader {
        fmt,
        tc: 0,
        td: false,
        ep: false,
        attr: 0,
        length,
        completer_id: 0xABCD,
        status,
        bcm: false,
        byte_count: length * 4,
        requester_id: 0x0100,
        tag: 7,
        lower_address: 0x44,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Format and type codes
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Fmt::MemRd32, 0b00, 0b00000, 3, false)]
#[case(Fmt::MemWr32, 0b10, 0b00000, 3, true)]
#[case(Fmt::MemRd64, 0b01, 0b00000, 4, false)]
#[case(Fmt::MemWr64, 0b11, 0b00000, 4, true)]
#[case(Fmt::Cpl, 0b00, 0b01010, 3, false)]
#[case(Fmt::CplD, 0b10, 0b01010, 3, true)]
fn fmt_codes(
    #[case] fmt: Fmt,
    #[case] code: u8,
    #[case] type_code: u8,
    #[case] header_dwords: usize,
    #[case] has_data: bool,
) {
    assert_eq!(fmt.code(), code);
    assert_eq!(fmt.type_code(), type_code);
    assert_eq!(fmt.header_dwords(), header_dwords);
    assert_eq!(fmt.has_data(), has_data);
    assert_eq!(Fmt::from_codes(code, type_code), Some(fmt));
}

#[test]
fn unknown_fmt_type_combination_is_rejected() {
    // Completions never use 4-dword headers.
    assert_eq!(Fmt::from_codes(0b01, 0b01010), None);
    assert_eq!(Fmt::from_codes(0b00, 0b00100), None);
}

#[rstest]
#[case(CplStatus::Sc, 0b000)]
#[case(CplStatus::Ur, 0b001)]
#[case(CplStatus::Crs, 0b010)]
#[case(CplStatus::Ca, 0b100)]
fn completion_status_codes(#[case] status: CplStatus, #[case] code: u8) {
    assert_eq!(status.code(), code);
    assert_eq!(CplStatus::from_code(code), Some(status));
}

// ══════════════════════════════════════════════════════════
// 2. Field placement
// ══════════════════════════════════════════════════════════

#[test]
fn header_field_insert_and_extract() {
    let field = HeaderField::new(1, 8, 8);
    let raw = field.insert(0, 0x1A5);
    // Values are masked to the field width.
    assert_eq!(field.extract(raw), 0xA5);
    assert_eq!(RawHeader::from_bits(raw).dword(1), 0x0000_A500);
}

#[test]
fn raw_header_bits_round_trip() {
    let raw = RawHeader([0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444]);
    assert_eq!(RawHeader::from_bits(raw.bits()), raw);
    assert_eq!(raw.bits() >> 96, 0x4444_4444);
    assert_eq!(raw.to_string(), "11111111 22222222 33333333 44444444");
}

#[test]
fn mem_wr32_layout() {
    let raw = request_header(Fmt::MemWr32, 1, 0x0000_1000).encode();
    assert_eq!(raw.0, [0x4000_0001, 0x0100_050F, 0x0000_1000, 0]);
    assert_eq!(raw.fmt(), Some(Fmt::MemWr32));
}

#[test]
fn mem_rd32_layout() {
    let raw = request_header(Fmt::MemRd32, 16, 0xFEDC_BA98).encode();
    assert_eq!(raw.0, [0x0000_0010, 0x0100_05FF, 0xFEDC_BA98, 0]);
}

#[test]
fn three_dword_header_drops_upper_address() {
    let raw = request_header(Fmt::MemRd32, 1, 0xDEAD_0000_0000_1000).encode();
    assert_eq!(raw.dword(2), 0x0000_1000);
    assert_eq!(raw.dword(3), 0);
}

#[test]
fn four_dword_address_occupies_dwords_two_and_three() {
    // The address field is laid out already swapped: low half in dword 2.
    let raw = request_header(Fmt::MemWr64, 2, 0x0000_2000_0000_0001).encode();
    assert_eq!(raw.0, [0x6000_0002, 0x0100_05FF, 0x0000_0001, 0x0000_2000]);
    assert_eq!(raw.field(request::ADDRESS), 0x0000_2000_0000_0001);
}

#[test]
fn request_fields_read_back() {
    let raw = request_header(Fmt::MemRd64, 3, 0x1234).encode();
    assert_eq!(raw.field(common::FMT), 0b01);
    assert_eq!(raw.field(common::TYPE), 0);
    assert_eq!(raw.field(common::LENGTH), 3);
    assert_eq!(raw.field(request::REQUESTER_ID), 0x0100);
    assert_eq!(raw.field(request::TAG), 5);
    assert_eq!(raw.field(request::FIRST_BE), 0xF);
    assert_eq!(raw.field(request::LAST_BE), 0xF);
}

#[test]
fn cpld_layout() {
    let raw = completion_header(Fmt::CplD, CplStatus::Sc, 2).encode();
    assert_eq!(raw.0, [0x4A00_0002, 0xABCD_0008, 0x0100_0744, 0]);
}

#[test]
fn cpl_ur_layout() {
    let raw = completion_header(Fmt::Cpl, CplStatus::Ur, 0).encode();
    assert_eq!(raw.0, [0x0A00_0000, 0xABCD_2000, 0x0100_0744, 0]);
    assert_eq!(raw.field(completion::STATUS), 0b001);
    assert_eq!(raw.field(completion::BYTE_COUNT), 0);
}

#[test]
fn lower_address_is_seven_bits() {
    let mut header = completion_header(Fmt::CplD, CplStatus::Sc, 1);
    header.lower_address = 0xFF;
    assert_eq!(header.encode().field(completion::LOWER_ADDRESS), 0x7F);
}

// ══════════════════════════════════════════════════════════
// 3. Maximum sizes
// ══════════════════════════════════════════════════════════

#[test]
fn length_1024_encodes_as_zero() {
    let raw = request_header(Fmt::MemWr32, 1024, 0).encode();
    assert_eq!(raw.field(common::LENGTH), 0);
    assert_eq!(raw.dword(0), 0x4000_0000);
}

#[test]
fn byte_count_4096_encodes_as_zero() {
    let raw = completion_header(Fmt::CplD, CplStatus::Sc, 1024).encode();
    assert_eq!(raw.field(completion::BYTE_COUNT), 0);
    assert_eq!(raw.field(common::LENGTH), 0);
}
