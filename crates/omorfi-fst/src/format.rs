// Binary transducer format: header parsing, decoding and encoding.

use bytemuck::Pod;

use crate::symbols::SymbolTable;
use crate::transducer::Transducer;
use crate::transition::{FinalRecord, SectionHeader, TransitionRecord};
use crate::FstError;

/// Header magic constants (little-endian).
const COOKIE1: u32 = 0x0002_A4F1;
const COOKIE2: u32 = 0x0005_7E1D;

/// The only format version this crate reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the binary header in bytes.
pub const HEADER_SIZE: usize = 16;

/// The section header and records start on this boundary.
pub const SECTION_ALIGN: usize = 8;

/// Parsed file header.
///
/// The header occupies the first 16 bytes of a model file:
/// - bytes 0..4: cookie1 (magic number)
/// - bytes 4..8: cookie2 (magic number)
/// - bytes 8..10: format version
/// - bytes 10..12: reserved
/// - bytes 12..16: alphabet id, 0 when unspecified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    pub version: u16,
    /// Identifies the alphabet the model was compiled against. Models loaded
    /// side by side must agree on it unless one of them leaves it at 0.
    pub alphabet_id: u32,
}

/// Parses and validates the 16-byte header.
pub fn parse_header(data: &[u8]) -> Result<ModelHeader, FstError> {
    if data.len() < HEADER_SIZE {
        return Err(FstError::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let cookie1 = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let cookie2 = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if cookie1 != COOKIE1 || cookie2 != COOKIE2 {
        return Err(FstError::InvalidMagic);
    }

    let version = u16::from_le_bytes([data[8], data[9]]);
    if version != FORMAT_VERSION {
        return Err(FstError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let alphabet_id = u32::from_le_bytes([data[12], data[13], data[14], data[15]]);
    Ok(ModelHeader {
        version,
        alphabet_id,
    })
}

#[inline]
fn align_up(offset: usize) -> usize {
    offset.div_ceil(SECTION_ALIGN) * SECTION_ALIGN
}

/// Copy `count` little-endian records out of `bytes` into an aligned Vec.
///
/// Every record type is made of 4-byte fields, so converting each 32-bit word
/// from little-endian fixes the byte order on big-endian hosts and is a no-op
/// elsewhere.
fn read_records<T: Pod>(bytes: &[u8], count: usize) -> Vec<T> {
    let mut records = vec![T::zeroed(); count];
    bytemuck::cast_slice_mut::<T, u8>(&mut records).copy_from_slice(bytes);
    for word in bytemuck::cast_slice_mut::<T, u32>(&mut records) {
        *word = u32::from_le(*word);
    }
    records
}

fn write_records<T: Pod>(buf: &mut Vec<u8>, records: &[T]) {
    for word in bytemuck::cast_slice::<T, u32>(records) {
        buf.extend_from_slice(&word.to_le_bytes());
    }
}

fn section_end(offset: usize, count: u32, record_size: usize, actual: usize) -> Result<usize, FstError> {
    (count as usize)
        .checked_mul(record_size)
        .and_then(|len| offset.checked_add(len))
        .ok_or(FstError::TooShort {
            expected: usize::MAX,
            actual,
        })
}

/// Decode a complete model file into a validated [`Transducer`].
pub fn decode(data: &[u8]) -> Result<Transducer, FstError> {
    let header = parse_header(data)?;
    let (symbols, sym_end) = SymbolTable::parse(data, HEADER_SIZE)?;

    let section_offset = align_up(sym_end);
    let records_offset = section_offset + size_of::<SectionHeader>();
    if records_offset > data.len() {
        return Err(FstError::TooShort {
            expected: records_offset,
            actual: data.len(),
        });
    }
    let section: SectionHeader = read_records(&data[section_offset..records_offset], 1)[0];

    let finals_offset = section_end(
        records_offset,
        section.transition_count,
        size_of::<TransitionRecord>(),
        data.len(),
    )?;
    let end = section_end(
        finals_offset,
        section.final_count,
        size_of::<FinalRecord>(),
        data.len(),
    )?;
    if end > data.len() {
        return Err(FstError::TooShort {
            expected: end,
            actual: data.len(),
        });
    }
    if end < data.len() {
        return Err(FstError::TrailingData {
            expected: end,
            actual: data.len(),
        });
    }

    let transitions: Vec<TransitionRecord> = read_records(
        &data[records_offset..finals_offset],
        section.transition_count as usize,
    );
    let finals: Vec<FinalRecord> =
        read_records(&data[finals_offset..end], section.final_count as usize);

    Transducer::from_records(
        symbols,
        section.start_state,
        section.state_count,
        &transitions,
        &finals,
        header.alphabet_id,
    )
}

/// Encode a transducer into the binary layout [`decode`] reads.
pub fn encode(transducer: &Transducer) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        HEADER_SIZE
            + transducer.transition_count() * size_of::<TransitionRecord>()
            + transducer.state_count() * size_of::<FinalRecord>(),
    );
    buf.extend_from_slice(&COOKIE1.to_le_bytes());
    buf.extend_from_slice(&COOKIE2.to_le_bytes());
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&transducer.alphabet_id().to_le_bytes());

    transducer.symbols().encode(&mut buf);
    buf.resize(align_up(buf.len()), 0);

    let records = transducer.transition_records();
    let finals = transducer.final_records();
    let section = SectionHeader {
        start_state: transducer.start(),
        state_count: transducer.state_count() as u32,
        transition_count: records.len() as u32,
        final_count: finals.len() as u32,
    };
    write_records(&mut buf, &[section]);
    write_records(&mut buf, &records);
    write_records(&mut buf, &finals);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransducerBuilder;

    fn make_header(version: u16, alphabet_id: u32) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[..4].copy_from_slice(&COOKIE1.to_le_bytes());
        buf[4..8].copy_from_slice(&COOKIE2.to_le_bytes());
        buf[8..10].copy_from_slice(&version.to_le_bytes());
        buf[12..16].copy_from_slice(&alphabet_id.to_le_bytes());
        buf
    }

    /// Two states, one arc a:b, final(1) = 0.
    fn make_model() -> Vec<u8> {
        let mut buf = make_header(FORMAT_VERSION, 7);
        let symbols = SymbolTable::from_strings(["", "a", "b"]).unwrap();
        symbols.encode(&mut buf);
        buf.resize(align_up(buf.len()), 0);
        for v in [0u32, 2, 1, 1] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0u32, 1, 1, 2] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&0.5f32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0.0f32.to_le_bytes());
        buf
    }

    #[test]
    fn parse_valid_header() {
        let header = parse_header(&make_header(1, 42)).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.alphabet_id, 42);
    }

    #[test]
    fn reject_too_short() {
        let err = parse_header(&[0u8; 8]).unwrap_err();
        assert!(matches!(
            err,
            FstError::TooShort {
                expected: 16,
                actual: 8
            }
        ));
    }

    #[test]
    fn reject_invalid_magic() {
        let mut data = make_header(1, 0);
        data[0] = 0xFF;
        assert!(matches!(parse_header(&data), Err(FstError::InvalidMagic)));
    }

    #[test]
    fn reject_unknown_version() {
        let err = parse_header(&make_header(2, 0)).unwrap_err();
        assert!(matches!(
            err,
            FstError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
    }

    #[test]
    fn decode_hand_written_model() {
        let t = decode(&make_model()).unwrap();
        assert_eq!(t.state_count(), 2);
        assert_eq!(t.transition_count(), 1);
        assert_eq!(t.alphabet_id(), 7);
        assert_eq!(t.final_weight(1), Some(0.0));
        assert_eq!(t.final_weight(0), None);
    }

    #[test]
    fn reject_truncated_records() {
        let data = make_model();
        let err = decode(&data[..data.len() - 3]).unwrap_err();
        assert!(matches!(err, FstError::TooShort { .. }));
    }

    #[test]
    fn reject_trailing_data() {
        let mut data = make_model();
        data.push(0);
        assert!(matches!(decode(&data), Err(FstError::TrailingData { .. })));
    }

    #[test]
    fn reject_out_of_range_target() {
        let mut data = make_model();
        // first transition's target field
        let offset = data.len() - 8 - 20 + 4;
        data[offset..offset + 4].copy_from_slice(&9u32.to_le_bytes());
        assert!(matches!(
            decode(&data),
            Err(FstError::StateOutOfRange { state: 9, .. })
        ));
    }

    #[test]
    fn reject_huge_counts() {
        let mut data = make_model();
        let section = data.len() - 8 - 20 - 16;
        data[section + 8..section + 12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode(&data).is_err());
    }

    #[test]
    fn reject_state_count_beyond_records() {
        let mut data = make_model();
        let section = data.len() - 8 - 20 - 16;
        data[section + 4..section + 8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode(&data),
            Err(FstError::TooManyStates {
                state_count: u32::MAX,
                limit: 4
            })
        ));
    }

    #[test]
    fn encode_matches_hand_written_layout() {
        let t = decode(&make_model()).unwrap();
        assert_eq!(encode(&t), make_model());
    }

    #[test]
    fn encode_then_decode_preserves_lookup() {
        let mut b = TransducerBuilder::new();
        b.add_path("talo", "talo[N]", 1.0).unwrap();
        b.add_path("talo", "talo[A]", 2.0).unwrap();
        let t = b.build().unwrap();

        let restored = decode(&encode(&t)).unwrap();
        let options = crate::LookupOptions::default();
        assert_eq!(
            t.lookup("talo", &options).readings,
            restored.lookup("talo", &options).readings
        );
    }
}
