//! Pre-auth encoding
//!
//! This is a low level detail used to build PASETO version implementations.
//! Every authenticated piece of a token (header, nonce, ciphertext, footer,
//! implicit assertion) is bound into a single unambiguous byte string.

use crate::PasetoError;

/// A sink for encoded bytes, eg a [`Vec`] or a running MAC/digest.
pub trait WriteBytes {
    fn write(&mut self, slice: &[u8]);
}

impl WriteBytes for Vec<u8> {
    fn write(&mut self, slice: &[u8]) {
        self.extend_from_slice(slice)
    }
}

impl<W: WriteBytes + ?Sized> WriteBytes for &mut W {
    fn write(&mut self, slice: &[u8]) {
        W::write(self, slice)
    }
}

/// Encode a length as 8 little-endian bytes.
///
/// The most significant bit must be clear.
pub fn le64(n: u64) -> Result<[u8; 8], PasetoError> {
    if n >> 63 != 0 {
        return Err(PasetoError::NotSupported("length does not fit in 63 bits"));
    }
    Ok(n.to_le_bytes())
}

/// Pre-auth encode the pieces into `out`.
///
/// Each piece is given as a list of slices which are concatenated, so that
/// a header can be written as `["v4", ".local."]` without allocating.
pub fn pre_auth_encode<const N: usize>(
    pieces: [&[&[u8]]; N],
    mut out: impl WriteBytes,
) -> Result<(), PasetoError> {
    out.write(&le64(N as u64)?);
    for piece in pieces {
        let len: u64 = piece.iter().map(|x| x.len() as u64).sum();
        out.write(&le64(len)?);
        for x in piece {
            out.write(x);
        }
    }
    Ok(())
}

/// Pre-auth encode the pieces into a new buffer.
pub fn pae<const N: usize>(pieces: [&[&[u8]]; N]) -> Result<Vec<u8>, PasetoError> {
    let len = 8 + pieces
        .iter()
        .map(|p| 8 + p.iter().map(|x| x.len()).sum::<usize>())
        .sum::<usize>();

    let mut out = Vec::with_capacity(len);
    pre_auth_encode(pieces, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{le64, pae};
    use crate::PasetoError;

    #[test]
    fn encode() {
        let v = pae([]).unwrap();
        assert_eq!(v, b"\x00\x00\x00\x00\x00\x00\x00\x00");

        let v = pae([&[b""]]).unwrap();
        assert_eq!(
            v,
            b"\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00"
        );

        let v = pae([&[b"test"]]).unwrap();
        assert_eq!(
            v,
            b"\x01\x00\x00\x00\x00\x00\x00\x00\x04\x00\x00\x00\x00\x00\x00\x00test"
        );
    }

    #[test]
    fn split_pieces_are_concatenated() {
        let split = pae([&[b"v4", b".local."], &[b"nonce"]]).unwrap();
        let joined = pae([&[b"v4.local."], &[b"nonce"]]).unwrap();
        assert_eq!(split, joined);
    }

    #[test]
    fn piece_boundaries_matter() {
        let a = pae([&[b"ab"], &[b"c"]]).unwrap();
        let b = pae([&[b"a"], &[b"bc"]]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn le64_bounds() {
        assert_eq!(le64(0).unwrap(), [0; 8]);
        assert_eq!(
            le64(i64::MAX as u64).unwrap(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]
        );
        assert!(matches!(le64(1 << 63), Err(PasetoError::NotSupported(_))));
        assert!(matches!(le64(u64::MAX), Err(PasetoError::NotSupported(_))));
    }
}
