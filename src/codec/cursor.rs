use bytes::{BufMut, Bytes, BytesMut};
use byteorder::{BigEndian, ByteOrder};

use crate::internal::error::DecodeError;

/// Forward-only, bounds-checked reader over an input buffer.
///
/// Every read either consumes exactly the bytes it needs or fails with
/// `UnexpectedEof` and leaves the offset where it was.
#[derive(Debug, Clone)]
pub struct ReadCursor {
    data: Bytes,
    offset: usize,
}

impl ReadCursor {
    pub fn new(data: Bytes) -> Self {
        ReadCursor { data, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(DecodeError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&[u8], DecodeError> {
        self.ensure(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.data[start..start + n])
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Returns the next `n` bytes without copying.
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes, DecodeError> {
        self.ensure(n)?;
        let chunk = self.data.slice(self.offset..self.offset + n);
        self.offset += n;
        Ok(chunk)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// Append-only writer over a growable output buffer.
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut BytesMut) -> Self {
        WriteCursor { buf }
    }

    /// Bytes currently in the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian_fields() {
        let mut cursor = ReadCursor::new(Bytes::from_static(&[
            0x01, // u8
            0x01, 0x02, // u16
            0x00, 0x00, 0x04, 0x00, // u32
            0xff, 0xff, 0xff, 0xff, // i32
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, // u64
        ]));
        assert_eq!(cursor.read_u8().unwrap(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0x0102);
        assert_eq!(cursor.read_u32().unwrap(), 1024);
        assert_eq!(cursor.read_i32().unwrap(), -1);
        assert_eq!(cursor.read_u64().unwrap(), 256);
        assert!(cursor.is_empty());
        assert_eq!(cursor.position(), 19);
    }

    #[test]
    fn test_read_past_end_fails_without_consuming() {
        let mut cursor = ReadCursor::new(Bytes::from_static(&[0x00, 0x01, 0x02]));
        assert_eq!(
            cursor.read_u32(),
            Err(DecodeError::UnexpectedEof { needed: 4, remaining: 3 })
        );
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u16().unwrap(), 1);
        assert_eq!(
            cursor.read_exact(2),
            Err(DecodeError::UnexpectedEof { needed: 2, remaining: 1 })
        );
    }

    #[test]
    fn test_read_exact_and_array() {
        let mut cursor = ReadCursor::new(Bytes::from_static(b"helloworld"));
        assert_eq!(cursor.read_exact(5).unwrap(), Bytes::from_static(b"hello"));
        let rest: [u8; 5] = cursor.read_array().unwrap();
        assert_eq!(&rest, b"world");
        assert!(cursor.read_u8().is_err());
    }

    #[test]
    fn test_write_big_endian_fields() {
        let mut buf = BytesMut::new();
        let mut writer = WriteCursor::new(&mut buf);
        writer.write_u8(131);
        writer.write_u16(3);
        writer.write_u32(1024);
        writer.write_i32(-2147483648);
        writer.write_f64(2.5);
        writer.write_bytes(b"ok");
        assert_eq!(writer.len(), 1 + 2 + 4 + 4 + 8 + 2);
        assert_eq!(
            &buf[..],
            &[
                131, 0, 3, 0, 0, 4, 0, 0x80, 0, 0, 0, 0x40, 0x04, 0, 0, 0, 0, 0, 0, b'o', b'k'
            ]
        );
    }
}
