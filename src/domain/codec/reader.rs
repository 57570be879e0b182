// Bounds-checked big-endian cursor. Every short read becomes `MalformedPdu`.

use crate::domain::errors::DecodeError;

pub struct PduReader<'a> {
    buf: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> PduReader<'a> {
    pub fn new(buf: &'a [u8], context: &'static str) -> Self {
        Self {
            buf,
            pos: 0,
            context,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fails unless at least `n` more bytes are available.
    pub fn ensure(&self, n: usize) -> Result<(), DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::MalformedPdu {
                context: self.context,
                needed: self.pos.saturating_add(n),
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Checks that `count` records of at least `record_len` bytes can fit,
    /// before anything is allocated for them.
    pub fn ensure_records(&self, count: usize, record_len: usize) -> Result<(), DecodeError> {
        self.ensure(count.saturating_mul(record_len))
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_be_bytes(self.array()?))
    }

    pub fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    pub fn bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_read_overruns_buffer_then_reports_needed_and_available() {
        let mut reader = PduReader::new(&[0x01, 0x02, 0x03], "test");
        assert_eq!(reader.u16(), Ok(0x0102));

        let err = reader.u32().expect_err("only one byte left");

        assert_eq!(
            err,
            DecodeError::MalformedPdu {
                context: "test",
                needed: 6,
                available: 3
            }
        );
        // A failed read does not advance the cursor.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn when_record_count_is_huge_then_ensure_records_fails_without_overflow() {
        let reader = PduReader::new(&[0u8; 16], "test");

        assert!(reader.ensure_records(usize::MAX, 16).is_err());
        assert!(reader.ensure_records(2, 8).is_ok());
    }
}
