//! Sequential big-endian byte sources the command reader pulls from.
//!
//! A channel that runs dry reports [`TxLogError::ReadPastEnd`] rather than a generic
//! error, so the reader can tell a truncated tail apart from corruption.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use bytes::{Buf, Bytes};

use crate::config::LogReaderConfig;
use crate::error::{TxLogError, TxLogResult};

pub trait ReadableLogChannel {
    /// Fills `dst` completely or fails with `ReadPastEnd`.
    fn read_exact(&mut self, dst: &mut [u8]) -> TxLogResult<()>;

    /// Bytes handed out so far.
    fn offset(&self) -> u64;

    fn get_u8(&mut self) -> TxLogResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn get_i8(&mut self) -> TxLogResult<i8> {
        Ok(self.get_u8()? as i8)
    }

    fn get_i16(&mut self) -> TxLogResult<i16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    fn get_u16(&mut self) -> TxLogResult<u16> {
        Ok(self.get_i16()? as u16)
    }

    fn get_i32(&mut self) -> TxLogResult<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    fn get_i64(&mut self) -> TxLogResult<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn get_f32(&mut self) -> TxLogResult<f32> {
        Ok(f32::from_bits(self.get_i32()? as u32))
    }

    fn get_f64(&mut self) -> TxLogResult<f64> {
        Ok(f64::from_bits(self.get_i64()? as u64))
    }

    fn get_bytes(&mut self, len: usize) -> TxLogResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Channel over an in-memory copy of a log, e.g. a segment already loaded by the caller.
#[derive(Debug, Clone)]
pub struct InMemoryLogChannel {
    buf: Bytes,
    len: usize,
}

impl InMemoryLogChannel {
    pub fn new(data: impl Into<Bytes>) -> Self {
        let buf = data.into();
        let len = buf.len();
        Self { buf, len }
    }

    pub fn position(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&mut self, needed: usize) -> TxLogResult<()> {
        if self.buf.remaining() < needed {
            // a short read leaves the channel exhausted, like a file cursor would
            let rest = self.buf.remaining();
            self.buf.advance(rest);
            return Err(TxLogError::ReadPastEnd);
        }
        Ok(())
    }
}

impl ReadableLogChannel for InMemoryLogChannel {
    fn read_exact(&mut self, dst: &mut [u8]) -> TxLogResult<()> {
        self.ensure(dst.len())?;
        self.buf.copy_to_slice(dst);
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.position() as u64
    }

    fn get_u8(&mut self) -> TxLogResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    fn get_i16(&mut self) -> TxLogResult<i16> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    fn get_i32(&mut self) -> TxLogResult<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    fn get_i64(&mut self) -> TxLogResult<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    fn get_f32(&mut self) -> TxLogResult<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    fn get_f64(&mut self) -> TxLogResult<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    fn get_bytes(&mut self, len: usize) -> TxLogResult<Vec<u8>> {
        self.ensure(len)?;
        Ok(self.buf.copy_to_bytes(len).to_vec())
    }
}

/// Channel over any `Read`, typically a log segment file.
pub struct PhysicalLogChannel<R: Read> {
    reader: BufReader<R>,
    offset: u64,
}

impl PhysicalLogChannel<File> {
    pub fn open(path: impl AsRef<Path>, config: &LogReaderConfig) -> TxLogResult<Self> {
        let file = File::open(path)?;
        Ok(Self::with_config(file, config))
    }
}

impl<R: Read> PhysicalLogChannel<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, &LogReaderConfig::default())
    }

    pub fn with_config(inner: R, config: &LogReaderConfig) -> Self {
        Self {
            reader: BufReader::with_capacity(config.read_buffer_size, inner),
            offset: 0,
        }
    }
}

impl<R: Read> ReadableLogChannel for PhysicalLogChannel<R> {
    fn read_exact(&mut self, dst: &mut [u8]) -> TxLogResult<()> {
        match self.reader.read_exact(dst) {
            Ok(()) => {
                self.offset += dst.len() as u64;
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(TxLogError::ReadPastEnd),
            Err(err) => Err(TxLogError::Io(err)),
        }
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}
