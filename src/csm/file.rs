//! 二进制文件读写原语
//!
//! 对单个文件句柄提供按绝对偏移的读写。每个 `BinaryFile` 独占一个句柄，
//! 短读 / 短写一律视为错误，而不是返回部分结果。

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::core::error::{MeshError, Result};

/// 打开模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 只读，文件必须存在
    Read,
    /// 写入，创建或截断文件
    Write,
}

/// 底层存储：磁盘文件或内存缓冲
#[derive(Debug)]
enum Backing {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl Read for Backing {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Backing::File(file) => file.read(buf),
            Backing::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Write for Backing {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Backing::File(file) => file.write(buf),
            Backing::Memory(_) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "in-memory mesh data is read-only",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Backing::File(file) => file.flush(),
            Backing::Memory(_) => Ok(()),
        }
    }
}

impl Seek for Backing {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Backing::File(file) => file.seek(pos),
            Backing::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// 带偏移跟踪的二进制文件句柄
#[derive(Debug, Default)]
pub struct BinaryFile {
    handle: Option<Backing>,
}

impl BinaryFile {
    /// 创建一个未打开的句柄
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// 打开文件
    ///
    /// 已打开的句柄会先被关闭。`Mode::Read` 下文件不存在返回
    /// `MeshError::FileNotFound`。
    pub fn open<P: AsRef<Path>>(&mut self, path: P, mode: Mode) -> Result<()> {
        self.close();

        let path = path.as_ref();
        let file = match mode {
            Mode::Write => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
            Mode::Read => File::open(path).map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    MeshError::FileNotFound(path.to_path_buf()).into()
                } else {
                    crate::core::error::CsmError::Io(e)
                }
            })?,
        };

        self.handle = Some(Backing::File(file));
        Ok(())
    }

    /// 以只读方式打开内存中的字节
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            handle: Some(Backing::Memory(Cursor::new(bytes))),
        }
    }

    /// 关闭句柄，未打开时调用也是安全的
    pub fn close(&mut self) {
        if let Some(Backing::File(mut file)) = self.handle.take() {
            if let Err(e) = file.flush() {
                tracing::warn!("Failed to flush mesh file on close: {}", e);
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&mut self) -> Result<&mut Backing> {
        self.handle.as_mut().ok_or_else(|| MeshError::NotOpen.into())
    }

    /// 底层数据的总字节数
    pub fn stream_len(&mut self) -> Result<u64> {
        match self.handle()? {
            Backing::File(file) => Ok(file.metadata()?.len()),
            Backing::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
        }
    }

    /// 当前绝对偏移；未打开或无法获取时为 `None`
    pub fn position(&mut self) -> Option<u64> {
        self.handle.as_mut()?.stream_position().ok()
    }

    /// 当前偏移（格式中的偏移字段均为 u32）
    pub fn current_offset(&mut self) -> Result<u32> {
        if !self.is_open() {
            return Err(MeshError::NotOpen.into());
        }

        let position = self.position().ok_or(MeshError::OffsetUnavailable)?;
        u32::try_from(position).map_err(|_| MeshError::OffsetOverflow(position).into())
    }

    /// 跳转到绝对偏移
    pub fn seek(&mut self, offset: u32) -> Result<()> {
        self.handle()?.seek(SeekFrom::Start(u64::from(offset)))?;
        Ok(())
    }

    /// 读满 `buf`，不足则报错
    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let handle = self.handle()?;
        let mut filled = 0;

        while filled < buf.len() {
            match handle.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled != buf.len() {
            return Err(MeshError::ShortTransfer {
                expected: buf.len(),
                actual: filled,
            }.into());
        }

        Ok(())
    }

    /// 写入全部 `buf`
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        let handle = self.handle()?;
        let mut written = 0;

        while written < buf.len() {
            match handle.write(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if written != buf.len() {
            return Err(MeshError::ShortTransfer {
                expected: buf.len(),
                actual: written,
            }.into());
        }

        Ok(())
    }

    /// 从当前位置读到第一个 NUL（含）为止
    ///
    /// 返回是否遇到了 NUL；到达文件末尾仍未遇到时返回 `false`。
    /// 调用之后文件位置未定义，后续操作需重新 `seek`。
    pub fn read_until_nul(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        let handle = self.handle()?;
        let mut reader = BufReader::new(handle);
        reader.read_until(0, out)?;
        Ok(out.last() == Some(&0))
    }
}

impl Drop for BinaryFile {
    fn drop(&mut self) {
        self.close();
    }
}
