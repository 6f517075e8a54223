//! Reading and writing encoded programs on disk.
//!
//! A program file is exactly the byte stream produced by
//! [`crate::encode`]: no header, no framing beyond the Ion stream itself.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::ast::Program;
use crate::config::CodecConfig;
use crate::error::Error;
use crate::ion::ContainerError;

/// Failure to read or write a program file.
#[derive(Debug, Error)]
pub enum FileError {
    /// Opening, reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] Error),
}

/// Encode `program` and write it to `output_path`.
pub fn write_program_file(output_path: &Path, program: &Program) -> Result<(), FileError> {
    let bytes = crate::encode(program)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;

    log::debug!("wrote {} bytes to {}", bytes.len(), output_path.display());
    Ok(())
}

/// Read the raw bytes of a program file, honoring the input length limit.
pub fn read_file_bytes(input_path: &Path, config: &CodecConfig) -> Result<Vec<u8>, FileError> {
    let file = File::open(input_path)?;
    let Some(limit) = config.max_input_len else {
        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;
        return Ok(bytes);
    };

    let too_large = |len: usize| -> FileError {
        Error::from(ContainerError::InputTooLarge { len, limit }).into()
    };
    let file_len = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);
    if file_len > limit {
        return Err(too_large(file_len));
    }

    // The file may grow after the metadata check; one byte past the
    // limit is enough to notice.
    let mut bytes = Vec::new();
    BufReader::new(file)
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > limit {
        return Err(too_large(bytes.len()));
    }
    Ok(bytes)
}

/// Read and decode a program file with default limits.
pub fn read_program_file(input_path: &Path) -> Result<Program, FileError> {
    read_program_file_with_config(input_path, &CodecConfig::default())
}

/// Read and decode a program file.
pub fn read_program_file_with_config(
    input_path: &Path,
    config: &CodecConfig,
) -> Result<Program, FileError> {
    let bytes = read_file_bytes(input_path, config)?;
    log::debug!("read {} bytes from {}", bytes.len(), input_path.display());
    Ok(crate::decode_with_config(&bytes, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, HighType};

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program.ion");
        let program = Program::builder()
            .static_field(Field::mutable("counter", HighType::TInt))
            .build();

        write_program_file(&path, &program).unwrap();
        assert_eq!(read_program_file(&path).unwrap(), program);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_program_file(&dir.path().join("absent.ion")).unwrap_err();
        assert!(matches!(err, FileError::Io(_)));
    }

    #[test]
    fn test_input_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program.ion");
        write_program_file(&path, &Program::empty()).unwrap();

        let config = CodecConfig::builder().max_input_len(8).build();
        let err = read_program_file_with_config(&path, &config).unwrap_err();
        assert!(matches!(
            err,
            FileError::Codec(Error::Container(ContainerError::InputTooLarge { limit: 8, .. }))
        ));
    }

    #[test]
    fn test_one_byte_over_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.ion");
        std::fs::write(&path, [0u8; 9]).unwrap();

        let config = CodecConfig::builder().max_input_len(9).build();
        assert_eq!(read_file_bytes(&path, &config).unwrap().len(), 9);

        let config = CodecConfig::builder().max_input_len(8).build();
        assert!(matches!(
            read_file_bytes(&path, &config),
            Err(FileError::Codec(Error::Container(ContainerError::InputTooLarge {
                len: 9,
                limit: 8
            })))
        ));
    }
}
