//! Binary weight codec.
//!
//! A network's weights are encoded as a flat sequence of IEEE-754
//! 32-bit little-endian floats, ordered by layer transition and then
//! by flat index within the transition, exactly mirroring the in-memory
//! buffer layout. There is no header, length prefix or topology
//! metadata: the reader must already hold a network of the right
//! topology to know how many floats to consume.
//!
//! The codec is symmetric; a write followed by a read into a network
//! of the same topology reproduces every weight bit-for-bit.

use crate::activation::Activation;
use crate::networks::DenseNetwork;

use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// An error type for weight stream encoding and decoding.
#[derive(Debug)]
pub enum PersistenceError {
    /// The underlying stream or file failed.
    Io(io::Error),
    /// The stream ended before the topology's weight count was read.
    Truncated {
        /// Number of weights the network's topology requires.
        expected: usize,
        /// Number of complete weights read before the stream ended.
        read: usize,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "weight stream I/O failure: {}", e),
            Self::Truncated { expected, read } => write!(
                f,
                "weight stream ended after {} of {} weights",
                read, expected
            ),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Truncated { .. } => None,
        }
    }
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> PersistenceError {
        PersistenceError::Io(e)
    }
}

/// Encodes the network's weights onto `writer`.
///
/// # Errors
/// Fails if the writer fails.
///
/// # Examples
/// ```
/// use evosteer_nn::networks::DenseNetwork;
/// use evosteer_nn::persistence;
///
/// let network = DenseNetwork::new(&[6, 4, 3]).unwrap();
///
/// let mut stream = Vec::new();
/// persistence::write_weights(&network, &mut stream).unwrap();
/// assert_eq!(stream.len(), network.weight_count() * 4);
/// ```
pub fn write_weights<A: Activation, W: Write>(
    network: &DenseNetwork<A>,
    mut writer: W,
) -> Result<(), PersistenceError> {
    for buffer in network.weights() {
        for weight in buffer {
            writer.write_all(&weight.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Decodes weights for the network's topology from `reader` and
/// installs them.
///
/// The stream is staged in full before any weight is overwritten,
/// so a failure never leaves the network partially filled.
///
/// # Errors
/// Fails with [`PersistenceError::Truncated`] if the stream holds
/// fewer weights than the topology requires, and with
/// [`PersistenceError::Io`] on any other read failure. The network's
/// weights are untouched in either case.
///
/// # Examples
/// ```
/// use evosteer_nn::networks::DenseNetwork;
/// use evosteer_nn::persistence;
///
/// let source = DenseNetwork::new(&[6, 4, 3]).unwrap();
/// let mut destination = DenseNetwork::new(&[6, 4, 3]).unwrap();
///
/// let mut stream = Vec::new();
/// persistence::write_weights(&source, &mut stream).unwrap();
/// persistence::read_weights(&mut destination, stream.as_slice()).unwrap();
///
/// // Bit-exact round trip.
/// assert!(source
///     .weights()
///     .flatten()
///     .map(|w| w.to_bits())
///     .eq(destination.weights().flatten().map(|w| w.to_bits())));
/// ```
pub fn read_weights<A: Activation, R: Read>(
    network: &mut DenseNetwork<A>,
    mut reader: R,
) -> Result<(), PersistenceError> {
    let expected = network.weight_count();
    let mut staged = Vec::with_capacity(expected);
    let mut bytes = [0u8; 4];
    for read in 0..expected {
        if let Err(e) = reader.read_exact(&mut bytes) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => PersistenceError::Truncated { expected, read },
                _ => PersistenceError::Io(e),
            });
        }
        staged.push(f32::from_le_bytes(bytes));
    }

    let mut offset = 0;
    for buffer in network.weight_buffers_mut() {
        let len = buffer.len();
        buffer.copy_from_slice(&staged[offset..offset + len]);
        offset += len;
    }
    Ok(())
}

/// Persists the network's weights to a file.
///
/// The stream is written to a sibling staging path and renamed into
/// place once complete, so an interrupted or failed save never leaves
/// a truncated weight file at `path`.
///
/// # Errors
/// Fails if the staging file cannot be created, written or renamed.
pub fn save<A: Activation, P: AsRef<Path>>(
    network: &DenseNetwork<A>,
    path: P,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let written = File::create(&staging)
        .map_err(PersistenceError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_weights(network, &mut writer)?;
            writer.flush()?;
            Ok(())
        });
    match written {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

/// Replaces the network's weights with the contents of a file.
///
/// # Errors
/// Fails if the file cannot be opened or read, or holds fewer weights
/// than the network's topology requires. The network's weights are
/// untouched on failure.
pub fn load<A: Activation, P: AsRef<Path>>(
    network: &mut DenseNetwork<A>,
    path: P,
) -> Result<(), PersistenceError> {
    let file = File::open(path)?;
    read_weights(network, BufReader::new(file))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "weights".into());
    name.push(".tmp");
    path.with_file_name(name)
}
