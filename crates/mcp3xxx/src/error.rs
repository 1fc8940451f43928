use core::fmt;

/// Errors raised by the protocol codec before or after a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// The requested channel does not exist on this chip.
    #[allow(missing_docs)]
    InvalidChannel { channel: u8, channel_count: u8 },
    /// The response is too short to hold the reading field.
    #[allow(missing_docs)]
    TruncatedResponse {
        needed_bits: u32,
        available_bits: usize,
    },
    /// The chip parameters cannot describe a frame this driver can carry.
    InvalidProfile,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidChannel {
                channel,
                channel_count,
            } => write!(
                f,
                "channel {channel} out of range, chip has {channel_count} channels"
            ),
            CodecError::TruncatedResponse {
                needed_bits,
                available_bits,
            } => write!(
                f,
                "response holds {available_bits} bits, reading needs {needed_bits}"
            ),
            CodecError::InvalidProfile => write!(f, "invalid chip profile"),
        }
    }
}

impl core::error::Error for CodecError {}

/// Error returned by a measurement: either the codec rejected the request or
/// response, or the SPI transfer itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The request or response was rejected by the codec.
    Codec(CodecError),
    /// Failure reported by the SPI device, passed through unchanged.
    Transport(E),
}

impl<E> Error<E> {
    /// Whether the SPI transfer itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl<E> From<CodecError> for Error<E> {
    fn from(err: CodecError) -> Self {
        Error::Codec(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Codec(err) => err.fmt(f),
            Error::Transport(err) => write!(f, "SPI transfer failed: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Codec(err) => Some(err),
            Error::Transport(_) => None,
        }
    }
}
