//! Script numeric

/// Script number error type.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum NumError {
    #[error("Script number overflow")]
    Overflow,
    #[error("Non-minimally encoded script number")]
    NotMinimallyEncoded,
}

/// A numeric type used in Bitcoin Script operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum {
    value: i64,
}

impl<T: Into<i64>> From<T> for ScriptNum {
    fn from(value: T) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl ScriptNum {
    /// Maximum script number length in bytes.
    pub const MAX_NUM_SIZE: usize = 4;

    /// Construct a [`ScriptNum`] of at most [`Self::MAX_NUM_SIZE`] bytes.
    pub fn from_bytes(data: &[u8], require_minimal: bool) -> Result<Self, NumError> {
        if data.len() > Self::MAX_NUM_SIZE {
            return Err(NumError::Overflow);
        }

        let Some((&last, _)) = data.split_last() else {
            return Ok(Self { value: 0 });
        };

        if require_minimal && !Self::is_minimally_encoded(data) {
            return Err(NumError::NotMinimallyEncoded);
        }

        let mut result = 0i64;

        // Parse bytes in little-endian order.
        for (i, &byte) in data.iter().enumerate() {
            result |= i64::from(byte) << (8 * i);
        }

        // The most significant bit of the last byte is the sign.
        if last & 0x80 != 0 {
            let sign_bit = 0x80i64 << (8 * (data.len() - 1));
            Ok(Self {
                value: -(result & !sign_bit),
            })
        } else {
            Ok(Self { value: result })
        }
    }

    /// Convert the number to a minimally encoded byte vector.
    pub fn as_bytes(&self) -> Vec<u8> {
        if self.value == 0 {
            return Vec::new();
        }

        let negative = self.value < 0;
        let mut abs_value = self.value.unsigned_abs();

        let mut result = Vec::new();
        while abs_value != 0 {
            result.push((abs_value & 0xff) as u8);
            abs_value >>= 8;
        }

        // Add a sign byte if the most significant byte already uses the sign bit.
        let msb = result.len() - 1;
        if result[msb] & 0x80 != 0 {
            result.push(if negative { 0x80 } else { 0 });
        } else if negative {
            result[msb] |= 0x80;
        }

        result
    }

    fn is_minimally_encoded(data: &[u8]) -> bool {
        match data {
            [] => true,
            // Zero must be encoded as an empty array.
            [last] => last & 0x7f != 0,
            [.., prev, last] => last & 0x7f != 0 || prev & 0x80 != 0,
        }
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.value
    }
}
