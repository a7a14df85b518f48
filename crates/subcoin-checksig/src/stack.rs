use crate::num::{NumError, ScriptNum};
use std::fmt::Display;
use std::ops::Deref;

/// Stack error type.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("invalid stack operation")]
    InvalidOperation,
    #[error(transparent)]
    Num(#[from] NumError),
}

type Result<T> = std::result::Result<T, StackError>;

/// Operand stack the signature opcodes pop their arguments from and push results onto.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Stack {
    data: Vec<Vec<u8>>,
    verify_minimaldata: bool,
}

impl From<Vec<Vec<u8>>> for Stack {
    fn from(data: Vec<Vec<u8>>) -> Self {
        Self {
            data,
            verify_minimaldata: false,
        }
    }
}

impl Deref for Stack {
    type Target = Vec<Vec<u8>>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stack {{ data: [")?;

        for (i, item) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if item.is_empty() {
                write!(f, "<empty>")?;
            } else {
                write!(f, "{}", hex::encode(item))?;
            }
        }

        write!(f, "], verify_minimaldata: {} }}", self.verify_minimaldata)
    }
}

impl Stack {
    /// Creates a stack, `verify_minimaldata` makes [`Self::pop_num`] reject numbers
    /// that are not minimally encoded.
    #[inline]
    pub fn new(data: Vec<Vec<u8>>, verify_minimaldata: bool) -> Self {
        Self {
            data,
            verify_minimaldata,
        }
    }

    /// Removes and returns the last element of the stack.
    #[inline]
    pub fn pop(&mut self) -> Result<Vec<u8>> {
        self.data.pop().ok_or(StackError::InvalidOperation)
    }

    /// Pops a number from the stack and converts it into a ScriptNum.
    #[inline]
    pub fn pop_num(&mut self) -> Result<ScriptNum> {
        let data = self.pop()?;
        ScriptNum::from_bytes(&data, self.verify_minimaldata).map_err(Into::into)
    }

    /// Pops the top element and converts it to a boolean.
    #[inline]
    pub fn pop_bool(&mut self) -> Result<bool> {
        Ok(cast_to_bool(&self.pop()?))
    }

    /// Push an element onto the stack.
    #[inline]
    pub fn push(&mut self, value: Vec<u8>) -> &mut Self {
        self.data.push(value);
        self
    }

    #[inline]
    pub fn push_num(&mut self, num: impl Into<ScriptNum>) -> &mut Self {
        self.push(num.into().as_bytes())
    }

    #[inline]
    pub fn push_bool(&mut self, boolean: bool) -> &mut Self {
        if boolean {
            self.push(vec![1])
        } else {
            self.push(Vec::new())
        }
    }
}

/// Converts a byte slice to a boolean.
///
/// Any non-zero byte makes the value true, except for a trailing `0x80` which is negative zero.
pub fn cast_to_bool(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&last, rest)) => rest.iter().any(|&x| x != 0) || (last != 0 && last != 0x80),
        None => false,
    }
}
